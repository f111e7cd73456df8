//! Post-processing: deterministic cleanup of text pulled out of a PDF page.
//!
//! pdfium returns page text with Windows line endings and sprinkles in
//! engine marker characters (U+0002 and U+FFFE at hyphenation points, NULs,
//! byte-order marks) that never appear in a viewer but break plain-text
//! tools. These rules remove that noise and leave every other character,
//! including zero-width joiners and whitespace, as extracted.
//!
//! Rules (applied in order):
//! 1. Normalise line endings (CRLF / CR → LF)
//! 2. Strip engine marker characters

/// Apply all cleanup rules to one page's raw text.
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    remove_marker_chars(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

pub fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove engine marker characters ──────────────────────────────────

fn remove_marker_chars(input: &str) -> String {
    input.replace(['\u{0000}', '\u{0002}', '\u{FFFE}', '\u{FEFF}'], "")
}
