//! Error types for the pdf2md library.
//!
//! Every failure that stops one file from converting is a [`Pdf2MdError`].
//! The conversion queue catches it per file, reports it with the file name,
//! and moves on to the next source, so one bad input never aborts a batch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2md library.
#[derive(Debug, Error)]
pub enum Pdf2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Source file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension does not match the conversion direction.
    #[error("'{path}' does not match the current mode: expected a {expected} file")]
    UnsupportedExtension { path: PathBuf, expected: &'static str },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The source text file could not be read (I/O error or invalid UTF-8).
    #[error("Failed to read '{path}': {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password; password-protected input is not supported.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// pdfium failed while building or serialising the output PDF.
    #[error("Failed to write PDF '{path}': {detail}")]
    PdfWriteFailed { path: PathBuf, detail: String },

    // ── Font errors ───────────────────────────────────────────────────────
    /// No usable font was found; composing pages needs width measurement.
    #[error("{0}")]
    FontNotFound(#[from] font_discovery::FontDiscoveryError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Queue errors ──────────────────────────────────────────────────────
    /// A queue run was requested while the previous one is still active.
    #[error("A conversion is already in progress")]
    QueueBusy,

    /// A queue run was requested with no files queued.
    #[error("No files queued: add at least one {expected} file")]
    EmptyQueue { expected: &'static str },

    /// A queue run was requested without an output directory.
    #[error("No output directory selected")]
    NoOutputDir,

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place the pdfium library next to the pdf2md executable.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
