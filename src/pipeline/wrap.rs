//! Line preparation and greedy character wrapping.
//!
//! The Markdown → PDF direction is a plain-text pagination step, not a
//! Markdown renderer: the only syntax it understands is a leading run of
//! `#` heading markers, which is stripped. Everything else (emphasis, links,
//! list bullets) is laid out verbatim.
//!
//! Wrapping is character-granular. A line is filled one character at a time
//! until the next character would overflow, then broken there, even in the
//! middle of a word. A character that is wider than the whole line on its own
//! is emitted as a line by itself so the loop always makes progress.

use crate::pipeline::postprocess::normalise_line_endings;
use font_discovery::GlyphMetrics;
use once_cell::sync::Lazy;
use regex::Regex;

/// Measures rendered text width in points.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f32;
}

impl TextMeasure for GlyphMetrics<'_> {
    fn width(&self, text: &str) -> f32 {
        self.text_width(text)
    }
}

// ── Line preparation ─────────────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#+\s*(.*?)\s*$").unwrap());

/// Strip leading heading markers and the whitespace around the heading text.
/// Lines without a leading `#` are returned unchanged.
pub fn strip_heading(line: &str) -> &str {
    match RE_HEADING.captures(line) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => line,
    }
}

/// Replace every tab with `tab_width` spaces.
pub fn expand_tabs(line: &str, tab_width: usize) -> String {
    line.replace('\t', &" ".repeat(tab_width))
}

/// Split source text into logical lines ready for wrapping.
pub fn logical_lines(text: &str, tab_width: usize) -> Vec<String> {
    normalise_line_endings(text)
        .lines()
        .map(|line| expand_tabs(strip_heading(line), tab_width))
        .collect()
}

// ── Wrapping ─────────────────────────────────────────────────────────────────

/// Wrap one logical line so every piece fits `max_width`, or is a single
/// character that does not fit on its own.
///
/// Always returns at least one element; an empty line yields `[""]`.
pub fn wrap_line(line: &str, max_width: f32, measure: &impl TextMeasure) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();

    for c in line.chars() {
        let mut candidate = current.clone();
        candidate.push(c);

        if measure.width(&candidate) <= max_width {
            current = candidate;
        } else if !current.is_empty() {
            wrapped.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            wrapped.push(c.to_string());
        }
    }

    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

/// Wrap every logical line, in order.
pub fn wrap_lines(lines: &[String], max_width: f32, measure: &impl TextMeasure) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| wrap_line(line, max_width, measure))
        .collect()
}
