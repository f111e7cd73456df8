//! Pipeline stages shared by the two converters.
//!
//! Each submodule implements one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! PDF → Markdown:  input ──▶ engine (load, per-page text) ──▶ postprocess ──▶ output
//! Markdown → PDF:  input ──▶ wrap ──▶ layout ──▶ engine (draw, save) ──▶ output
//! ```
//!
//! 1. [`input`]:       validate a queued path for the current direction
//! 2. [`engine`]:      bind pdfium once per converter
//! 3. [`postprocess`]: clean extracted page text
//! 4. [`wrap`]:        strip heading markers, expand tabs, greedy character wrap
//! 5. [`layout`]:      assign wrapped lines to page cells
//! 6. [`output`]:      output naming and atomic writes

pub mod engine;
pub mod input;
pub mod layout;
pub mod output;
pub mod postprocess;
pub mod wrap;
