//! # pdf2md
//!
//! Convert PDF documents to Markdown text and Markdown text back to PDF,
//! one file at a time, with per-file progress.
//!
//! ## Directions
//!
//! ```text
//! PDF ──▶ TextExtractor ──▶ .md     per-page text under a "# <stem>" title
//! .md ──▶ PageCompositor ─▶ PDF     greedy character wrap, one line per cell
//! ```
//!
//! The Markdown → PDF direction is a plain-text pagination step: leading `#`
//! heading markers are stripped and every other character is laid out as
//! written. Line widths are measured against a real font found on the local
//! machine (see the `font-discovery` crate).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2md::{ConversionQueue, Direction, QueueEvent, QueueRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut queue = ConversionQueue::new(Direction::PdfToMarkdown);
//!     queue.push("report.pdf")?;
//!     queue.set_output_dir("out");
//!
//!     let config = pdf2md::ConversionConfig::default();
//!     let mut runner = QueueRunner::new();
//!     let mut events = runner.start(&queue, move |d| pdf2md::converter_for(d, &config))?;
//!     while let Some(event) = events.recv().await {
//!         if let QueueEvent::Progress { source, percent, .. } = event {
//!             eprintln!("{}: {percent}%", source.display());
//!         }
//!     }
//!     let summary = runner.wait().await?;
//!     println!("{} converted, {} failed", summary.succeeded(), summary.failed());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2md = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod queue;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, Direction, PaperSize};
pub use convert::{converter_for, Converter, PageCompositor, TextExtractor};
pub use error::Pdf2MdError;
pub use progress::{NoopProgress, ProgressCallback, SharedProgress};
pub use queue::{ConversionQueue, FileOutcome, QueueEvent, QueueRunner, QueueSummary};
