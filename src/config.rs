//! Configuration types for both conversion directions.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Only the Markdown → PDF direction has real
//! knobs (page geometry, font, font size); the PDF → Markdown direction reads
//! nothing from it.

use crate::error::Pdf2MdError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2md::{ConversionConfig, PaperSize};
///
/// let config = ConversionConfig::builder()
///     .paper(PaperSize::Letter)
///     .font_size_pt(11.0)
///     .build()
///     .unwrap();
/// assert!(config.max_line_width_pt() > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Output page size. Default: A4.
    pub paper: PaperSize,

    /// Left, right and top margin in millimetres. Range: 0–50. Default: 10.
    pub margin_mm: f32,

    /// Bottom margin in millimetres; a page breaks once the next cell would
    /// cross it. Range: 0–80. Default: 20.
    pub bottom_margin_mm: f32,

    /// Font size in points. Range: 4–72. Default: 12.
    pub font_size_pt: f32,

    /// Height of one line cell in points. Default: 1.5 × font size.
    pub line_height_pt: Option<f32>,

    /// Spaces substituted for each tab character. Default: 4.
    pub tab_width: usize,

    /// Font file tried before any other (overrides `PDF2MD_FONT_PATH`).
    pub font_path: Option<PathBuf>,

    /// Directory of fonts tried after `font_path` (overrides `PDF2MD_FONT_DIR`).
    pub font_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            margin_mm: 10.0,
            bottom_margin_mm: 20.0,
            font_size_pt: 12.0,
            line_height_pt: None,
            tab_width: 4,
            font_path: None,
            font_dir: None,
        }
    }
}

impl ConversionConfig {
    /// Create a builder with default settings.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Page width and height in points.
    pub fn page_size_pt(&self) -> (f32, f32) {
        self.paper.dimensions_pt()
    }

    pub fn margin_pt(&self) -> f32 {
        self.margin_mm * PT_PER_MM
    }

    pub fn bottom_margin_pt(&self) -> f32 {
        self.bottom_margin_mm * PT_PER_MM
    }

    pub fn line_height(&self) -> f32 {
        self.line_height_pt.unwrap_or(self.font_size_pt * 1.5)
    }

    /// Width available to a wrapped line.
    pub fn max_line_width_pt(&self) -> f32 {
        let (w, _) = self.page_size_pt();
        w - 2.0 * self.margin_pt()
    }

    /// Height available to line cells on one page.
    pub fn usable_height_pt(&self) -> f32 {
        let (_, h) = self.page_size_pt();
        h - self.margin_pt() - self.bottom_margin_pt()
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn paper(mut self, paper: PaperSize) -> Self {
        self.config.paper = paper;
        self
    }

    /// Clamped to 0–50 mm.
    pub fn margin_mm(mut self, mm: f32) -> Self {
        self.config.margin_mm = mm.clamp(0.0, 50.0);
        self
    }

    /// Clamped to 0–80 mm.
    pub fn bottom_margin_mm(mut self, mm: f32) -> Self {
        self.config.bottom_margin_mm = mm.clamp(0.0, 80.0);
        self
    }

    /// Clamped to 4–72 pt.
    pub fn font_size_pt(mut self, pt: f32) -> Self {
        self.config.font_size_pt = pt.clamp(4.0, 72.0);
        self
    }

    pub fn line_height_pt(mut self, pt: f32) -> Self {
        self.config.line_height_pt = Some(pt);
        self
    }

    pub fn tab_width(mut self, n: usize) -> Self {
        self.config.tab_width = n;
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.font_dir = Some(dir.into());
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    /// `InvalidConfig` when the printable area is empty or the line height is
    /// not positive.
    pub fn build(self) -> Result<ConversionConfig, Pdf2MdError> {
        let c = &self.config;
        if !(c.line_height() > 0.0) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "line height must be > 0, got {}",
                c.line_height()
            )));
        }
        if c.max_line_width_pt() <= 0.0 {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "margins of {}mm leave no printable width on {:?}",
                c.margin_mm, c.paper
            )));
        }
        if c.usable_height_pt() <= 0.0 {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "margins of {}mm/{}mm leave no printable height on {:?}",
                c.margin_mm, c.bottom_margin_mm, c.paper
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    /// 210 × 297 mm.
    #[default]
    A4,
    /// 8.5 × 11 in.
    Letter,
}

impl PaperSize {
    /// Width and height in points.
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::Letter => (612.0, 792.0),
        }
    }
}

/// Which way a queue converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// `.pdf` in, `.md` out.
    #[default]
    PdfToMarkdown,
    /// `.md` in, `.pdf` out.
    MarkdownToPdf,
}

impl Direction {
    /// Extension (without dot) of accepted source files.
    pub fn source_extension(self) -> &'static str {
        match self {
            Direction::PdfToMarkdown => "pdf",
            Direction::MarkdownToPdf => "md",
        }
    }

    /// Extension (without dot) of produced files.
    pub fn output_extension(self) -> &'static str {
        match self {
            Direction::PdfToMarkdown => "md",
            Direction::MarkdownToPdf => "pdf",
        }
    }

    /// Human-readable filter, e.g. `.pdf`.
    pub fn source_filter(self) -> &'static str {
        match self {
            Direction::PdfToMarkdown => ".pdf",
            Direction::MarkdownToPdf => ".md",
        }
    }

    /// Whether `path` has this direction's source extension (ASCII case-insensitive).
    pub fn accepts(self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.source_extension()))
    }

    /// The direction whose source extension `path` carries, if any.
    pub fn infer(path: &Path) -> Option<Self> {
        [Direction::PdfToMarkdown, Direction::MarkdownToPdf]
            .into_iter()
            .find(|d| d.accepts(path))
    }
}
