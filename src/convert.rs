//! The two converters and their common entry point.
//!
//! Both directions implement [`Converter`]: `convert(source, output_dir,
//! progress) -> output_path`. The queue worker owns one converter per
//! direction and calls them strictly one file at a time.
//!
//! * [`TextExtractor`]: PDF → Markdown. Pulls plain text page by page and
//!   writes it under a `# <stem>` title.
//! * [`PageCompositor`]: Markdown → PDF. Wraps each line to the printable
//!   width of the page, one line per fixed-height cell, and paginates.

use crate::config::{ConversionConfig, Direction};
use crate::error::Pdf2MdError;
use crate::pipeline::engine::Engine;
use crate::pipeline::layout::{paginate, PageGeometry};
use crate::pipeline::{input, output, postprocess, wrap};
use crate::progress::{percent, ProgressCallback};
use font_discovery::{FontHandle, FontSearch};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One conversion direction.
pub trait Converter {
    fn direction(&self) -> Direction;

    /// Convert `source` into `output_dir`, returning the written path.
    ///
    /// Progress for `source` is reported through `progress`; values never
    /// decrease and the last one is 100.
    fn convert(
        &mut self,
        source: &Path,
        output_dir: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<PathBuf, Pdf2MdError>;
}

/// Build the converter for `direction`.
pub fn converter_for(direction: Direction, config: &ConversionConfig) -> Box<dyn Converter> {
    match direction {
        Direction::PdfToMarkdown => Box::new(TextExtractor::new()),
        Direction::MarkdownToPdf => Box::new(PageCompositor::new(config.clone())),
    }
}

fn map_load_error(path: &Path, e: PdfiumError) -> Pdf2MdError {
    let detail = format!("{:?}", e);
    if detail.contains("Password") || detail.contains("password") {
        Pdf2MdError::PasswordRequired {
            path: path.to_path_buf(),
        }
    } else {
        Pdf2MdError::CorruptPdf {
            path: path.to_path_buf(),
            detail,
        }
    }
}

// ── PDF → Markdown ───────────────────────────────────────────────────────

/// Extracts the text layer of a PDF into a Markdown file.
#[derive(Default)]
pub struct TextExtractor {
    engine: Engine,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of every page, cleaned, in page order.
    ///
    /// `on_page` is called with `(pages_done, total_pages)` after each page.
    pub fn extract_pages(
        &mut self,
        source: &Path,
        mut on_page: impl FnMut(usize, usize),
    ) -> Result<Vec<String>, Pdf2MdError> {
        let pdfium = self.engine.get()?;
        let document = pdfium
            .load_pdf_from_file(source, None)
            .map_err(|e| map_load_error(source, e))?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        let mut texts = Vec::with_capacity(total);
        for (index, page) in pages.iter().enumerate() {
            // A page without a text layer yields an empty string.
            let raw = page.text().map(|t| t.all()).unwrap_or_default();
            let text = postprocess::clean_page_text(&raw);
            debug!("Page {}: {} chars", index + 1, text.chars().count());
            texts.push(text);
            on_page(index + 1, total);
        }
        Ok(texts)
    }
}

/// `# <title>\n\n` followed by the page texts joined with a blank line.
pub fn assemble_markdown(title: &str, pages: &[String]) -> String {
    format!("# {}\n\n{}", title, pages.join("\n\n"))
}

impl Converter for TextExtractor {
    fn direction(&self) -> Direction {
        Direction::PdfToMarkdown
    }

    fn convert(
        &mut self,
        source: &Path,
        output_dir: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<PathBuf, Pdf2MdError> {
        let source = input::resolve_source(source, Direction::PdfToMarkdown)?;
        info!("Extracting text: {}", source.display());

        let pages = self.extract_pages(&source, |done, total| {
            progress.on_progress(&source, percent(done, total));
        })?;

        let markdown = assemble_markdown(&output::source_stem(&source), &pages);
        let out = output::output_path(&source, output_dir, Direction::PdfToMarkdown);
        output::write_atomic(&out, markdown.as_bytes())?;

        progress.on_progress(&source, 100);
        info!("Wrote {}", out.display());
        Ok(out)
    }
}

// ── Markdown → PDF ───────────────────────────────────────────────────────

/// Lays plain text out onto PDF pages.
///
/// The resolved font is cached for the lifetime of the compositor; call
/// [`PageCompositor::reset_font`] to force a new search on the next file.
pub struct PageCompositor {
    config: ConversionConfig,
    search: FontSearch,
    font: Option<FontHandle>,
    engine: Engine,
}

impl PageCompositor {
    /// A compositor using the platform font search, with the explicit
    /// overrides from `config` taking precedence over the environment.
    pub fn new(config: ConversionConfig) -> Self {
        let mut search = FontSearch::from_env(Some(Path::new(env!("CARGO_MANIFEST_DIR"))));
        if let Some(path) = &config.font_path {
            search = search.with_font_file(path);
        }
        if let Some(dir) = &config.font_dir {
            search = search.with_font_dir(dir);
        }
        Self::with_search(config, search)
    }

    /// A compositor with a caller-supplied font search policy.
    pub fn with_search(config: ConversionConfig, search: FontSearch) -> Self {
        Self {
            config,
            search,
            font: None,
            engine: Engine::default(),
        }
    }

    /// The cached font, resolving it on first use.
    pub fn font(&mut self) -> Result<&FontHandle, Pdf2MdError> {
        self.ensure_font()?;
        self.font
            .as_ref()
            .ok_or_else(|| Pdf2MdError::Internal("font cache empty after resolve".into()))
    }

    /// Drop the cached font.
    pub fn reset_font(&mut self) {
        self.font = None;
    }

    fn ensure_font(&mut self) -> Result<(), Pdf2MdError> {
        if self.font.is_none() {
            let handle = self.search.resolve()?;
            info!("Using font {}", handle.path().display());
            self.font = Some(handle);
        }
        Ok(())
    }

    /// Wrap `text` into physical lines for the configured page.
    pub fn wrap_text(&mut self, text: &str) -> Result<Vec<String>, Pdf2MdError> {
        self.ensure_font()?;
        let font = self
            .font
            .as_ref()
            .ok_or_else(|| Pdf2MdError::Internal("font cache empty after resolve".into()))?;
        let metrics = font.metrics(self.config.font_size_pt)?;
        let logical = wrap::logical_lines(text, self.config.tab_width);
        Ok(wrap::wrap_lines(
            &logical,
            self.config.max_line_width_pt(),
            &metrics,
        ))
    }

    /// Render wrapped lines into PDF bytes.
    fn render(
        &mut self,
        lines: &[String],
        mut on_line: impl FnMut(usize, usize),
        target: &Path,
    ) -> Result<Vec<u8>, Pdf2MdError> {
        let write_err = |e: PdfiumError| Pdf2MdError::PdfWriteFailed {
            path: target.to_path_buf(),
            detail: format!("{:?}", e),
        };

        let geometry = PageGeometry::from_config(&self.config);
        let font_size = PdfPoints::new(geometry.font_size);
        let (page_width, page_height) = (
            PdfPoints::new(geometry.width),
            PdfPoints::new(geometry.height),
        );

        let font = self
            .font
            .as_ref()
            .ok_or_else(|| Pdf2MdError::Internal("font cache empty after resolve".into()))?;
        let pdfium = self.engine.get()?;

        let mut document = pdfium.create_new_pdf().map_err(write_err)?;
        let font_token = document
            .fonts_mut()
            .load_true_type_from_bytes(font.bytes(), true)
            .map_err(write_err)?;

        let total = lines.len();
        let mut done = 0;
        for placed in paginate(lines, &geometry) {
            let mut page = document
                .pages_mut()
                .create_page_at_end(PdfPagePaperSize::from_points(page_width, page_height))
                .map_err(write_err)?;
            for line in placed {
                if !line.text.is_empty() {
                    page.objects_mut()
                        .create_text_object(
                            PdfPoints::new(line.x),
                            PdfPoints::new(line.y),
                            line.text,
                            font_token,
                            font_size,
                        )
                        .map_err(write_err)?;
                }
                done += 1;
                on_line(done, total);
            }
        }

        document.save_to_bytes().map_err(write_err)
    }
}

impl Converter for PageCompositor {
    fn direction(&self) -> Direction {
        Direction::MarkdownToPdf
    }

    fn convert(
        &mut self,
        source: &Path,
        output_dir: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<PathBuf, Pdf2MdError> {
        let source = input::resolve_source(source, Direction::MarkdownToPdf)?;
        info!("Composing pages: {}", source.display());

        let text = input::read_text(&source)?;
        let lines = self.wrap_text(&text)?;
        debug!("{} wrapped lines", lines.len());

        let out = output::output_path(&source, output_dir, Direction::MarkdownToPdf);
        let bytes = self.render(
            &lines,
            |done, total| progress.on_progress(&source, percent(done, total)),
            &out,
        )?;
        output::write_atomic(&out, &bytes)?;

        progress.on_progress(&source, 100);
        info!("Wrote {}", out.display());
        Ok(out)
    }
}
