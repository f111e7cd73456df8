//! CLI binary for pdf2md.
//!
//! A thin shim over the library crate: builds a `ConversionQueue` from the
//! command line, runs it on the background worker and renders its events as
//! one progress bar per file.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use pdf2md::{
    converter_for, ConversionConfig, ConversionQueue, Direction, PaperSize, Pdf2MdError,
    QueueEvent, QueueRunner,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── Per-file progress bars ───────────────────────────────────────────────────

/// One bar per queued file, stacked in queue order.
struct FileBars {
    multi: MultiProgress,
    bars: Vec<ProgressBar>,
}

impl FileBars {
    fn new(files: &[PathBuf], visible: bool) -> Self {
        let multi = if visible {
            MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let style = ProgressStyle::with_template(
            "{prefix:<28!} [{bar:36.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        let bars = files
            .iter()
            .map(|f| {
                let bar = multi.add(ProgressBar::new(100));
                bar.set_style(style.clone());
                bar.set_prefix(display_name(f));
                bar.set_message(dim("waiting"));
                bar
            })
            .collect();

        Self { multi, bars }
    }

    fn get(&self, index: usize) -> Option<&ProgressBar> {
        self.bars.get(index)
    }

    fn println(&self, line: String) {
        if self.multi.is_hidden() {
            eprintln!("{line}");
        } else {
            let _ = self.multi.println(line);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract text from PDFs next to the sources
  pdf2md report.pdf slides.pdf

  # Lay Markdown out onto A4 pages in another directory
  pdf2md notes.md -o out/

  # US Letter, 11pt, explicit font
  pdf2md --paper letter --font-size 11 --font ~/fonts/DejaVuSans.ttf notes.md

  # Machine-readable summary
  pdf2md --json *.pdf > summary.json

DIRECTION:
  The direction is inferred from the first file (.pdf → Markdown, .md → PDF)
  unless --to is given. Files that do not match the direction are skipped
  and reported as failures.

FONTS (Markdown → PDF):
  Line widths are measured with a real font. The first one that loads wins:
    1. --font / PDF2MD_FONT_PATH
    2. --font-dir / PDF2MD_FONT_DIR
    3. fonts/ under PDF2MD_RESOURCE_DIR, the executable directory,
       the project directory and the current directory
    4. the per-user font directory
    5. well-known system fonts (DejaVu, Noto CJK, Arial, Microsoft YaHei, …)

ENVIRONMENT VARIABLES:
  PDF2MD_OUTPUT_DIR     Default output directory
  PDF2MD_FONT_PATH      Font file for Markdown → PDF
  PDF2MD_FONT_DIR       Directory of fonts for Markdown → PDF
  PDF2MD_RESOURCE_DIR   Bundled resource directory (searched for fonts/)
  PDFIUM_LIB_PATH       Path to an existing libpdfium
  RUST_LOG              Log filter, e.g. RUST_LOG=pdf2md=debug
"#;

/// Convert PDF files to Markdown and Markdown files to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert PDF files to Markdown and Markdown files to PDF",
    long_about = "Convert a batch of PDF documents to Markdown text, or Markdown text files to \
paginated PDF. Files are converted one at a time with a progress bar per file; a file that \
fails is reported and the rest of the batch continues.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source files (.pdf or .md).
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Conversion direction. Default: inferred from the first file.
    #[arg(long, value_enum)]
    to: Option<ToArg>,

    /// Output directory. Default: the first file's directory.
    #[arg(short, long, env = "PDF2MD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Font file for Markdown → PDF.
    #[arg(long, env = "PDF2MD_FONT_PATH")]
    font: Option<PathBuf>,

    /// Directory scanned for fonts for Markdown → PDF.
    #[arg(long, env = "PDF2MD_FONT_DIR")]
    font_dir: Option<PathBuf>,

    /// Page size for Markdown → PDF.
    #[arg(long, env = "PDF2MD_PAPER", value_enum, default_value = "a4")]
    paper: PaperArg,

    /// Font size in points (4–72).
    #[arg(long, env = "PDF2MD_FONT_SIZE", default_value_t = 12.0)]
    font_size: f32,

    /// Left, right and top margin in millimetres (0–50).
    #[arg(long, env = "PDF2MD_MARGIN_MM", default_value_t = 10.0)]
    margin_mm: f32,

    /// Print a JSON summary of the run to stdout.
    #[arg(long, env = "PDF2MD_JSON")]
    json: bool,

    /// Disable progress bars.
    #[arg(long, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ToArg {
    Markdown,
    Pdf,
}

impl From<ToArg> for Direction {
    fn from(v: ToArg) -> Self {
        match v {
            ToArg::Markdown => Direction::PdfToMarkdown,
            ToArg::Pdf => Direction::MarkdownToPdf,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PaperArg {
    A4,
    Letter,
}

impl From<PaperArg> for PaperSize {
    fn from(v: PaperArg) -> Self {
        match v {
            PaperArg::A4 => PaperSize::A4,
            PaperArg::Letter => PaperSize::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while bars are drawn; the bars carry
    // the per-file feedback.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build queue ──────────────────────────────────────────────────────
    let direction = match cli.to {
        Some(to) => Direction::from(to),
        None => Direction::infer(&cli.files[0]).with_context(|| {
            format!(
                "Cannot infer direction from '{}': expected a .pdf or .md file (or pass --to)",
                cli.files[0].display()
            )
        })?,
    };

    let mut queue = ConversionQueue::new(direction);
    if let Some(ref dir) = cli.output_dir {
        queue.set_output_dir(dir);
    }

    let mut rejected = 0usize;
    for file in &cli.files {
        match queue.push(file) {
            Ok(true) => {}
            Ok(false) => {
                if !cli.quiet {
                    eprintln!("{} {} {}", dim("·"), file.display(), dim("(duplicate, ignored)"));
                }
            }
            Err(e @ Pdf2MdError::UnsupportedExtension { .. }) => {
                rejected += 1;
                eprintln!("{} {}", red("✗"), e);
            }
            Err(e) => return Err(e).context("Failed to queue file"),
        }
    }

    let config = build_config(&cli)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let mut runner = QueueRunner::new();
    let mut events = runner
        .start(&queue, move |d| converter_for(d, &config))
        .context("Failed to start conversion")?;

    let bars = FileBars::new(queue.files(), show_progress);
    while let Some(event) = events.recv().await {
        match event {
            QueueEvent::Started { index, .. } => {
                if let Some(bar) = bars.get(index) {
                    bar.set_message("converting");
                }
            }
            QueueEvent::Progress { index, percent, .. } => {
                if let Some(bar) = bars.get(index) {
                    bar.set_position(percent as u64);
                }
            }
            QueueEvent::Finished {
                index,
                source,
                output,
            } => {
                if let Some(bar) = bars.get(index) {
                    bar.set_position(100);
                    bar.finish_with_message(green("done"));
                }
                if !cli.quiet && !show_progress && !cli.json {
                    eprintln!(
                        "{} {}  →  {}",
                        green("✓"),
                        source.display(),
                        output.display()
                    );
                }
            }
            QueueEvent::Failed {
                index,
                source,
                error,
            } => {
                if let Some(bar) = bars.get(index) {
                    bar.abandon_with_message(red("failed"));
                }
                bars.println(format!(
                    "{} {}: {}",
                    red("✗"),
                    bold(&display_name(&source)),
                    error
                ));
            }
            QueueEvent::Drained { .. } => break,
        }
    }

    let summary = runner.wait().await.context("Conversion worker failed")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        let total = summary.files.len() + rejected;
        let failed = summary.failed() + rejected;
        eprintln!(
            "{} {}/{} files converted  →  {}",
            if failed == 0 { green("✔") } else { yellow("⚠") },
            bold(&summary.succeeded().to_string()),
            total,
            bold(&summary.output_dir.display().to_string()),
        );
    }

    let failed = summary.failed() + rejected;
    if failed > 0 {
        anyhow::bail!("{failed} file(s) failed to convert");
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .paper(cli.paper.into())
        .font_size_pt(cli.font_size)
        .margin_mm(cli.margin_mm);

    if let Some(ref path) = cli.font {
        builder = builder.font_path(path);
    }
    if let Some(ref dir) = cli.font_dir {
        builder = builder.font_dir(dir);
    }

    builder.build().context("Invalid configuration")
}
