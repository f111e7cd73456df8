//! Sequential conversion queue.
//!
//! A [`ConversionQueue`] collects source files for one [`Direction`] and an
//! output directory. [`QueueRunner::start`] hands a snapshot of it to a single
//! blocking worker that converts the files one after another, in insertion
//! order, and reports every step as a [`QueueEvent`] on an unbounded channel.
//!
//! ```text
//!  UI task                           worker (spawn_blocking)
//!  ───────                           ───────────────────────
//!  start(queue) ──── snapshot ─────▶ for each source:
//!                                      Started
//!  recv() ◀──── QueueEvent ───────     Progress{1} … Progress{100}
//!                                      Finished | Failed
//!                                    Drained{summary}
//! ```
//!
//! A failing file is reported and skipped; the queue always runs to the end.
//! There is no cancellation, and a second `start` while the worker is alive
//! is rejected with [`Pdf2MdError::QueueBusy`].

use crate::config::Direction;
use crate::convert::Converter;
use crate::error::Pdf2MdError;
use crate::progress::ProgressCallback;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{info, warn};

// ── Queue contents ───────────────────────────────────────────────────────

/// Files waiting to be converted in one direction.
#[derive(Debug, Clone, Default)]
pub struct ConversionQueue {
    direction: Direction,
    files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl ConversionQueue {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Queue `path`.
    ///
    /// Returns `Ok(false)` when the path is already queued. The first file
    /// added sets the output directory to its parent unless one was chosen.
    ///
    /// # Errors
    /// `UnsupportedExtension` when the file does not match the direction.
    pub fn push(&mut self, path: impl Into<PathBuf>) -> Result<bool, Pdf2MdError> {
        let path = path.into();
        if !self.direction.accepts(&path) {
            return Err(Pdf2MdError::UnsupportedExtension {
                path,
                expected: self.direction.source_filter(),
            });
        }
        if self.files.contains(&path) {
            return Ok(false);
        }
        if self.output_dir.is_none() {
            self.output_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .or_else(|| Some(PathBuf::from(".")));
        }
        self.files.push(path);
        Ok(true)
    }

    /// Switch direction. Queued files belong to the old direction and are
    /// dropped; the output directory is kept.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction != self.direction {
            self.direction = direction;
            self.files.clear();
        }
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = Some(dir.into());
    }
}

// ── Events and outcomes ──────────────────────────────────────────────────

/// One step of a queue run. `index` is the file's position in the queue.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    Started {
        index: usize,
        source: PathBuf,
    },
    Progress {
        index: usize,
        source: PathBuf,
        percent: u8,
    },
    Finished {
        index: usize,
        source: PathBuf,
        output: PathBuf,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
    Drained {
        summary: QueueSummary,
    },
}

/// Result for one queued file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-file outcomes of one queue run, in queue order.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSummary {
    pub direction: Direction,
    pub output_dir: PathBuf,
    pub files: Vec<FileOutcome>,
}

impl QueueSummary {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

// ── Worker ───────────────────────────────────────────────────────────────

/// Forwards converter progress for one file into the event channel,
/// dropping values that would move the bar backwards.
struct ChannelProgress<'a> {
    index: usize,
    tx: &'a UnboundedSender<QueueEvent>,
    last: AtomicU8,
}

impl ChannelProgress<'_> {
    fn send(&self, source: &Path, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        if percent > previous {
            let _ = self.tx.send(QueueEvent::Progress {
                index: self.index,
                source: source.to_path_buf(),
                percent,
            });
        }
    }
}

impl ProgressCallback for ChannelProgress<'_> {
    fn on_progress(&self, source: &Path, percent: u8) {
        self.send(source, percent);
    }
}

/// Convert `files` one after another, reporting on `tx`.
///
/// This is the worker body; it blocks for the whole run. Send failures are
/// ignored so a closed receiver never stops the conversion.
pub fn run_queue(
    files: &[PathBuf],
    output_dir: &Path,
    converter: &mut dyn Converter,
    tx: &UnboundedSender<QueueEvent>,
) -> QueueSummary {
    let direction = converter.direction();
    let mut outcomes = Vec::with_capacity(files.len());

    for (index, source) in files.iter().enumerate() {
        let _ = tx.send(QueueEvent::Started {
            index,
            source: source.clone(),
        });
        let progress = ChannelProgress {
            index,
            tx,
            last: AtomicU8::new(0),
        };
        progress.send(source, 1);

        let result = if direction.accepts(source) {
            converter.convert(source, output_dir, &progress)
        } else {
            Err(Pdf2MdError::UnsupportedExtension {
                path: source.clone(),
                expected: direction.source_filter(),
            })
        };

        match result {
            Ok(output) => {
                progress.send(source, 100);
                info!("Converted {} → {}", source.display(), output.display());
                let _ = tx.send(QueueEvent::Finished {
                    index,
                    source: source.clone(),
                    output: output.clone(),
                });
                outcomes.push(FileOutcome {
                    source: source.clone(),
                    output: Some(output),
                    error: None,
                });
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", source.display(), e);
                let _ = tx.send(QueueEvent::Failed {
                    index,
                    source: source.clone(),
                    error: e.to_string(),
                });
                outcomes.push(FileOutcome {
                    source: source.clone(),
                    output: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let summary = QueueSummary {
        direction,
        output_dir: output_dir.to_path_buf(),
        files: outcomes,
    };
    info!(
        "Queue drained: {} converted, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    let _ = tx.send(QueueEvent::Drained {
        summary: summary.clone(),
    });
    summary
}

// ── Runner ───────────────────────────────────────────────────────────────

/// Owns the single background worker.
#[derive(Debug, Default)]
pub struct QueueRunner {
    worker: Option<JoinHandle<QueueSummary>>,
}

impl QueueRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a worker is still converting.
    pub fn is_busy(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start converting a snapshot of `queue` on a blocking worker.
    ///
    /// `factory` builds the converter inside the worker, so converter state
    /// (pdfium binding, cached font) stays on that thread. Must be called
    /// from within a Tokio runtime.
    ///
    /// # Errors
    /// `QueueBusy`, `EmptyQueue` or `NoOutputDir`.
    pub fn start<F>(
        &mut self,
        queue: &ConversionQueue,
        factory: F,
    ) -> Result<UnboundedReceiver<QueueEvent>, Pdf2MdError>
    where
        F: FnOnce(Direction) -> Box<dyn Converter> + Send + 'static,
    {
        if self.is_busy() {
            return Err(Pdf2MdError::QueueBusy);
        }
        if queue.is_empty() {
            return Err(Pdf2MdError::EmptyQueue {
                expected: queue.direction().source_filter(),
            });
        }
        let output_dir = queue
            .output_dir()
            .map(Path::to_path_buf)
            .ok_or(Pdf2MdError::NoOutputDir)?;

        let files = queue.files().to_vec();
        let direction = queue.direction();
        let (tx, rx) = mpsc::unbounded_channel();

        info!(
            "Starting queue: {} file(s) → {}",
            files.len(),
            output_dir.display()
        );
        self.worker = Some(tokio::task::spawn_blocking(move || {
            let mut converter = factory(direction);
            run_queue(&files, &output_dir, converter.as_mut(), &tx)
        }));
        Ok(rx)
    }

    /// Wait for the current worker and return its summary.
    pub async fn wait(&mut self) -> Result<QueueSummary, Pdf2MdError> {
        let worker = self
            .worker
            .take()
            .ok_or_else(|| Pdf2MdError::Internal("no queue run was started".into()))?;
        worker
            .await
            .map_err(|e| Pdf2MdError::Internal(format!("Queue worker panicked: {}", e)))
    }
}
