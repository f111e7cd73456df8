//! Queue runner integration tests.
//!
//! A scripted converter stands in for pdfium so these run anywhere: it
//! reports a fixed progress sequence per file and fails on demand.

use pdf2md::progress::ProgressCallback;
use pdf2md::{
    Converter, ConversionQueue, Direction, Pdf2MdError, QueueEvent, QueueRunner, QueueSummary,
};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Reports 0, 25, 50, … 100 and writes `<stem>.md`, unless the file stem
/// starts with `bad`.
struct ScriptedConverter {
    direction: Direction,
    calls: Arc<Mutex<Vec<PathBuf>>>,
    delay: Duration,
}

impl ScriptedConverter {
    fn boxed(direction: Direction, calls: Arc<Mutex<Vec<PathBuf>>>) -> Box<dyn Converter> {
        Box::new(Self {
            direction,
            calls,
            delay: Duration::ZERO,
        })
    }
}

impl Converter for ScriptedConverter {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn convert(
        &mut self,
        source: &Path,
        output_dir: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<PathBuf, Pdf2MdError> {
        self.calls.lock().unwrap().push(source.to_path_buf());
        std::thread::sleep(self.delay);

        let stem = source.file_stem().unwrap().to_string_lossy().into_owned();
        if stem.starts_with("bad") {
            progress.on_progress(source, 50);
            return Err(Pdf2MdError::CorruptPdf {
                path: source.to_path_buf(),
                detail: "scripted failure".into(),
            });
        }
        for p in [0, 25, 50, 75, 100] {
            progress.on_progress(source, p);
        }
        progress.on_progress(source, 100);
        Ok(output_dir.join(format!("{stem}.{}", self.direction.output_extension())))
    }
}

/// Keeps per-run state behind an `Rc`, so it can only live on the worker
/// thread that built it.
struct ThreadBoundConverter {
    direction: Direction,
    converted: Rc<Cell<usize>>,
}

impl Converter for ThreadBoundConverter {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn convert(
        &mut self,
        source: &Path,
        output_dir: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<PathBuf, Pdf2MdError> {
        self.converted.set(self.converted.get() + 1);
        progress.on_progress(source, 100);
        let stem = source.file_stem().unwrap().to_string_lossy().into_owned();
        Ok(output_dir.join(format!(
            "{stem}-{}.{}",
            self.converted.get(),
            self.direction.output_extension()
        )))
    }
}

fn queue_of(direction: Direction, files: &[&str]) -> ConversionQueue {
    let mut q = ConversionQueue::new(direction);
    q.set_output_dir("/out");
    for f in files {
        q.push(*f).unwrap();
    }
    q
}

async fn collect(mut rx: tokio::sync::mpsc::UnboundedReceiver<QueueEvent>) -> Vec<QueueEvent> {
    let mut events = Vec::new();
    while let Some(e) = rx.recv().await {
        events.push(e);
    }
    events
}

fn progress_by_file(events: &[QueueEvent]) -> HashMap<usize, Vec<u8>> {
    let mut map: HashMap<usize, Vec<u8>> = HashMap::new();
    for e in events {
        if let QueueEvent::Progress { index, percent, .. } = e {
            map.entry(*index).or_default().push(*percent);
        }
    }
    map
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn files_run_in_insertion_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let q = queue_of(Direction::PdfToMarkdown, &["/in/c.pdf", "/in/a.pdf", "/in/b.pdf"]);

    let mut runner = QueueRunner::new();
    let c = Arc::clone(&calls);
    let rx = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, c))
        .unwrap();
    let events = collect(rx).await;
    let summary = runner.wait().await.unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            PathBuf::from("/in/c.pdf"),
            PathBuf::from("/in/a.pdf"),
            PathBuf::from("/in/b.pdf")
        ]
    );
    assert_eq!(summary.succeeded(), 3);
    assert_eq!(
        summary.files[0].output.as_deref(),
        Some(Path::new("/out/c.md"))
    );

    let started: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            QueueEvent::Started { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![0, 1, 2]);
}

#[tokio::test]
async fn progress_starts_at_one_is_monotonic_and_ends_at_100() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let q = queue_of(Direction::MarkdownToPdf, &["/in/a.md", "/in/b.md"]);

    let mut runner = QueueRunner::new();
    let rx = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, calls))
        .unwrap();
    let events = collect(rx).await;
    runner.wait().await.unwrap();

    let by_file = progress_by_file(&events);
    for index in [0, 1] {
        let seq = &by_file[&index];
        assert_eq!(seq.first(), Some(&1), "file {index}: {seq:?}");
        assert_eq!(seq.last(), Some(&100), "file {index}: {seq:?}");
        assert!(seq.windows(2).all(|w| w[0] < w[1]), "file {index}: {seq:?}");
    }
}

#[tokio::test]
async fn event_order_per_file() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let q = queue_of(Direction::PdfToMarkdown, &["/in/only.pdf"]);

    let mut runner = QueueRunner::new();
    let rx = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, calls))
        .unwrap();
    let events = collect(rx).await;

    assert!(matches!(events.first(), Some(QueueEvent::Started { index: 0, .. })));
    assert!(matches!(
        events[events.len() - 2],
        QueueEvent::Finished { index: 0, .. }
    ));
    match events.last() {
        Some(QueueEvent::Drained { summary }) => assert!(summary.all_succeeded()),
        other => panic!("expected Drained last, got {other:?}"),
    }
}

#[tokio::test]
async fn failure_is_reported_and_queue_continues() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let q = queue_of(
        Direction::PdfToMarkdown,
        &["/in/good1.pdf", "/in/bad.pdf", "/in/good2.pdf"],
    );

    let mut runner = QueueRunner::new();
    let c = Arc::clone(&calls);
    let rx = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, c))
        .unwrap();
    let events = collect(rx).await;
    let summary: QueueSummary = runner.wait().await.unwrap();

    assert_eq!(calls.lock().unwrap().len(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);

    let failed = &summary.files[1];
    assert_eq!(failed.source, PathBuf::from("/in/bad.pdf"));
    assert!(failed.output.is_none());
    assert!(failed.error.as_deref().unwrap().contains("scripted failure"));

    let failure = events.iter().find_map(|e| match e {
        QueueEvent::Failed { index, source, error } => Some((*index, source.clone(), error.clone())),
        _ => None,
    });
    let (index, source, error) = failure.expect("a Failed event");
    assert_eq!(index, 1);
    assert_eq!(source, PathBuf::from("/in/bad.pdf"));
    assert!(error.contains("bad.pdf"));
}

#[tokio::test]
async fn second_start_while_running_is_rejected() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let q = queue_of(Direction::PdfToMarkdown, &["/in/slow.pdf"]);

    let mut runner = QueueRunner::new();
    let c = Arc::clone(&calls);
    let rx = runner
        .start(&q, move |d| {
            Box::new(ScriptedConverter {
                direction: d,
                calls: c,
                delay: Duration::from_millis(300),
            })
        })
        .unwrap();

    assert!(runner.is_busy());
    let c = Arc::clone(&calls);
    let err = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, c))
        .unwrap_err();
    assert!(matches!(err, Pdf2MdError::QueueBusy));

    collect(rx).await;
    let summary = runner.wait().await.unwrap();
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(calls.lock().unwrap().len(), 1);

    // Idle again: a new run is accepted.
    let c = Arc::clone(&calls);
    let rx = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, c))
        .unwrap();
    collect(rx).await;
    runner.wait().await.unwrap();
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn dropped_receiver_does_not_stop_the_worker() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let q = queue_of(Direction::PdfToMarkdown, &["/in/a.pdf", "/in/b.pdf"]);

    let mut runner = QueueRunner::new();
    let c = Arc::clone(&calls);
    let rx = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, c))
        .unwrap();
    drop(rx);

    let summary = runner.wait().await.unwrap();
    assert_eq!(summary.succeeded(), 2);
}

#[tokio::test]
async fn summary_serialises_to_json() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let q = queue_of(Direction::PdfToMarkdown, &["/in/a.pdf", "/in/bad.pdf"]);

    let mut runner = QueueRunner::new();
    let rx = runner
        .start(&q, move |d| ScriptedConverter::boxed(d, calls))
        .unwrap();
    collect(rx).await;
    let summary = runner.wait().await.unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["output_dir"], "/out");
    assert_eq!(json["files"][0]["output"], "/out/a.md");
    assert!(json["files"][1]["error"].is_string());
}

#[tokio::test]
async fn converter_that_is_not_send_runs_on_the_worker() {
    let q = queue_of(Direction::MarkdownToPdf, &["/in/a.md", "/in/b.md"]);

    let mut runner = QueueRunner::new();
    let rx = runner
        .start(&q, |d| {
            Box::new(ThreadBoundConverter {
                direction: d,
                converted: Rc::new(Cell::new(0)),
            })
        })
        .unwrap();
    collect(rx).await;
    let summary = runner.wait().await.unwrap();

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(
        summary.files[1].output.as_deref(),
        Some(Path::new("/out/b-2.pdf"))
    );
}
