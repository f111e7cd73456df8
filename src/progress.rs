//! Progress-callback trait for per-file conversion events.
//!
//! Converters report an integer percentage (0–100) for the file they are
//! working on. Within one file the reported values never decrease, and the
//! last one is always exactly 100.
//!
//! The queue worker forwards these into a channel (see
//! [`crate::queue`]); library callers can implement the trait directly to
//! drive their own progress display.
//!
//! # Example
//!
//! ```rust
//! use pdf2md::ProgressCallback;
//! use std::path::Path;
//! use std::sync::atomic::{AtomicU8, Ordering};
//!
//! struct Latest(AtomicU8);
//!
//! impl ProgressCallback for Latest {
//!     fn on_progress(&self, _source: &Path, percent: u8) {
//!         self.0.store(percent, Ordering::SeqCst);
//!     }
//! }
//!
//! let latest = Latest(AtomicU8::new(0));
//! latest.on_progress(Path::new("a.pdf"), 42);
//! assert_eq!(latest.0.load(Ordering::SeqCst), 42);
//! ```

use std::path::Path;
use std::sync::Arc;

/// Receives progress for the file currently being converted.
///
/// Implementations must be `Send + Sync`: the worker thread calls them while
/// other threads may hold a reference.
pub trait ProgressCallback: Send + Sync {
    /// `percent` is in `0..=100`.
    fn on_progress(&self, source: &Path, percent: u8) {
        let _ = (source, percent);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {}

/// Shared callback handle.
pub type SharedProgress = Arc<dyn ProgressCallback>;

/// `floor(done / total * 100)`, clamped to 100, with `total == 0` treated as 1.
pub fn percent(done: usize, total: usize) -> u8 {
    let total = total.max(1);
    (done.saturating_mul(100) / total).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording(Mutex<Vec<u8>>);

    impl ProgressCallback for Recording {
        fn on_progress(&self, _source: &Path, percent: u8) {
            self.0.lock().unwrap().push(percent);
        }
    }

    #[test]
    fn percent_floors() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn percent_zero_total_counts_as_one() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 0), 100);
    }

    #[test]
    fn percent_clamps_overshoot() {
        assert_eq!(percent(7, 3), 100);
    }

    #[test]
    fn percent_sequence_is_monotonic() {
        let total = 37;
        let seq: Vec<u8> = (1..=total).map(|i| percent(i, total)).collect();
        assert!(seq.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seq.last().unwrap(), 100);
    }

    #[test]
    fn noop_callback_does_not_panic() {
        NoopProgress.on_progress(Path::new("a.pdf"), 50);
    }

    #[test]
    fn arc_dyn_callback_records() {
        let rec = Arc::new(Recording(Mutex::new(Vec::new())));
        let cb: SharedProgress = rec.clone();
        cb.on_progress(Path::new("a.md"), 10);
        cb.on_progress(Path::new("a.md"), 100);
        assert_eq!(*rec.0.lock().unwrap(), vec![10, 100]);
    }
}
