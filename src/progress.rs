//! Progress-callback trait for per-document processing events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to receive
//! events as the pipeline uploads, polls and saves each document. The
//! library itself only emits `tracing` records; anything user-facing (the
//! CLI's "Uploading: …" lines and poll spinner) hangs off this trait.
//!
//! # Example
//!
//! ```rust
//! use notes_ocr::{ClientConfig, JobProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PollCounter {
//!     polls: AtomicUsize,
//! }
//!
//! impl JobProgressCallback for PollCounter {
//!     fn on_poll(&self, _doc_id: &str, _attempt: u32, _status: Option<&str>) {
//!         self.polls.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PollCounter { polls: AtomicUsize::new(0) });
//!
//! let config = ClientConfig::builder("token")
//!     .progress_callback(counter as Arc<dyn JobProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::DocumentOutput;
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Processing is sequential, so events for one
/// document never interleave with another's.
pub trait JobProgressCallback: Send + Sync {
    /// Called once in batch mode after discovery, before the first upload.
    fn on_batch_start(&self, dir: &Path, total: usize) {
        let _ = (dir, total);
    }

    /// Called just before a PDF is uploaded.
    fn on_upload_start(&self, pdf: &Path) {
        let _ = pdf;
    }

    /// Called once the API has accepted the upload and assigned an id.
    fn on_uploaded(&self, pdf: &Path, doc_id: &str) {
        let _ = (pdf, doc_id);
    }

    /// Called after every status poll that did not finish the job.
    ///
    /// # Arguments
    /// * `attempt`: 1-based poll round
    /// * `status` : job status reported by the API; `None` for HTTP 202
    ///   or a body without a `status` field
    fn on_poll(&self, doc_id: &str, attempt: u32, status: Option<&str>) {
        let _ = (doc_id, attempt, status);
    }

    /// Called after all three artifacts have been written.
    fn on_saved(&self, pdf: &Path, output: &DocumentOutput) {
        let _ = (pdf, output);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        uploads: AtomicUsize,
        polls: AtomicUsize,
        ids: Mutex<Vec<String>>,
    }

    impl JobProgressCallback for TrackingCallback {
        fn on_upload_start(&self, _pdf: &Path) {
            self.uploads.fetch_add(1, Ordering::SeqCst);
        }

        fn on_uploaded(&self, _pdf: &Path, doc_id: &str) {
            self.ids.lock().unwrap().push(doc_id.to_string());
        }

        fn on_poll(&self, _doc_id: &str, _attempt: u32, _status: Option<&str>) {
            self.polls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let pdf = PathBuf::from("a.pdf");
        cb.on_batch_start(Path::new("."), 2);
        cb.on_upload_start(&pdf);
        cb.on_uploaded(&pdf, "doc-1");
        cb.on_poll("doc-1", 1, None);
        cb.on_saved(
            &pdf,
            &DocumentOutput {
                pdf: pdf.clone(),
                doc_id: "doc-1".into(),
                out_dir: PathBuf::from("out/a"),
                page_count: Some(1),
                results: 1,
            },
        );
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let pdf = PathBuf::from("notes.pdf");

        tracker.on_upload_start(&pdf);
        tracker.on_uploaded(&pdf, "abc");
        tracker.on_poll("abc", 1, None);
        tracker.on_poll("abc", 2, Some("processing"));

        assert_eq!(tracker.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.polls.load(Ordering::SeqCst), 2);
        assert_eq!(*tracker.ids.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(Path::new("/tmp"), 10);
        cb.on_poll("x", 3, Some("queued"));
    }
}
