//! Progress-callback trait for per-page assembly events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the body assembler works through the rendered pages.
//!
//! # Example
//!
//! ```rust
//! use pdf2html::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, body_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} bytes)", page_num, total_pages, body_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the body assembler as it processes each page.
///
/// Pages are assembled sequentially inside a spawned task, so
/// implementations must be `Send + Sync`. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the renderer has reported the page count.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page has been located, sanitized and appended.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `body_len`    — byte length of the sanitized page body
    fn on_page_complete(&self, page_num: usize, total_pages: usize, body_len: usize) {
        let _ = (page_num, total_pages, body_len);
    }

    /// Called once after every page has been appended.
    fn on_conversion_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        started_total: AtomicUsize,
        completes: AtomicUsize,
        bytes: AtomicUsize,
        finished_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_pages: usize) {
            self.started_total.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, body_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.bytes.fetch_add(body_len, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, total_pages: usize) {
            self.finished_total.store(total_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_page_complete(1, 5, 42);
        cb.on_conversion_complete(5);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            started_total: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            bytes: AtomicUsize::new(0),
            finished_total: AtomicUsize::new(0),
        };

        tracker.on_conversion_start(2);
        tracker.on_page_complete(1, 2, 100);
        tracker.on_page_complete(2, 2, 50);
        tracker.on_conversion_complete(2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.bytes.load(Ordering::SeqCst), 150);
        assert_eq!(tracker.finished_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(10);
        cb.on_page_complete(1, 10, 512);
    }
}
