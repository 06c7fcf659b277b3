//! Progress-callback trait for per-link extraction events.
//!
//! Inject an `Arc<dyn ExtractionProgressCallback>` via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the deck and its links.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a log, or a terminal progress bar without the
//! library knowing how the host application communicates. The trait is
//! `Send + Sync` because link fetches overlap.

/// Called by the pipeline as it processes the deck and each discovered link.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. When `concurrency > 1`, the link methods may be
/// called concurrently from different tasks; implementations must guard
/// shared mutable state.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the PDF pass, before any link is fetched.
    fn on_pdf_extracted(&self, total_pages: usize, total_links: usize) {
        let _ = (total_pages, total_links);
    }

    /// Called just before a link is fetched. `index` is 0-based in discovery
    /// order.
    fn on_link_start(&self, index: usize, total: usize, url: &str) {
        let _ = (index, total, url);
    }

    /// Called when a link's extraction finished successfully.
    fn on_link_complete(&self, index: usize, total: usize, url: &str) {
        let _ = (index, total, url);
    }

    /// Called when a link's extraction was recorded as failed.
    fn on_link_error(&self, index: usize, total: usize, url: &str, error: &str) {
        let _ = (index, total, url, error);
    }

    /// Called once after the last link, before the record is assembled.
    fn on_extraction_complete(&self, total_links: usize, failed_links: usize) {
        let _ = (total_links, failed_links);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        completed: AtomicUsize,
    }

    impl ExtractionProgressCallback for Counting {
        fn on_link_complete(&self, _index: usize, _total: usize, _url: &str) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_methods_are_no_ops() {
        let cb = Counting {
            completed: AtomicUsize::new(0),
        };
        cb.on_pdf_extracted(10, 3);
        cb.on_link_start(0, 3, "https://example.org");
        cb.on_link_error(1, 3, "https://example.org", "timed out");
        assert_eq!(cb.completed.load(Ordering::SeqCst), 0);

        cb.on_link_complete(2, 3, "https://example.org");
        assert_eq!(cb.completed.load(Ordering::SeqCst), 1);
    }
}
