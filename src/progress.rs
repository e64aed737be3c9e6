//! Progress-callback trait for per-page rasterisation events.
//!
//! Inject an [`Arc<dyn SliceProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events as each page of the document is rasterised.
//!
//! Progress is reported per **page**, not per slice: the slice count of a
//! page is unknown until its rendered height has been measured, so the only
//! stable unit to report against is the page count. `on_page_start` fires
//! synchronously before the page's render work begins.
//!
//! # Why callbacks instead of channels?
//!
//! A plain trait is the least-invasive integration point: callers can forward
//! events to a progress bar, a channel, or a UI without the library knowing
//! anything about how the host communicates. The trait is `Send + Sync`
//! because rasterisation runs on a blocking worker thread.

use std::sync::Arc;

/// Called by the rasteriser as it works through the document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait SliceProgressCallback: Send + Sync {
    /// Called once after the document is opened, before any page is rendered.
    fn on_document_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before each page's render work begins.
    ///
    /// Invoked exactly `total` times per rasterize call, with `current`
    /// strictly increasing from 1 to `total` inclusive.
    fn on_page_start(&self, current: usize, total: usize) {
        let _ = (current, total);
    }

    /// Called once after the last page, with the final slice count.
    fn on_document_complete(&self, total_pages: usize, slice_count: usize) {
        let _ = (total_pages, slice_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SliceProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn SliceProgressCallback>;
