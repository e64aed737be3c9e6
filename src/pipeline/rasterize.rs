//! The slicing core: turn one document into an ordered sequence of
//! bounded-height image slices.
//!
//! ## Why slice at all?
//!
//! Long-scrolling design exports render far taller than the maximum surface
//! height most raster backends tolerate — an oversized surface either fails
//! silently (blank output) or throws. Splitting an over-tall page into
//! consecutive vertical bands keeps every surface under the cap while still
//! giving the vision model full-resolution detail for the entire length of
//! the design. Band offsets must be exact: a gap or overlap between bands
//! corrupts the boundary the model relies on to stitch the slices back into
//! one continuous layout.
//!
//! ## The rendering port
//!
//! The core operates on the [`SourceDocument`] trait rather than a concrete
//! PDF library, so tests can drive it with a fake backend producing synthetic
//! pages of controlled height. The production backend is pdfium (see
//! [`crate::pipeline::pdfium`]).

use crate::config::GenerationConfig;
use crate::error::Design2CodeError;
use crate::pipeline::encode;
use crate::progress::SliceProgressCallback;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunables for one rasterize call.
///
/// Extracted from [`GenerationConfig`] so the rasteriser can run on a
/// blocking worker thread without dragging the whole config (and its
/// provider handles) along.
#[derive(Debug, Clone, Copy)]
pub struct RasterizeOptions {
    /// Rendering scale factor, must be > 0.
    pub scale: f32,
    /// Maximum vertical pixels per emitted slice.
    pub max_chunk_height: u32,
    /// Slack before a page counts as oversized.
    pub chunk_tolerance: u32,
    /// JPEG quality for encoded slices.
    pub jpeg_quality: u8,
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            max_chunk_height: 2500,
            chunk_tolerance: 100,
            jpeg_quality: 85,
        }
    }
}

impl From<&GenerationConfig> for RasterizeOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            scale: config.scale,
            max_chunk_height: config.max_chunk_height,
            chunk_tolerance: config.chunk_tolerance,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Derived, read-only geometry for one page at a chosen scale, in device
/// pixels. Recomputed per page; never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// One bounded-height raster slice of a page: either a whole page or one
/// vertical band of an over-tall page. Created once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slice {
    /// 1-based page this slice was cut from.
    pub page_number: usize,
    /// Position within the overall slice sequence, starting at 0.
    pub ordinal: usize,
    /// Vertical offset of this band within the full-page render.
    pub y_offset: u32,
    /// Slice dimensions in device pixels.
    pub width: u32,
    pub height: u32,
    /// Base64-encoded JPEG payload.
    pub image: String,
}

/// A paginated document handle the rasteriser can draw from.
///
/// Implementations render a page exactly once per `render_page` call; the
/// rasteriser reads vertical windows off the returned full-height image, so
/// only one page's raster surface is ever live at a time.
pub trait SourceDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render the full page (1-based index) at the given scale.
    fn render_page(&self, page_number: usize, scale: f32)
        -> Result<DynamicImage, Design2CodeError>;
}

/// One vertical band of a page render: `[y_offset, y_offset + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Band {
    pub y_offset: u32,
    pub height: u32,
}

/// Partition a page of `total_height` pixels into render bands.
///
/// Pages within `max_chunk + tolerance` stay whole — slicing a page that is
/// only marginally over the limit would produce a near-empty second band.
/// Taller pages yield `ceil(total / max_chunk)` bands: all but the last of
/// exactly `max_chunk` pixels, the last sized to the remainder. Consecutive
/// bands are contiguous and non-overlapping by construction.
pub(crate) fn chunk_plan(total_height: u32, max_chunk: u32, tolerance: u32) -> Vec<Band> {
    if total_height <= max_chunk.saturating_add(tolerance) {
        return vec![Band {
            y_offset: 0,
            height: total_height,
        }];
    }

    let num_chunks = total_height.div_ceil(max_chunk);
    (0..num_chunks)
        .map(|i| {
            let y_offset = i * max_chunk;
            Band {
                y_offset,
                height: (total_height - y_offset).min(max_chunk),
            }
        })
        .collect()
}

/// Rasterise a document into an ordered sequence of bounded-height slices.
///
/// Pages are processed strictly sequentially, 1 to `page_count`; within a
/// page, bands are emitted top to bottom. The output therefore satisfies the
/// ordering invariant: all slices of page *i* precede all slices of page
/// *i+1*, and `(page_number, ordinal)` keys are strictly increasing.
///
/// The progress callback is invoked synchronously once per page, before that
/// page's render work begins.
///
/// # Errors
/// * [`Design2CodeError::EmptyDocument`] when the document has no pages.
/// * [`Design2CodeError::RenderSurface`] / [`Design2CodeError::SliceEncodeFailed`]
///   when any page fails — the whole call aborts immediately; a partial slice
///   list is never returned. There are no retries: the caller decides whether
///   to prompt for a different file.
pub fn rasterize(
    document: &dyn SourceDocument,
    options: &RasterizeOptions,
    progress: Option<&dyn SliceProgressCallback>,
) -> Result<Vec<Slice>, Design2CodeError> {
    let total_pages = document.page_count();
    if total_pages == 0 {
        return Err(Design2CodeError::EmptyDocument);
    }

    if let Some(cb) = progress {
        cb.on_document_start(total_pages);
    }

    let mut slices: Vec<Slice> = Vec::with_capacity(total_pages);

    for page_number in 1..=total_pages {
        if let Some(cb) = progress {
            cb.on_page_start(page_number, total_pages);
        }

        // One full-height render per page; bands are windows off this image.
        let page_image = document.render_page(page_number, options.scale)?;
        let viewport = Viewport {
            width: page_image.width(),
            height: page_image.height(),
        };
        debug!(
            "Page {}/{} rendered at scale {} → {}x{} px",
            page_number, total_pages, options.scale, viewport.width, viewport.height
        );

        let bands = chunk_plan(
            viewport.height,
            options.max_chunk_height,
            options.chunk_tolerance,
        );
        debug!("Page {} → {} band(s)", page_number, bands.len());

        for band in bands {
            let window = if band.y_offset == 0 && band.height == viewport.height {
                page_image.clone()
            } else {
                page_image.crop_imm(0, band.y_offset, viewport.width, band.height)
            };

            let encoded = encode::encode_slice(&window, options.jpeg_quality).map_err(|e| {
                Design2CodeError::SliceEncodeFailed {
                    page: page_number,
                    detail: e.to_string(),
                }
            })?;

            slices.push(Slice {
                page_number,
                ordinal: slices.len(),
                y_offset: band.y_offset,
                width: window.width(),
                height: window.height(),
                image: encoded,
            });
        }
    }

    if let Some(cb) = progress {
        cb.on_document_complete(total_pages, slices.len());
    }

    Ok(slices)
}
