//! pdfium rendering backend and the async rasterize entry points.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the whole open-render-slice sequence
//! onto a dedicated blocking thread, keeping the Tokio workers responsive
//! during CPU-heavy rendering. Pages are rendered strictly sequentially:
//! only one page's raster surface is live at a time, trading throughput for
//! bounded memory.

use crate::error::Design2CodeError;
use crate::pipeline::input;
use crate::pipeline::rasterize::{rasterize, RasterizeOptions, Slice, SourceDocument};
use crate::progress::ProgressCallback;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// A pdfium-backed document implementing the rasteriser's rendering port.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumSource<'a> {
    pub fn new(document: PdfDocument<'a>) -> Self {
        Self { document }
    }
}

impl SourceDocument for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(
        &self,
        page_number: usize,
        scale: f32,
    ) -> Result<DynamicImage, Design2CodeError> {
        let page = self
            .document
            .pages()
            .get((page_number - 1) as u16)
            .map_err(|e| Design2CodeError::RenderSurface {
                page: page_number,
                detail: format!("{e:?}"),
            })?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| Design2CodeError::RenderSurface {
                    page: page_number,
                    detail: format!("{e:?}"),
                })?;

        Ok(bitmap.as_image())
    }
}

/// Rasterise a PDF file into ordered slices.
///
/// Validates the file (existence, readability, `%PDF` magic) before any
/// rendering work starts, then runs the full open-render-slice sequence
/// inside `spawn_blocking`.
pub async fn rasterize_file(
    pdf_path: impl AsRef<Path>,
    options: RasterizeOptions,
    progress: Option<ProgressCallback>,
) -> Result<Vec<Slice>, Design2CodeError> {
    let path = input::validate_pdf(pdf_path.as_ref())?;

    let result = tokio::task::spawn_blocking(move || {
        let pdfium = Pdfium::default();

        let document = pdfium.load_pdf_from_file(&path, None).map_err(|e| {
            Design2CodeError::CorruptPdf {
                path: path.clone(),
                detail: format!("{e:?}"),
            }
        })?;

        let source = PdfiumSource::new(document);
        info!("PDF loaded: {} pages", source.page_count());

        rasterize(&source, &options, progress.as_deref())
    })
    .await
    .map_err(|e| Design2CodeError::Internal(format!("Rasterize task panicked: {e}")))?;

    result
}

/// Rasterise in-memory PDF bytes into ordered slices.
///
/// pdfium wants a file-system path, so the bytes are written to a managed
/// [`tempfile`] that is cleaned up automatically when this call returns.
/// This is the entry point for hosts that receive uploads as byte buffers.
pub async fn rasterize_bytes(
    bytes: &[u8],
    options: RasterizeOptions,
    progress: Option<ProgressCallback>,
) -> Result<Vec<Slice>, Design2CodeError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| Design2CodeError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Design2CodeError::Internal(format!("tempfile write: {e}")))?;

    let result = rasterize_file(tmp.path(), options, progress).await;
    // `tmp` dropped here, deleting the file even on error paths.
    result
}
