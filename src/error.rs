//! Error types for the design2code library.
//!
//! One fatal error enum covers the whole pipeline. The taxonomy follows the
//! four failure classes of the system:
//!
//! * **Input validation** — wrong file type, empty document. Immediate,
//!   non-fatal to the session: no state has been touched when these fire.
//! * **Rendering failure** — a page could not be rasterised or a slice could
//!   not be encoded. These abort the whole rasterize call; a partial slice
//!   list is never surfaced.
//! * **Configuration failure** — no vision provider could be resolved
//!   (missing API key). Detected before the network call is issued.
//! * **Remote-call failure** — the model request itself failed. Full detail
//!   is carried here for logging; the session deliberately shows the user a
//!   single generic retry message instead (see [`crate::session`]).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the design2code library.
#[derive(Debug, Error)]
pub enum Design2CodeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}\nOnly PDF design exports are supported.")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry re-exporting the design from your editor.")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The document parsed but contains no pages.
    #[error("Document has no pages — nothing to rasterise.")]
    EmptyDocument,

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// A rendering surface could not be produced for a page.
    ///
    /// This aborts the whole rasterize call: the slice list is all-or-nothing.
    #[error("Rendering failed on page {page}: {detail}")]
    RenderSurface { page: usize, detail: String },

    /// A rendered band could not be encoded as a JPEG slice.
    #[error("Slice encoding failed on page {page}: {detail}")]
    SliceEncodeFailed { page: usize, detail: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// No vision provider is configured (missing API key etc.).
    #[error("Vision provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The generation request failed (network, quota, empty response…).
    ///
    /// Carried for logging only — the session surfaces a fixed generic
    /// message to the user regardless of the cause.
    #[error("Code generation failed: {detail}")]
    GenerationFailed { detail: String },

    // ── Session guard rejections ──────────────────────────────────────────
    /// A transition was attempted while a generation call is in flight.
    #[error("A generation is already in progress — wait for it to finish.")]
    GenerationInProgress,

    /// `generate()` was called with an empty slice list.
    #[error("No design slices loaded — upload a PDF first.")]
    NothingToGenerate,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_surface_names_the_page() {
        let e = Design2CodeError::RenderSurface {
            page: 3,
            detail: "bitmap allocation failed".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("bitmap allocation failed"));
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = Design2CodeError::NotAPdf {
            path: PathBuf::from("/tmp/design.png"),
            magic: *b"\x89PNG",
        };
        assert!(e.to_string().contains("design.png"));
    }

    #[test]
    fn provider_not_configured_display() {
        let e = Design2CodeError::ProviderNotConfigured {
            provider: "auto".into(),
            hint: "set OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }
}
