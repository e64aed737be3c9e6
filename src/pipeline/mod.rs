//! Pipeline stages for design-to-code conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap the rendering
//! backend without touching the slicing logic.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ encode ──▶ model ──▶ postprocess
//! (path)    (slicing)    (base64)   (VLM)     (fence strip)
//! ```
//!
//! 1. [`input`]       — validate the user-supplied PDF path
//! 2. [`rasterize`]   — the slicing core, driven through the
//!    [`rasterize::SourceDocument`] port
//! 3. [`pdfium`]      — production rendering backend; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 4. [`encode`]      — JPEG-encode and base64-wrap each slice
//! 5. [`postprocess`] — defensive fence stripping on the model response

pub mod encode;
pub mod input;
pub mod pdfium;
pub mod postprocess;
pub mod rasterize;
