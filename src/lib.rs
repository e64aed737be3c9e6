//! # design2code
//!
//! Convert a PDF export of a UI design into React or Bootstrap source code
//! using Vision Language Models (VLMs).
//!
//! ## Why this crate?
//!
//! Design hand-off tools export long-scrolling mockups as PDF. Feeding those
//! to a vision model naively fails in two ways: rendering a full page at high
//! resolution blows past safe raster-surface limits, and downscaling to fit
//! destroys the small text and spacing the model needs to reproduce the
//! layout. Instead this crate rasterises each page at scale 2.0 and slices
//! anything over 2 500 px tall into contiguous vertical bands with exact
//! offsets, so the model sees the whole design at full resolution and can
//! stitch the bands back into one continuous layout.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Validate   %PDF magic, readability
//!  ├─ 2. Rasterize  render each page via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Slice      split over-tall pages into ≤2500 px vertical bands
//!  ├─ 4. Encode     JPEG (q85) → base64 slices, strict document order
//!  ├─ 5. Generate   one VLM call: all slices + 4-stage protocol prompt
//!  └─ 6. Clean      defensive code-fence strip → final source code
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use design2code::{GenerationConfig, GenerationSession, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / GEMINI_API_KEY / …
//!     let config = GenerationConfig::builder()
//!         .format(OutputFormat::React)
//!         .build()?;
//!
//!     let mut session = GenerationSession::new(config);
//!     session.begin_upload("landing-page.pdf").await?;
//!     session.generate().await?;
//!     println!("{}", session.result().unwrap());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `design2code` binary (clap + indicatif + arboard) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! design2code = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder, OutputFormat};
pub use error::Design2CodeError;
pub use model::{CodeModel, ModelRequest};
pub use pipeline::rasterize::{rasterize, RasterizeOptions, Slice, SourceDocument, Viewport};
pub use pipeline::pdfium::{rasterize_bytes, rasterize_file};
pub use progress::{NoopProgressCallback, ProgressCallback, SliceProgressCallback};
pub use session::{GenerationSession, SessionStatus, GENERIC_RETRY_MESSAGE};
