//! The generation orchestrator: minimal session state plus guarded
//! transitions.
//!
//! Exactly one session is live at a time from the caller's perspective;
//! starting a new upload implicitly discards the previous slices and result.
//! All mutation goes through the transition methods below, and the status
//! guards make concurrent transitions impossible without a lock: `generate`
//! holds `&mut self` across its single await, so nothing else can touch the
//! session while a call is in flight.
//!
//! ## The generic error message
//!
//! Remote failures are deliberately indistinguishable to the user: an
//! authentication failure and a transient network failure both surface as
//! [`GENERIC_RETRY_MESSAGE`]. The full cause is logged via `tracing` for the
//! operator; showing raw provider errors to end users leaks nothing useful
//! and a lot that is confusing.

use crate::config::{GenerationConfig, OutputFormat};
use crate::error::Design2CodeError;
use crate::model::{self, ModelRequest};
use crate::pipeline::rasterize::{RasterizeOptions, Slice};
use crate::pipeline::{pdfium, postprocess};
use std::path::Path;
use tracing::{error, info};

/// The fixed user-facing message for any failed generation attempt.
pub const GENERIC_RETRY_MESSAGE: &str =
    "Failed to generate code. Please check your API key and try again.";

/// Session status — a closed set of states.
///
/// `Error` and `Completed` both return to `Idle` on the next upload; no
/// state is terminal within a session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No generation in flight. Slices may or may not be loaded.
    #[default]
    Idle,
    /// Exactly one model call is in flight.
    Generating,
    /// The last generation succeeded; the result is available.
    Completed,
    /// The last generation failed; `error_message()` holds the generic text.
    Error,
}

/// One upload-through-result session.
///
/// # Example
/// ```rust,no_run
/// use design2code::{GenerationConfig, GenerationSession, OutputFormat};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = GenerationConfig::default();
///     let mut session = GenerationSession::new(config);
///
///     session.begin_upload("design.pdf").await?;
///     println!("{} slices ready", session.slice_count());
///
///     session.set_output_format(OutputFormat::Bootstrap);
///     session.generate().await?;
///     println!("{}", session.result().unwrap());
///     Ok(())
/// }
/// ```
pub struct GenerationSession {
    config: GenerationConfig,
    status: SessionStatus,
    slices: Vec<Slice>,
    result: Option<String>,
    error: Option<String>,
}

impl GenerationSession {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            status: SessionStatus::Idle,
            slices: Vec::new(),
            result: None,
            error: None,
        }
    }

    // ── Read accessors ────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    pub fn output_format(&self) -> OutputFormat {
        self.config.format
    }

    /// The generated code, if the last generation completed.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// The user-facing error message, if the last generation failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Rasterise a new PDF and replace the session's slice list.
    ///
    /// Rejected without any state change while a generation is in flight, or
    /// when the file fails validation (wrong type, missing). On rasterize
    /// failure after validation the slice list is cleared — a partial list
    /// is never kept — and the session returns to `Idle`.
    pub async fn begin_upload(
        &mut self,
        pdf_path: impl AsRef<Path>,
    ) -> Result<usize, Design2CodeError> {
        if self.status == SessionStatus::Generating {
            return Err(Design2CodeError::GenerationInProgress);
        }

        let options = RasterizeOptions::from(&self.config);
        let progress = self.config.progress_callback.clone();

        match pdfium::rasterize_file(pdf_path.as_ref(), options, progress).await {
            Ok(slices) => {
                info!("Upload ready: {} slice(s)", slices.len());
                self.slices = slices;
                self.result = None;
                self.error = None;
                self.status = SessionStatus::Idle;
                Ok(self.slices.len())
            }
            Err(e @ Design2CodeError::FileNotFound { .. })
            | Err(e @ Design2CodeError::PermissionDenied { .. })
            | Err(e @ Design2CodeError::NotAPdf { .. }) => {
                // Input validation failed before any work: no state change.
                Err(e)
            }
            Err(e) => {
                self.slices.clear();
                self.result = None;
                self.error = None;
                self.status = SessionStatus::Idle;
                Err(e)
            }
        }
    }

    /// Adopt an externally rasterised slice list.
    ///
    /// This is the Rasterizer → Orchestrator transfer seam for hosts that
    /// drive [`crate::rasterize`] themselves. Same guards and resets as
    /// [`Self::begin_upload`].
    pub fn adopt_slices(&mut self, slices: Vec<Slice>) -> Result<usize, Design2CodeError> {
        if self.status == SessionStatus::Generating {
            return Err(Design2CodeError::GenerationInProgress);
        }
        self.slices = slices;
        self.result = None;
        self.error = None;
        self.status = SessionStatus::Idle;
        Ok(self.slices.len())
    }

    /// Discard the current slices and result.
    pub fn clear(&mut self) -> Result<(), Design2CodeError> {
        if self.status == SessionStatus::Generating {
            return Err(Design2CodeError::GenerationInProgress);
        }
        self.slices.clear();
        self.result = None;
        self.error = None;
        self.status = SessionStatus::Idle;
        Ok(())
    }

    /// Choose the output format for the next `generate()` call.
    ///
    /// Valid at any time; never triggers regeneration by itself.
    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.config.format = format;
    }

    /// Issue exactly one generation call with the full slice list.
    ///
    /// Rejected with no state change when the slice list is empty or a call
    /// is already in flight. On success the cleaned result is stored and the
    /// session moves to `Completed`. On any failure — missing credentials
    /// included — the session moves to `Error` with the fixed generic
    /// message; the slice list is preserved so the user can simply retry.
    pub async fn generate(&mut self) -> Result<(), Design2CodeError> {
        if self.status == SessionStatus::Generating {
            return Err(Design2CodeError::GenerationInProgress);
        }
        if self.slices.is_empty() {
            return Err(Design2CodeError::NothingToGenerate);
        }

        self.status = SessionStatus::Generating;
        self.result = None;
        self.error = None;

        let outcome = async {
            // Credential resolution happens here, not at session creation:
            // a missing key is a generate-time failure.
            let model = model::resolve_model(&self.config)?;
            let request = ModelRequest::from_slices(&self.slices, &self.config);
            info!(
                "Generating {} from {} slice(s)",
                self.config.format,
                self.slices.len()
            );
            model.generate_code(&request).await
        }
        .await;

        match outcome {
            Ok(raw) => {
                self.result = Some(postprocess::strip_code_fences(&raw));
                self.status = SessionStatus::Completed;
                Ok(())
            }
            Err(e) => {
                error!("Generation failed: {e}");
                self.error = Some(GENERIC_RETRY_MESSAGE.to_string());
                self.status = SessionStatus::Error;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CodeModel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts calls; never meant to be reached by the guarded paths.
    struct CountingModel {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CodeModel for CountingModel {
        async fn generate_code(&self, _request: &ModelRequest) -> Result<String, Design2CodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("code".into())
        }
    }

    fn slice(page: usize, ordinal: usize) -> Slice {
        Slice {
            page_number: page,
            ordinal,
            y_offset: 0,
            width: 800,
            height: 1000,
            image: "aGVsbG8=".into(),
        }
    }

    #[tokio::test]
    async fn generate_rejected_with_empty_slices() {
        let mut session = GenerationSession::new(GenerationConfig::default());
        let err = session.generate().await.unwrap_err();
        assert!(matches!(err, Design2CodeError::NothingToGenerate));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.result().is_none());
        assert!(session.error_message().is_none());
    }

    #[test]
    fn adopt_slices_resets_result() {
        let mut session = GenerationSession::new(GenerationConfig::default());
        session.result = Some("old code".into());
        session.status = SessionStatus::Completed;

        let n = session.adopt_slices(vec![slice(1, 0), slice(1, 1)]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.result().is_none());
    }

    #[test]
    fn clear_discards_everything() {
        let mut session = GenerationSession::new(GenerationConfig::default());
        session.adopt_slices(vec![slice(1, 0)]).unwrap();
        session.clear().unwrap();
        assert_eq!(session.slice_count(), 0);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn generate_rejected_while_generating() {
        let model = Arc::new(CountingModel {
            calls: AtomicUsize::new(0),
        });
        let config = GenerationConfig::builder()
            .code_model(Arc::clone(&model) as Arc<dyn CodeModel>)
            .build()
            .unwrap();
        let mut session = GenerationSession::new(config);
        session.adopt_slices(vec![slice(1, 0)]).unwrap();
        session.status = SessionStatus::Generating;

        let err = session.generate().await.unwrap_err();
        assert!(matches!(err, Design2CodeError::GenerationInProgress));

        // The rejected call must leave the in-flight state exactly as it was
        // and never reach the model.
        assert_eq!(session.status(), SessionStatus::Generating);
        assert!(session.result().is_none());
        assert!(session.error_message().is_none());
        assert_eq!(session.slice_count(), 1);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn guards_reject_while_generating() {
        let mut session = GenerationSession::new(GenerationConfig::default());
        session.adopt_slices(vec![slice(1, 0)]).unwrap();
        session.status = SessionStatus::Generating;

        assert!(matches!(
            session.adopt_slices(vec![slice(2, 0)]),
            Err(Design2CodeError::GenerationInProgress)
        ));
        assert!(matches!(
            session.clear(),
            Err(Design2CodeError::GenerationInProgress)
        ));
        // Slice list untouched by the rejected transitions.
        assert_eq!(session.slice_count(), 1);
        assert_eq!(session.slices()[0].page_number, 1);
    }

    #[test]
    fn set_format_is_always_valid() {
        let mut session = GenerationSession::new(GenerationConfig::default());
        session.status = SessionStatus::Generating;
        session.set_output_format(OutputFormat::Bootstrap);
        assert_eq!(session.output_format(), OutputFormat::Bootstrap);
    }
}
