//! Configuration types for design-to-code generation.
//!
//! All behaviour is controlled through [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs, log them, and diff two runs to understand why
//! their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::error::Design2CodeError;
use crate::model::CodeModel;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Target output format for the generated code.
///
/// Exactly two formats are supported, each with its own code-shape contract
/// (see [`crate::prompts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A single self-contained React functional component using Tailwind
    /// utility classes, default-exported. (default)
    #[default]
    React,
    /// A single self-contained HTML file using the Bootstrap 5.3 CDN and
    /// Bootstrap utility classes/components.
    Bootstrap,
}

impl OutputFormat {
    /// Human-readable label used in prompts and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::React => "React + Tailwind",
            OutputFormat::Bootstrap => "HTML + Bootstrap",
        }
    }

    /// Conventional file name for the generated artifact.
    pub fn suggested_file_name(&self) -> &'static str {
        match self {
            OutputFormat::React => "App.tsx",
            OutputFormat::Bootstrap => "index.html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::React => write!(f, "react"),
            OutputFormat::Bootstrap => write!(f, "bootstrap"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Design2CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "react" | "tsx" => Ok(OutputFormat::React),
            "bootstrap" | "html" => Ok(OutputFormat::Bootstrap),
            other => Err(Design2CodeError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected 'react' or 'bootstrap')"
            ))),
        }
    }
}

/// Configuration for a design-to-code run.
///
/// Built via [`GenerationConfig::builder()`] or [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use design2code::{GenerationConfig, OutputFormat};
///
/// let config = GenerationConfig::builder()
///     .scale(2.0)
///     .max_chunk_height(2500)
///     .format(OutputFormat::Bootstrap)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Rendering scale factor applied to each page. Must be > 0. Default: 2.0.
    ///
    /// 2.0 is the calibrated default: it gives the vision model enough pixel
    /// detail to read small UI text and icons without producing excessively
    /// large payloads. Raise it for dense dashboards, lower it for posters.
    pub scale: f32,

    /// Maximum vertical pixels per emitted slice. Default: 2500.
    ///
    /// Long-scrolling design exports routinely render taller than the maximum
    /// surface size many raster backends tolerate. Pages taller than this are
    /// split into consecutive vertical bands of exactly this height (plus a
    /// shorter remainder), so no single surface ever exceeds the cap.
    pub max_chunk_height: u32,

    /// Slack added to `max_chunk_height` before a page is considered
    /// oversized. Default: 100.
    ///
    /// Without it a page a handful of pixels over the limit would be split
    /// into a full chunk plus a near-empty sliver that only confuses the
    /// model's layout reconstruction.
    pub chunk_tolerance: u32,

    /// JPEG quality for encoded slices, 1–100. Default: 85.
    ///
    /// The trade-off: 85 keeps per-slice payloads small enough for the
    /// model's prompt-size limits while preserving readable text and UI
    /// detail. Lossless PNG would triple the payload for no accuracy gain at
    /// scale 2.0.
    pub jpeg_quality: u8,

    /// Target output format. Default: [`OutputFormat::React`].
    pub format: OutputFormat,

    /// Vision model identifier, e.g. "gpt-4.1-nano", "gemini-2.0-flash".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// Provider name (e.g. "openai", "gemini"). If None, auto-detected from
    /// the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-built code model. Takes precedence over everything else; used by
    /// tests to inject a fake model without touching the network.
    pub code_model: Option<Arc<dyn CodeModel>>,

    /// Sampling temperature for the completion. Default: 0.1.
    ///
    /// Near-zero keeps the model faithful to what it sees on the page —
    /// exactly what you want for pixel-accurate transcription.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 65 536.
    ///
    /// A full-page design regularly produces thousands of lines of markup;
    /// a low cap silently truncates the component mid-element.
    pub max_tokens: usize,

    /// Custom system instruction. If None, uses the built-in protocol prompt.
    pub system_prompt: Option<String>,

    /// Progress callback invoked as pages are rasterised.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            max_chunk_height: 2500,
            chunk_tolerance: 100,
            jpeg_quality: 85,
            format: OutputFormat::default(),
            model: None,
            provider_name: None,
            provider: None,
            code_model: None,
            temperature: 0.1,
            max_tokens: 65_536,
            system_prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("scale", &self.scale)
            .field("max_chunk_height", &self.max_chunk_height)
            .field("chunk_tolerance", &self.chunk_tolerance)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("format", &self.format)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("code_model", &self.code_model.as_ref().map(|_| "<dyn CodeModel>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn max_chunk_height(mut self, px: u32) -> Self {
        self.config.max_chunk_height = px.max(100);
        self
    }

    pub fn chunk_tolerance(mut self, px: u32) -> Self {
        self.config.chunk_tolerance = px;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn code_model(mut self, model: Arc<dyn CodeModel>) -> Self {
        self.config.code_model = Some(model);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, Design2CodeError> {
        let c = &self.config;
        if !(c.scale > 0.0) || !c.scale.is_finite() {
            return Err(Design2CodeError::InvalidConfig(format!(
                "Scale must be a positive number, got {}",
                c.scale
            )));
        }
        if c.max_chunk_height < 100 {
            return Err(Design2CodeError::InvalidConfig(format!(
                "max_chunk_height must be ≥ 100 px, got {}",
                c.max_chunk_height
            )));
        }
        Ok(self.config)
    }
}
