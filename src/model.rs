//! Vision-model access: the [`CodeModel`] port and its edgequake-llm adapter.
//!
//! The generation call is treated as an opaque remote function: ordered
//! images plus one structured instruction in, one plain-text response out.
//! Putting that behind a narrow trait keeps the session testable with a fake
//! model and keeps all provider wiring in one place.
//!
//! There are deliberately **no retries** here: a failed call surfaces to the
//! session, which asks the user to retry explicitly.

use crate::config::GenerationConfig;
use crate::error::Design2CodeError;
use crate::pipeline::rasterize::Slice;
use crate::prompts;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// One generation request: the full, final slice list plus the instruction.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// System instruction (protocol + format contract).
    pub system: String,
    /// User prompt accompanying the images.
    pub prompt: String,
    /// Ordered slice images, document order.
    pub images: Vec<ImageData>,
}

impl ModelRequest {
    /// Assemble a request from the session's slice list and config.
    pub fn from_slices(slices: &[Slice], config: &GenerationConfig) -> Self {
        let system = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| prompts::system_instruction(config.format));
        let prompt = prompts::user_prompt(config.format, slices.len());
        let images = slices
            .iter()
            .map(|s| ImageData::new(s.image.clone(), "image/jpeg").with_detail("high"))
            .collect();
        Self {
            system,
            prompt,
            images,
        }
    }
}

/// The opaque code-generation capability.
///
/// Exactly one call per `generate()`; implementations must not retry
/// internally.
#[async_trait]
pub trait CodeModel: Send + Sync {
    /// Issue one generation request and return the raw response text.
    async fn generate_code(&self, request: &ModelRequest) -> Result<String, Design2CodeError>;
}

/// [`CodeModel`] backed by an edgequake-llm provider.
pub struct ProviderCodeModel {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl ProviderCodeModel {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl CodeModel for ProviderCodeModel {
    async fn generate_code(&self, request: &ModelRequest) -> Result<String, Design2CodeError> {
        let messages = vec![
            ChatMessage::system(&request.system),
            ChatMessage::user_with_images(&request.prompt, request.images.clone()),
        ];

        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| Design2CodeError::GenerationFailed {
                detail: format!("{e}"),
            })?;

        debug!(
            "Model response: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        if response.content.trim().is_empty() {
            return Err(Design2CodeError::GenerationFailed {
                detail: "Model returned an empty response".into(),
            });
        }

        Ok(response.content)
    }
}

/// Resolve the code model, from most-specific to least-specific.
///
/// The fallback chain lets library users, tests, and CLI users each set
/// exactly as much as they need:
///
/// 1. **Pre-built model** (`config.code_model`) — used as-is; this is the
///    test seam.
/// 2. **Pre-built provider** (`config.provider`) — the caller constructed
///    and configured the provider entirely.
/// 3. **Named provider + model** (`config.provider_name`) — the factory
///    reads the matching API key (`OPENAI_API_KEY`, `GEMINI_API_KEY`, …)
///    from the environment.
/// 4. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 5. **Full auto-detection** (`ProviderFactory::from_env`) — scans all
///    known API key variables and picks the first available provider.
///
/// Missing credentials surface here as
/// [`Design2CodeError::ProviderNotConfigured`] — before any network call is
/// issued.
pub fn resolve_model(config: &GenerationConfig) -> Result<Arc<dyn CodeModel>, Design2CodeError> {
    if let Some(ref model) = config.code_model {
        return Ok(Arc::clone(model));
    }

    if let Some(ref provider) = config.provider {
        return Ok(Arc::new(ProviderCodeModel::new(
            Arc::clone(provider),
            config.temperature,
            config.max_tokens,
        )));
    }

    if let Some(ref name) = config.provider_name {
        let model_id = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        let provider = create_vision_provider(name, model_id)?;
        return Ok(Arc::new(ProviderCodeModel::new(
            provider,
            config.temperature,
            config.max_tokens,
        )));
    }

    if let (Ok(prov), Ok(model_id)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model_id.is_empty() {
            let provider = create_vision_provider(&prov, &model_id)?;
            return Ok(Arc::new(ProviderCodeModel::new(
                provider,
                config.temperature,
                config.max_tokens,
            )));
        }
    }

    // Prefer OpenAI explicitly when an OpenAI API key is present, so users
    // with multiple provider keys get a deterministic default.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model_id = config.model.as_deref().unwrap_or("gpt-4.1-nano");
            let provider = create_vision_provider("openai", model_id)?;
            return Ok(Arc::new(ProviderCodeModel::new(
                provider,
                config.temperature,
                config.max_tokens,
            )));
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Design2CodeError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No vision provider could be auto-detected from the environment.\n\
                 Set OPENAI_API_KEY, GEMINI_API_KEY, or ANTHROPIC_API_KEY.\n\
                 Error: {e}"
            ),
        })?;

    Ok(Arc::new(ProviderCodeModel::new(
        provider,
        config.temperature,
        config.max_tokens,
    )))
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Design2CodeError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Design2CodeError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
