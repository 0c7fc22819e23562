mod azure_openai;
mod factory;
mod fallback;
mod google;
mod hugging_face;
mod open_ai;
mod prompt;

pub use azure_openai::AzureOpenAIProvider;
pub use factory::ProviderFactory;
pub use fallback::FallbackProvider;
pub use google::GoogleProvider;
pub use hugging_face::HuggingFaceProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_recipe_prompts, build_single_recipe_prompt, PANTRY_VISION_PROMPT};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::PantryError;

/// One request to an AI provider: a text prompt, optionally accompanied by
/// a base64-encoded image for vision-capable models.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub image_base64: Option<String>,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        CompletionRequest {
            prompt: prompt.into(),
            image_base64: None,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image_base64: impl Into<String>) -> Self {
        CompletionRequest {
            prompt: prompt.into(),
            image_base64: Some(image_base64.into()),
        }
    }
}

/// Unified trait for all AI providers.
///
/// Each implementation owns its wire format and maps the provider-specific
/// response nesting onto plain completion text, so nothing downstream ever
/// branches on provider identity.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name (e.g. "openai", "google")
    fn provider_name(&self) -> &str;

    /// Run one completion and return the raw text the model produced
    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, PantryError>;
}
