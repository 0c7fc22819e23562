use crate::config::{PantryConfig, ProviderConfig};
use crate::error::PantryError;
use crate::providers::{
    AzureOpenAIProvider, CompletionProvider, GoogleProvider, HuggingFaceProvider, OpenAIProvider,
};
use crate::retry::RetryPolicy;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        retry: RetryPolicy,
    ) -> Result<Box<dyn CompletionProvider>, PantryError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(PantryError::ProviderConfig(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config, retry)?)),
            "azure_openai" => Ok(Box::new(AzureOpenAIProvider::new(config, retry)?)),
            "google" => Ok(Box::new(GoogleProvider::new(config, retry)?)),
            "hugging_face" => Ok(Box::new(HuggingFaceProvider::new(config, retry)?)),
            _ => Err(PantryError::ProviderConfig(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Create the provider registered under `name` in the configuration
    pub fn create_named(
        config: &PantryConfig,
        name: &str,
    ) -> Result<Box<dyn CompletionProvider>, PantryError> {
        let provider_config = config.providers.get(name).ok_or_else(|| {
            PantryError::ProviderConfig(format!("Provider '{}' not found in configuration", name))
        })?;

        Self::create(name, provider_config, config.retry.policy())
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "azure_openai", "google", "hugging_face"]
    }
}
