use async_trait::async_trait;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::PantryConfig;
use crate::error::PantryError;
use crate::providers::{CompletionProvider, CompletionRequest, ProviderFactory};

/// Tries a chain of providers in configured order, returning the first text
/// any of them produces. Per-call retry already lives in the HTTP layer, so
/// the chain only advances when a provider fails terminally.
pub struct FallbackProvider {
    providers: Vec<Box<dyn CompletionProvider>>,
}

impl FallbackProvider {
    /// Build the chain for a role-specific provider name. With fallback
    /// disabled the chain is just that single provider.
    pub fn for_provider(config: &PantryConfig, name: &str) -> Result<Self, PantryError> {
        if !config.fallback.enabled {
            return Ok(FallbackProvider {
                providers: vec![ProviderFactory::create_named(config, name)?],
            });
        }

        let mut providers = Vec::new();
        for provider_name in &config.fallback.order {
            if let Some(provider_config) = config.providers.get(provider_name) {
                if provider_config.enabled {
                    match ProviderFactory::create(
                        provider_name,
                        provider_config,
                        config.retry.policy(),
                    ) {
                        Ok(provider) => {
                            info!("Added '{}' to fallback chain", provider_name);
                            providers.push(provider);
                        }
                        Err(e) => {
                            warn!("Failed to initialize provider '{}': {}", provider_name, e);
                        }
                    }
                }
            } else {
                warn!(
                    "Provider '{}' in fallback order not found in configuration",
                    provider_name
                );
            }
        }

        if providers.is_empty() {
            return Err(PantryError::ProviderConfig(
                "No providers available in fallback configuration".into(),
            ));
        }

        Ok(FallbackProvider { providers })
    }

    #[cfg(test)]
    fn from_providers(providers: Vec<Box<dyn CompletionProvider>>) -> Self {
        FallbackProvider { providers }
    }
}

#[async_trait]
impl CompletionProvider for FallbackProvider {
    fn provider_name(&self) -> &str {
        "fallback"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, PantryError> {
        let mut all_errors: Vec<String> = Vec::new();

        for provider in &self.providers {
            match provider.complete(request, cancel).await {
                Ok(text) => {
                    info!("Completion succeeded using {}", provider.provider_name());
                    return Ok(text);
                }
                // An abandoned run should not march on to the next provider.
                Err(PantryError::Cancelled) => return Err(PantryError::Cancelled),
                Err(e) => {
                    warn!("Provider {} failed: {}", provider.provider_name(), e);
                    all_errors.push(format!("{}: {}", provider.provider_name(), e));
                }
            }
        }

        Err(PantryError::AllProvidersFailed(all_errors.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        FallbackConfig, PantryConfig, ProcessingConfig, ProviderConfig, RetryConfig,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        name: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            self.name
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
            _cancel: &CancellationToken,
        ) -> Result<String, PantryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(PantryError::Upstream {
                    status: 500,
                    body: "boom".into(),
                })
            } else {
                Ok(format!("text from {}", self.name))
            }
        }
    }

    fn scripted(name: &'static str, fail: bool) -> Box<dyn CompletionProvider> {
        Box::new(ScriptedProvider {
            name,
            fail,
            calls: AtomicUsize::new(0),
        })
    }

    fn test_config(fallback_enabled: bool) -> PantryConfig {
        let mut providers = HashMap::new();
        providers.insert(
            "openai".to_string(),
            ProviderConfig {
                enabled: true,
                model: "gpt-4o".to_string(),
                temperature: 0.7,
                max_tokens: 800,
                api_key: Some("test-key".to_string()),
                base_url: None,
                endpoint: None,
                deployment_name: None,
                api_version: None,
            },
        );

        PantryConfig {
            default_provider: "openai".to_string(),
            vision_provider: None,
            recipe_provider: None,
            providers,
            fallback: FallbackConfig {
                enabled: fallback_enabled,
                order: vec!["openai".to_string()],
            },
            retry: RetryConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = FallbackProvider::from_providers(vec![
            scripted("first", true),
            scripted("second", false),
            scripted("third", false),
        ]);

        let result = chain
            .complete(&CompletionRequest::text("hi"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result, "text from second");
    }

    #[tokio::test]
    async fn test_all_failures_aggregate_errors() {
        let chain =
            FallbackProvider::from_providers(vec![scripted("first", true), scripted("second", true)]);

        let result = chain
            .complete(&CompletionRequest::text("hi"), &CancellationToken::new())
            .await;
        match result {
            Err(PantryError::AllProvidersFailed(msg)) => {
                assert!(msg.contains("first"));
                assert!(msg.contains("second"));
            }
            other => panic!("expected aggregate failure, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_fallback_disabled_uses_single_provider() {
        let chain = FallbackProvider::for_provider(&test_config(false), "openai").unwrap();
        assert_eq!(chain.providers.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_no_providers() {
        let mut config = test_config(true);
        config.providers.clear();

        let result = FallbackProvider::for_provider(&config, "openai");
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("No providers available"));
        }
    }
}
