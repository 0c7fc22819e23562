use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::error::PantryError;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::retry::{retry_fetch, RetryPolicy};

pub struct AzureOpenAIProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    deployment_name: String,
    api_version: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl AzureOpenAIProvider {
    /// Create a new Azure OpenAI provider from configuration
    pub fn new(config: &ProviderConfig, retry: RetryPolicy) -> Result<Self, PantryError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("AZURE_OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                PantryError::ProviderConfig(
                    "AZURE_OPENAI_API_KEY not found in config or environment".into(),
                )
            })?;

        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| PantryError::ProviderConfig("Azure OpenAI endpoint is required".into()))?;

        let deployment_name = config.deployment_name.clone().ok_or_else(|| {
            PantryError::ProviderConfig("Azure OpenAI deployment_name is required".into())
        })?;

        let api_version = config
            .api_version
            .clone()
            .unwrap_or_else(|| "2024-02-15-preview".to_string());

        Ok(AzureOpenAIProvider {
            client: Client::new(),
            api_key,
            endpoint,
            deployment_name,
            api_version,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry,
        })
    }
}

#[async_trait]
impl CompletionProvider for AzureOpenAIProvider {
    fn provider_name(&self) -> &str {
        "azure_openai"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, PantryError> {
        // Azure OpenAI URL format:
        // https://{endpoint}/openai/deployments/{deployment-name}/chat/completions?api-version={api-version}
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment_name,
            self.api_version
        );

        let content = match &request.image_base64 {
            Some(image) => json!([
                {"type": "text", "text": request.prompt},
                {"type": "image_url", "image_url": {"url": format!("data:image/jpeg;base64,{}", image)}}
            ]),
            None => json!([{"type": "text", "text": request.prompt}]),
        };

        let builder = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&json!({
                "messages": [{"role": "user", "content": content}],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }));

        let response = retry_fetch(builder, &self.retry, cancel).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(PantryError::ResponseShape {
                provider: "azure_openai",
            })?
            .to_string();

        Ok(text)
    }
}
