use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::error::PantryError;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::retry::{retry_fetch, RetryPolicy};

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig, retry: RetryPolicy) -> Result<Self, PantryError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                PantryError::ProviderConfig(
                    "OPENAI_API_KEY not found in config or environment".into(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        Ok(OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 800,
            retry: RetryPolicy::default(),
        }
    }

    fn user_content(request: &CompletionRequest) -> Value {
        match &request.image_base64 {
            Some(image) => json!([
                {"type": "text", "text": request.prompt},
                {"type": "image_url", "image_url": {"url": format!("data:image/jpeg;base64,{}", image)}}
            ]),
            None => json!(request.prompt),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, PantryError> {
        let builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": Self::user_content(request)}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }));

        let response = retry_fetch(builder, &self.retry, cancel).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(PantryError::ResponseShape { provider: "openai" })?
            .to_string();

        Ok(text)
    }
}
