use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::error::PantryError;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::retry::{retry_fetch, RetryPolicy};

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig, retry: RetryPolicy) -> Result<Self, PantryError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                PantryError::ProviderConfig(
                    "GOOGLE_API_KEY not found in config or environment".into(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());

        Ok(GoogleProvider {
            client: Client::new(),
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry,
        })
    }

    fn parts(request: &CompletionRequest) -> Value {
        match &request.image_base64 {
            Some(image) => json!([
                {"text": request.prompt},
                {"inline_data": {"mime_type": "image/jpeg", "data": image}}
            ]),
            None => json!([{"text": request.prompt}]),
        }
    }
}

#[async_trait]
impl CompletionProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, PantryError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        );

        let builder = self.client.post(&url).json(&json!({
            "contents": [{"parts": Self::parts(request)}],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens
            }
        }));

        let response = retry_fetch(builder, &self.retry, cancel).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text = response_body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(PantryError::ResponseShape { provider: "google" })?
            .to_string();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn google_config(base_url: Option<String>) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            api_key: Some("test-key".to_string()),
            base_url,
            endpoint: None,
            deployment_name: None,
            api_version: None,
        }
    }

    #[tokio::test]
    async fn test_complete_unwraps_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-2.5-flash:generateContent?key=test-key",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"```json\n{\"title\":\"Dal\"}\n```"}]}}]}"#,
            )
            .create_async()
            .await;

        let provider =
            GoogleProvider::new(&google_config(Some(server.url())), RetryPolicy::default())
                .unwrap();
        let request = CompletionRequest::text("one recipe please");
        let result = provider
            .complete(&request, &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.contains("Dal"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_name() {
        let provider =
            GoogleProvider::new(&google_config(None), RetryPolicy::default()).unwrap();
        assert_eq!(provider.provider_name(), "google");
    }
}
