use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::error::PantryError;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::retry::{retry_fetch, RetryPolicy};

/// Hugging Face inference API provider.
///
/// Caption models take the image as `inputs` and ignore the prompt; text
/// models take the prompt. Either way the answer arrives as
/// `[{"generated_text": ...}]` (some models return a bare object instead,
/// both shapes are accepted).
pub struct HuggingFaceProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl HuggingFaceProvider {
    /// Create a new Hugging Face provider from configuration
    pub fn new(config: &ProviderConfig, retry: RetryPolicy) -> Result<Self, PantryError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("HF_API_TOKEN").ok())
            .ok_or_else(|| {
                PantryError::ProviderConfig(
                    "HF_API_TOKEN not found in config or environment".into(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api-inference.huggingface.co".to_string());

        Ok(HuggingFaceProvider {
            client: Client::new(),
            api_key,
            base_url,
            model: config.model.clone(),
            retry,
        })
    }
}

#[async_trait]
impl CompletionProvider for HuggingFaceProvider {
    fn provider_name(&self) -> &str {
        "hugging_face"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, PantryError> {
        let url = format!(
            "{}/models/{}",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let inputs = request
            .image_base64
            .as_deref()
            .unwrap_or(&request.prompt);

        let builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({ "inputs": inputs }));

        let response = retry_fetch(builder, &self.retry, cancel).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text = response_body[0]["generated_text"]
            .as_str()
            .or_else(|| response_body["generated_text"].as_str())
            .ok_or(PantryError::ResponseShape {
                provider: "hugging_face",
            })?
            .to_string();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn hf_config(base_url: String) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "blip-image-captioning".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            api_key: Some("hf-token".to_string()),
            base_url: Some(base_url),
            endpoint: None,
            deployment_name: None,
            api_version: None,
        }
    }

    #[tokio::test]
    async fn test_complete_array_shape() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/blip-image-captioning")
            .match_header("authorization", "Bearer hf-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"generated_text":"a shelf with canned beans and pasta"}]"#)
            .create_async()
            .await;

        let provider =
            HuggingFaceProvider::new(&hf_config(server.url()), RetryPolicy::default()).unwrap();
        let request = CompletionRequest::with_image("caption this", "aGVsbG8=");
        let result = provider
            .complete(&request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result, "a shelf with canned beans and pasta");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_object_shape() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/blip-image-captioning")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"generated_text":"rice and spices"}"#)
            .create_async()
            .await;

        let provider =
            HuggingFaceProvider::new(&hf_config(server.url()), RetryPolicy::default()).unwrap();
        let request = CompletionRequest::text("caption this");
        let result = provider
            .complete(&request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result, "rice and spices");
    }

    #[tokio::test]
    async fn test_provider_name() {
        let provider =
            HuggingFaceProvider::new(&hf_config("http://localhost".into()), RetryPolicy::default())
                .unwrap();
        assert_eq!(provider.provider_name(), "hugging_face");
    }
}
