use thiserror::Error;

/// Errors that can occur while talking to upstream AI services or driving a
/// processing run.
#[derive(Error, Debug)]
pub enum PantryError {
    /// Transport-level failure from the HTTP client
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-success status that is not retryable, or
    /// retries were exhausted. Carries the last observed status and body.
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// A single call exceeded the configured per-request timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The caller abandoned the run; remaining retry budget is not consumed
    #[error("Processing run was cancelled")]
    Cancelled,

    /// The provider response did not contain extractable text
    #[error("Provider '{provider}' returned an unexpected response shape")]
    ResponseShape { provider: &'static str },

    /// Every provider in a fallback chain failed terminally
    #[error("All providers failed:\n{0}")]
    AllProvidersFailed(String),

    /// No pantry items were detected across all captured images
    #[error("No pantry items detected in the images")]
    NoItemsDetected,

    /// Every recipe generation attempt produced unparseable output
    #[error("No valid recipes could be generated from the pantry items")]
    NoValidRecipes,

    /// Missing API key or endpoint for a configured provider
    #[error("Provider configuration error: {0}")]
    ProviderConfig(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Failed to read an image from disk
    #[error("Failed to read image: {0}")]
    ImageRead(#[from] std::io::Error),
}
