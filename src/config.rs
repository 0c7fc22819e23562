use std::collections::HashMap;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::retry::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct PantryConfig {
    /// Provider used when a role-specific one is not configured
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Provider for image → pantry-item extraction (falls back to default)
    #[serde(default)]
    pub vision_provider: Option<String>,
    /// Provider for recipe generation (falls back to default)
    #[serde(default)]
    pub recipe_provider: Option<String>,
    /// Map of provider name to provider configuration
    pub providers: HashMap<String, ProviderConfig>,
    /// Fallback configuration for automatic provider switching
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Retry behavior for upstream calls
    #[serde(default)]
    pub retry: RetryConfig,
    /// Processing-run behavior
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g. "gpt-4o", "gemini-2.5-flash")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // Optional provider-specific fields
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Resource endpoint (Azure OpenAI specific)
    pub endpoint: Option<String>,
    /// Deployment name (Azure OpenAI specific)
    pub deployment_name: Option<String>,
    /// API version (Azure OpenAI specific)
    pub api_version: Option<String>,
}

/// Configuration for provider fallback chains
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Whether fallback is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Order of providers to try (first to last)
    #[serde(default)]
    pub order: Vec<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            order: Vec::new(),
        }
    }
}

/// Retry behavior for individual upstream HTTP calls
#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay between retries in milliseconds (linear backoff)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Per-call timeout in seconds, distinct from the backoff schedule
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Behavior of one processing run
#[derive(Debug, Deserialize, Clone)]
pub struct ProcessingConfig {
    /// Number of recipes to request per run (one prompt each)
    #[serde(default = "default_recipe_count")]
    pub recipe_count: u32,
    /// Whether to deduplicate pantry items across images. Off by default so
    /// multiplicity is preserved as a quantity hint for the recipe prompts.
    #[serde(default)]
    pub dedupe_items: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            recipe_count: default_recipe_count(),
            dedupe_items: false,
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    800
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_recipe_count() -> u32 {
    3
}

impl PantryConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PANTRY__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: PANTRY__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: PANTRY__PROVIDERS__OPENAI__API_KEY
            .add_source(
                Environment::with_prefix("PANTRY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Resolved provider name for the vision role
    pub fn vision_provider_name(&self) -> &str {
        self.vision_provider.as_deref().unwrap_or(&self.default_provider)
    }

    /// Resolved provider name for the recipe-generation role
    pub fn recipe_provider_name(&self) -> &str {
        self.recipe_provider.as_deref().unwrap_or(&self.default_provider)
    }
}
