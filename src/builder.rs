use crate::config::PantryConfig;
use crate::error::PantryError;
use crate::pipeline::Processor;
use crate::providers::FallbackProvider;

/// Builder for configuring a [`Processor`].
///
/// Starts from the loaded configuration (file + `PANTRY__` environment
/// variables) and lets callers override the per-role providers and run
/// behavior without touching ambient state.
///
/// # Example
/// ```no_run
/// use pantry_pilot::ProcessorBuilder;
///
/// # fn main() -> Result<(), pantry_pilot::PantryError> {
/// let processor = ProcessorBuilder::new()
///     .vision_provider("azure_openai")
///     .recipe_provider("google")
///     .recipe_count(5)
///     .dedupe_items(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ProcessorBuilder {
    config: Option<PantryConfig>,
    vision_provider: Option<String>,
    recipe_provider: Option<String>,
    recipe_count: Option<u32>,
    dedupe_items: Option<bool>,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration instead of loading it from the
    /// environment
    pub fn config(mut self, config: PantryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Provider name for image → pantry-item extraction
    pub fn vision_provider(mut self, name: impl Into<String>) -> Self {
        self.vision_provider = Some(name.into());
        self
    }

    /// Provider name for recipe generation
    pub fn recipe_provider(mut self, name: impl Into<String>) -> Self {
        self.recipe_provider = Some(name.into());
        self
    }

    /// Number of recipes to request per run
    pub fn recipe_count(mut self, count: u32) -> Self {
        self.recipe_count = Some(count);
        self
    }

    /// Whether to deduplicate pantry items across images
    pub fn dedupe_items(mut self, dedupe: bool) -> Self {
        self.dedupe_items = Some(dedupe);
        self
    }

    /// Resolve providers and build the processor
    pub fn build(self) -> Result<Processor, PantryError> {
        let config = match self.config {
            Some(config) => config,
            None => PantryConfig::load()?,
        };

        let vision_name = self
            .vision_provider
            .as_deref()
            .unwrap_or_else(|| config.vision_provider_name())
            .to_string();
        let recipe_name = self
            .recipe_provider
            .as_deref()
            .unwrap_or_else(|| config.recipe_provider_name())
            .to_string();

        let vision = FallbackProvider::for_provider(&config, &vision_name)?;
        let chef = FallbackProvider::for_provider(&config, &recipe_name)?;

        Ok(Processor::new(
            Box::new(vision),
            Box::new(chef),
            self.recipe_count.unwrap_or(config.processing.recipe_count),
            self.dedupe_items.unwrap_or(config.processing.dedupe_items),
        ))
    }
}
