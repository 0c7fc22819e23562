//! Pantry-to-recipe assistant.
//!
//! Photos of pantry contents go to a vision-capable model that names the
//! items; the item list feeds one recipe-generation prompt per desired
//! recipe; and the free-form model output is tolerantly parsed into a
//! canonical [`Recipe`] shape. Upstream gateway hiccups are retried with
//! backoff, unparseable generations are isolated per prompt, and a run
//! always terminates in either a result or a single descriptive error.

pub mod builder;
pub mod config;
pub mod error;
pub mod items;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod providers;
pub mod retry;

pub use builder::ProcessorBuilder;
pub use config::PantryConfig;
pub use error::PantryError;
pub use model::{ProcessingResult, Recipe};
pub use parse::{parse_recipe_input, parse_recipe_value};
pub use pipeline::{ImageSource, Processor};
pub use retry::RetryPolicy;

use tokio_util::sync::CancellationToken;

/// Process images with configuration loaded from the environment.
///
/// Convenience wrapper over [`ProcessorBuilder`] for callers that do not
/// need progress reporting or cancellation.
pub async fn process_images(images: &[ImageSource]) -> Result<ProcessingResult, PantryError> {
    let processor = ProcessorBuilder::new().build()?;
    Ok(processor
        .process_images(images, |_| {}, &CancellationToken::new())
        .await)
}
