//! The processing run: images in, pantry items and recipes out.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::PantryError;
use crate::items::{dedupe_items, items_from_response};
use crate::model::{ProcessingResult, Recipe};
use crate::parse::parse_recipe_input;
use crate::providers::{
    build_recipe_prompts, CompletionProvider, CompletionRequest, PANTRY_VISION_PROMPT,
};

/// An input image for a processing run
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file on disk, read and encoded lazily
    Path(String),
    /// Already base64-encoded image data
    Base64(String),
}

impl ImageSource {
    async fn to_base64(&self) -> Result<String, PantryError> {
        match self {
            ImageSource::Base64(data) => Ok(data.clone()),
            ImageSource::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(BASE64.encode(bytes))
            }
        }
    }
}

/// Phases of one run, reported via log output as the run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ExtractingItems,
    GeneratingRecipes,
    Done,
    Failed,
}

/// Drives one user-initiated run: per-image item extraction, prompt
/// construction, per-prompt recipe generation, aggregation.
///
/// A run is a sequential chain of awaited calls; nothing here is shared
/// between concurrent runs, and re-entry is the caller's concern. Parse
/// failures are isolated per prompt and surface as data; upstream failures
/// terminate the run with `error` set and empty collections.
pub struct Processor {
    vision: Box<dyn CompletionProvider>,
    chef: Box<dyn CompletionProvider>,
    recipe_count: u32,
    dedupe_items: bool,
}

impl Processor {
    pub fn new(
        vision: Box<dyn CompletionProvider>,
        chef: Box<dyn CompletionProvider>,
        recipe_count: u32,
        dedupe_items: bool,
    ) -> Self {
        Processor {
            vision,
            chef,
            recipe_count,
            dedupe_items,
        }
    }

    /// Run the full pipeline over the captured images.
    ///
    /// `progress` receives a monotonically increasing completion percentage:
    /// item extraction advances it to 40, recipe generation to 95, and the
    /// terminal state (done or failed) pushes it to 100. `cancel` abandons
    /// the run between and during upstream calls without consuming the
    /// remaining retry budget.
    pub async fn process_images(
        &self,
        images: &[ImageSource],
        mut progress: impl FnMut(u8),
        cancel: &CancellationToken,
    ) -> ProcessingResult {
        let mut last_reported = 0u8;
        let mut report = |pct: u8| {
            if pct > last_reported {
                last_reported = pct;
            }
            last_reported
        };

        let outcome = self
            .run(images, &mut |pct| progress(report(pct)), cancel)
            .await;

        progress(report(100));
        match outcome {
            Ok(result) => {
                info!("run reached {:?}", Phase::Done);
                result
            }
            Err(e) => {
                warn!("run reached {:?}: {}", Phase::Failed, e);
                ProcessingResult::failed(e.to_string())
            }
        }
    }

    async fn run(
        &self,
        images: &[ImageSource],
        progress: &mut dyn FnMut(u8),
        cancel: &CancellationToken,
    ) -> Result<ProcessingResult, PantryError> {
        if images.is_empty() {
            return Err(PantryError::NoItemsDetected);
        }
        progress(5);

        info!("entering {:?} for {} image(s)", Phase::ExtractingItems, images.len());
        let pantry_items = self.extract_items(images, progress, cancel).await?;
        if pantry_items.is_empty() {
            return Err(PantryError::NoItemsDetected);
        }
        info!("detected {} pantry item(s)", pantry_items.len());
        progress(40);

        info!("entering {:?}", Phase::GeneratingRecipes);
        let recipes = self.generate_recipes(&pantry_items, progress, cancel).await?;
        if recipes.is_empty() {
            return Err(PantryError::NoValidRecipes);
        }
        progress(95);

        Ok(ProcessingResult {
            pantry_items,
            recipes,
            error: None,
        })
    }

    async fn extract_items(
        &self,
        images: &[ImageSource],
        progress: &mut dyn FnMut(u8),
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PantryError> {
        let mut items = Vec::new();
        let total = images.len() as u32;

        for (index, image) in images.iter().enumerate() {
            let encoded = image.to_base64().await?;
            let request = CompletionRequest::with_image(PANTRY_VISION_PROMPT, encoded);
            let response = self.vision.complete(&request, cancel).await?;
            debug!("vision response for image {}: {}", index, response);

            items.extend(items_from_response(&response));
            progress(5 + (35 * (index as u32 + 1) / total) as u8);
        }

        if self.dedupe_items {
            items = dedupe_items(items);
        }
        Ok(items)
    }

    async fn generate_recipes(
        &self,
        items: &[String],
        progress: &mut dyn FnMut(u8),
        cancel: &CancellationToken,
    ) -> Result<Vec<Recipe>, PantryError> {
        let prompts = build_recipe_prompts(items, self.recipe_count);
        let total = prompts.len() as u32;
        let mut recipes = Vec::new();

        for (index, prompt) in prompts.iter().enumerate() {
            let request = CompletionRequest::text(prompt.clone());
            let response = self.chef.complete(&request, cancel).await?;

            // A bad generation only costs this one slot.
            match parse_recipe_input(&response) {
                Some(recipe) if !recipe.parse_error => recipes.push(recipe),
                Some(recipe) => {
                    warn!(
                        "recipe {} of {} did not parse: {}",
                        index + 1,
                        total,
                        recipe.steps.first().map(String::as_str).unwrap_or("")
                    );
                }
                None => warn!("recipe {} of {} came back empty", index + 1, total),
            }
            progress(40 + (55 * (index as u32 + 1) / total) as u8);
        }

        Ok(recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedProvider {
        responses: Vec<Result<String, u16>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<String, u16>>) -> (Box<dyn CompletionProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(ScriptedProvider {
                    responses,
                    calls: calls.clone(),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
            _cancel: &CancellationToken,
        ) -> Result<String, PantryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(call % self.responses.len()).unwrap() {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(PantryError::Upstream {
                    status: *status,
                    body: "scripted failure".into(),
                }),
            }
        }
    }

    fn image() -> ImageSource {
        ImageSource::Base64("aGVsbG8=".to_string())
    }

    fn recipe_json(title: &str) -> String {
        format!(
            r#"{{"title":"{}","ingredients":["rice"],"instructions":["cook"]}}"#,
            title
        )
    }

    #[tokio::test]
    async fn test_happy_path() {
        let (vision, _) = ScriptedProvider::new(vec![Ok(r#"["rice","egg"]"#.to_string())]);
        let (chef, chef_calls) = ScriptedProvider::new(vec![
            Ok(recipe_json("A")),
            Ok(recipe_json("B")),
            Ok(recipe_json("C")),
        ]);

        let processor = Processor::new(vision, chef, 3, false);
        let mut seen = Vec::new();
        let result = processor
            .process_images(&[image()], |p| seen.push(p), &CancellationToken::new())
            .await;

        assert!(result.error.is_none());
        assert_eq!(result.pantry_items, vec!["rice", "egg"]);
        assert_eq!(
            result.recipes.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        assert_eq!(chef_calls.load(Ordering::SeqCst), 3);

        // Monotonic and terminal at 100.
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_no_items_detected_fails_before_recipes() {
        let (vision, _) = ScriptedProvider::new(vec![Ok("none".to_string())]);
        let (chef, chef_calls) = ScriptedProvider::new(vec![Ok(recipe_json("A"))]);

        let processor = Processor::new(vision, chef, 3, false);
        let result = processor
            .process_images(&[image()], |_| {}, &CancellationToken::new())
            .await;

        assert_eq!(
            result.error.as_deref(),
            Some("No pantry items detected in the images")
        );
        assert!(result.pantry_items.is_empty());
        assert!(result.recipes.is_empty());
        assert_eq!(chef_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_images_fails() {
        let (vision, vision_calls) = ScriptedProvider::new(vec![Ok("[]".to_string())]);
        let (chef, _) = ScriptedProvider::new(vec![Ok(recipe_json("A"))]);

        let processor = Processor::new(vision, chef, 3, false);
        let result = processor
            .process_images(&[], |_| {}, &CancellationToken::new())
            .await;

        assert!(result.error.is_some());
        assert_eq!(vision_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parse_failures_are_isolated_per_prompt() {
        let (vision, _) = ScriptedProvider::new(vec![Ok(r#"["rice"]"#.to_string())]);
        let (chef, _) = ScriptedProvider::new(vec![
            Ok("I refuse to answer in JSON".to_string()),
            Ok(recipe_json("Survivor")),
            Ok("still not json".to_string()),
        ]);

        let processor = Processor::new(vision, chef, 3, false);
        let result = processor
            .process_images(&[image()], |_| {}, &CancellationToken::new())
            .await;

        assert!(result.error.is_none());
        assert_eq!(result.recipes.len(), 1);
        assert_eq!(result.recipes[0].title, "Survivor");
    }

    #[tokio::test]
    async fn test_all_prompts_unparseable_fails() {
        let (vision, _) = ScriptedProvider::new(vec![Ok(r#"["rice"]"#.to_string())]);
        let (chef, _) = ScriptedProvider::new(vec![Ok("prose only".to_string())]);

        let processor = Processor::new(vision, chef, 2, false);
        let result = processor
            .process_images(&[image()], |_| {}, &CancellationToken::new())
            .await;

        assert_eq!(
            result.error.as_deref(),
            Some("No valid recipes could be generated from the pantry items")
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_terminates_run() {
        let (vision, _) = ScriptedProvider::new(vec![Err(500)]);
        let (chef, chef_calls) = ScriptedProvider::new(vec![Ok(recipe_json("A"))]);

        let processor = Processor::new(vision, chef, 3, false);
        let result = processor
            .process_images(&[image()], |_| {}, &CancellationToken::new())
            .await;

        assert_eq!(result.error.as_deref(), Some("Upstream error 500: scripted failure"));
        assert_eq!(chef_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_items_accumulate_across_images_without_dedupe() {
        let (vision, _) = ScriptedProvider::new(vec![Ok(r#"["rice","salt"]"#.to_string())]);
        let (chef, _) = ScriptedProvider::new(vec![Ok(recipe_json("A"))]);

        let processor = Processor::new(vision, chef, 1, false);
        let result = processor
            .process_images(&[image(), image()], |_| {}, &CancellationToken::new())
            .await;

        assert_eq!(result.pantry_items, vec!["rice", "salt", "rice", "salt"]);
    }

    #[tokio::test]
    async fn test_dedupe_when_configured() {
        let (vision, _) = ScriptedProvider::new(vec![Ok(r#"["rice","salt"]"#.to_string())]);
        let (chef, _) = ScriptedProvider::new(vec![Ok(recipe_json("A"))]);

        let processor = Processor::new(vision, chef, 1, true);
        let result = processor
            .process_images(&[image(), image()], |_| {}, &CancellationToken::new())
            .await;

        assert_eq!(result.pantry_items, vec!["rice", "salt"]);
    }
}
