//! Tolerant parsing of LLM recipe output.
//!
//! Models wrap their JSON in markdown fences, double-encode it as a quoted
//! string, escape quotes that should not be escaped, or bury it in prose.
//! The stages here turn that noise back into the canonical [`Recipe`] shape:
//! sanitize, then parse directly, then fall back to balanced-bracket
//! extraction, and finally give up with an explicit parse-error record that
//! keeps the raw text around for diagnostics.

mod extract;
mod normalize;
mod sanitize;

pub use extract::extract_top_level_json;
pub use normalize::normalize;
pub use sanitize::sanitize;

use log::debug;
use serde_json::Value;

use crate::model::Recipe;

/// Parse free-form model output into a single normalized recipe.
///
/// Returns `None` for empty input (nothing to normalize). Every other input
/// yields a [`Recipe`]: a real one when any parse attempt succeeds, or a
/// parse-error record carrying the cleaned text when all attempts fail.
/// Direct parsing is tried before extraction so valid minified JSON is never
/// needlessly truncated.
pub fn parse_recipe_input(raw: &str) -> Option<Recipe> {
    if raw.trim().is_empty() {
        return None;
    }

    let cleaned = sanitize(raw);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Some(normalize(&value));
    }

    // Fall back to extracting a balanced JSON block, from the raw text first
    // so sanitizer passes cannot damage an otherwise extractable value.
    for candidate in [extract_top_level_json(raw), extract_top_level_json(&cleaned)]
        .into_iter()
        .flatten()
    {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some(normalize(&value));
        }
    }

    debug!("recipe text did not parse, returning parse-error record");
    let fallback = if cleaned.is_empty() {
        raw.trim().to_string()
    } else {
        cleaned
    };
    Some(Recipe::parse_error(fallback))
}

/// Normalize input that is already structured (e.g. a provider that returned
/// a JSON body instead of text). The counterpart of [`parse_recipe_input`]
/// for non-string input.
pub fn parse_recipe_value(value: &Value) -> Recipe {
    normalize(value)
}
