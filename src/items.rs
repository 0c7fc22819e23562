//! Mapping of vision-model responses onto pantry item lists.

use log::debug;
use serde_json::Value;

use crate::parse::{extract_top_level_json, sanitize};

/// Turn one vision response into pantry item names.
///
/// The prompt asks for a JSON array of strings, so that is tried first
/// (directly, then via balanced-bracket extraction). Caption-style prose
/// answers fall back to comma/newline splitting. Negative responses
/// (literal "none") and empty entries are dropped. Duplicates are kept;
/// deduplication across images is the orchestrator's configured choice.
pub fn items_from_response(text: &str) -> Vec<String> {
    let cleaned = sanitize(text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let parsed: Option<Value> = serde_json::from_str(&cleaned).ok().or_else(|| {
        extract_top_level_json(&cleaned).and_then(|block| serde_json::from_str(block).ok())
    });

    let raw_items: Vec<String> = match parsed {
        Some(Value::Array(elements)) => elements
            .iter()
            .filter_map(|element| element.as_str().map(str::to_string))
            .collect(),
        _ => {
            debug!("vision response was not a JSON array, splitting as caption text");
            cleaned
                .split([',', '\n', ';'])
                .map(str::to_string)
                .collect()
        }
    };

    raw_items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && !is_negative(item))
        .collect()
}

/// Deduplicate while preserving first-seen order, case-insensitively.
pub fn dedupe_items(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut result = Vec::new();
    for item in items {
        let key = item.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            result.push(item);
        }
    }
    result
}

/// Vision-model ways of saying "no food here".
fn is_negative(item: &str) -> bool {
    item.eq_ignore_ascii_case("none")
        || item.eq_ignore_ascii_case("n/a")
        || item.eq_ignore_ascii_case("nothing")
}
