use serde_json::Value;

use crate::model::{Recipe, UNTITLED_RECIPE};

/// Map a parsed JSON value of any upstream shape onto the canonical
/// [`Recipe`] form. Never panics; malformed input becomes a parse-error
/// record instead.
///
/// An array is treated as a list of candidate recipes: each element is
/// normalized and the first that is not a parse error wins. An object is
/// normalized field by field, accepting `instructions` as an alias for
/// `steps` and wrapping scalar values into single-element lists. Anything
/// else (a bare string or number that slipped through extraction) is a
/// parse error.
pub fn normalize(value: &Value) -> Recipe {
    match value {
        Value::Array(elements) => elements
            .iter()
            .map(normalize)
            .find(|recipe| !recipe.parse_error)
            .unwrap_or_else(|| Recipe::parse_error("Empty or invalid recipe array")),
        Value::Object(fields) => Recipe {
            title: title_of(fields.get("title")),
            ingredients: string_list(fields.get("ingredients")),
            steps: string_list(fields.get("instructions").or_else(|| fields.get("steps"))),
            parse_error: false,
        },
        _ => Recipe::parse_error("Invalid recipe format"),
    }
}

fn title_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Null) | Some(Value::String(_)) | None => UNTITLED_RECIPE.to_string(),
        Some(other) => scalar_to_string(other),
    }
}

/// Coerce a field to a list of strings: arrays element-wise, scalars wrapped
/// in a single-element list, missing/null fields to an empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(elements)) => elements.iter().map(scalar_to_string).collect(),
        Some(scalar) => vec![scalar_to_string(scalar)],
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}
