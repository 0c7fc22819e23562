use serde::{Deserialize, Serialize};

/// Placeholder title used when a generated recipe omits one.
pub const UNTITLED_RECIPE: &str = "Untitled Recipe";

/// Title carried by synthetic parse-error records.
pub const PARSE_ERROR_TITLE: &str = "Recipe Parse Error";

/// A recipe in canonical form, after normalization of whatever shape the
/// upstream model produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    /// True only for synthetic records marking unparseable upstream text.
    /// Such records carry the offending text as the sole step.
    #[serde(default)]
    pub parse_error: bool,
}

impl Recipe {
    /// Build a parse-error record carrying the offending text for diagnostics.
    pub fn parse_error(text: impl Into<String>) -> Self {
        Recipe {
            title: PARSE_ERROR_TITLE.to_string(),
            ingredients: Vec::new(),
            steps: vec![text.into()],
            parse_error: true,
        }
    }
}

/// Outcome of one user-initiated processing run. Created fresh per run,
/// never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingResult {
    pub pantry_items: Vec<String>,
    pub recipes: Vec<Recipe>,
    /// Set only when the run terminated in a failed state; the item and
    /// recipe collections are empty in that case.
    pub error: Option<String>,
}

impl ProcessingResult {
    pub fn failed(message: impl Into<String>) -> Self {
        ProcessingResult {
            pantry_items: Vec::new(),
            recipes: Vec::new(),
            error: Some(message.into()),
        }
    }
}
