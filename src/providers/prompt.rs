/// The prompt sent with each pantry photo, asking the vision model for a
/// JSON array of ingredient names.
///
/// Loaded from `prompt.txt` at compile time using the `include_str!` macro,
/// making it easy to edit without dealing with Rust string syntax.
pub const PANTRY_VISION_PROMPT: &str = include_str!("prompt.txt");

/// Build a strict single-recipe prompt from a list of pantry items.
///
/// The model is told to answer with exactly one minimal JSON object and
/// nothing else; the parse layer still tolerates it ignoring that.
pub fn build_single_recipe_prompt(items: &[String]) -> String {
    format!(
        "Given these pantry items: {}, generate ONE creative recipe as a minimal JSON object. \
         Respond ONLY with a single JSON object, no markdown, no explanation, no code block, \
         no extra text. The object should have only these fields: \"title\", \"ingredients\", \
         and \"instructions\". Use this exact template for your response: \
         {{\"title\": \"...\", \"ingredients\": [\"...\"], \"instructions\": [\"...\"]}}",
        items.join(", ")
    )
}

/// Build `count` distinct recipe prompts, each told which recipe number it
/// is and not to repeat any previous recipe.
pub fn build_recipe_prompts(items: &[String], count: u32) -> Vec<String> {
    let base = build_single_recipe_prompt(items);
    (1..=count)
        .map(|number| {
            format!(
                "{} This is recipe number {} of {}. Make it unique and do not repeat any previous recipe.",
                base, number, count
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_prompt_is_embedded() {
        assert!(!PANTRY_VISION_PROMPT.is_empty());
        assert!(PANTRY_VISION_PROMPT.contains("JSON array of strings"));
        assert!(PANTRY_VISION_PROMPT.contains("pantry"));
    }

    #[test]
    fn test_single_prompt_names_items_and_fields() {
        let items = vec!["rice".to_string(), "beans".to_string()];
        let prompt = build_single_recipe_prompt(&items);
        assert!(prompt.contains("rice, beans"));
        assert!(prompt.contains("\"title\""));
        assert!(prompt.contains("\"ingredients\""));
        assert!(prompt.contains("\"instructions\""));
    }

    #[test]
    fn test_numbered_prompts_are_distinct() {
        let items = vec!["rice".to_string()];
        let prompts = build_recipe_prompts(&items, 3);
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("recipe number 1 of 3"));
        assert!(prompts[2].contains("recipe number 3 of 3"));
        assert!(prompts.iter().all(|p| p.contains("do not repeat")));
    }
}
