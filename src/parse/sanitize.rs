/// Cleanup of common LLM JSON formatting noise, applied before any parse
/// attempt. Each pass is idempotent on already-clean input:
///
/// 1. replace a fenced code block (``` with optional language tag) with its
///    inner content
/// 2. drop any remaining stray backticks
/// 3. strip one outer pair of double quotes wrapping the whole string
/// 4. un-escape `\"` sequences
/// 5. turn escaped and literal newlines into spaces and collapse whitespace
///    runs, so no newline survives into the parse target
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let unfenced = strip_code_fence(trimmed);
    let without_ticks = unfenced.replace('`', "");
    let unquoted = strip_outer_quotes(without_ticks.trim());
    let unescaped = unquoted.replace("\\\"", "\"").replace("\\n", " ");

    // Collapse all remaining whitespace (including real newlines) to single
    // spaces. Brackets, commas and quotes still delimit JSON tokens, so this
    // cannot merge adjacent tokens.
    let mut out = String::with_capacity(unescaped.len());
    for word in unescaped.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Replace the first ```...``` span with its inner content, dropping an
/// optional language tag on the opening line. Text without a complete fence
/// passes through untouched.
fn strip_code_fence(text: &str) -> String {
    let Some(open) = text.find("```") else {
        return text.to_string();
    };
    let after_open = &text[open + 3..];
    let Some(close) = after_open.find("```") else {
        return text.to_string();
    };

    let mut inner = &after_open[..close];
    if let Some(newline) = inner.find('\n') {
        let tag = inner[..newline].trim();
        if tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            inner = &inner[newline + 1..];
        }
    }

    let mut result = String::with_capacity(text.len());
    result.push_str(&text[..open]);
    result.push_str(inner.trim());
    result.push_str(&after_open[close + 3..]);
    result.trim().to_string()
}

/// Strip a single outer pair of double quotes, a common double-encoding
/// artifact when a model returns a JSON string containing JSON.
fn strip_outer_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_clean_json_through() {
        let clean = r#"{"title":"Rice Bowl","ingredients":["rice"]}"#;
        assert_eq!(sanitize(clean), clean);
    }

    #[test]
    fn test_strips_json_fence() {
        let fenced = "```json\n{\"title\":\"Soup\"}\n```";
        assert_eq!(sanitize(fenced), "{\"title\":\"Soup\"}");
    }

    #[test]
    fn test_strips_fence_without_language_tag() {
        let fenced = "```\n{\"title\":\"Soup\"}\n```";
        assert_eq!(sanitize(fenced), "{\"title\":\"Soup\"}");
    }

    #[test]
    fn test_strips_stray_backticks() {
        assert_eq!(sanitize("`{\"a\":1}`"), "{\"a\":1}");
    }

    #[test]
    fn test_strips_outer_quote_pair() {
        assert_eq!(sanitize("\"{\\\"a\\\":1}\""), "{\"a\":1}");
    }

    #[test]
    fn test_unescapes_quotes() {
        assert_eq!(sanitize("{\\\"title\\\":\\\"Stew\\\"}"), "{\"title\":\"Stew\"}");
    }

    #[test]
    fn test_flattens_escaped_and_real_newlines() {
        assert_eq!(sanitize("{\"a\":\\n 1}\n"), "{\"a\": 1}");
        assert_eq!(sanitize("line one\nline   two"), "line one line two");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let noisy = "```json\n{ \"title\": \"Chili\",\n  \"steps\": [\"Simmer\"] }\n```";
        let once = sanitize(noisy);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n  "), "");
    }

    #[test]
    fn test_incomplete_fence_left_alone() {
        assert_eq!(sanitize("```json {\"a\":1}"), "json {\"a\":1}");
    }
}
