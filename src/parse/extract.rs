/// Locate the first balanced top-level JSON value (`{...}` or `[...]`)
/// embedded in free-form text.
///
/// A naive `{.*}` regex fails on nested objects and on multiple JSON-like
/// substrings in prose, so this walks the text with a bracket depth counter
/// instead: start at the earliest `{` or `[` (lowest index wins, regardless
/// of bracket type), increment on any opener, decrement on any closer, and
/// stop where depth first returns to zero.
///
/// Returns `None` when no opener exists or the text is truncated so the
/// depth never balances.
pub fn extract_top_level_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;

    let mut depth: i64 = 0;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            // Brackets are ASCII, so start + offset + 1 is a char boundary.
            return Some(&text[start..start + offset + 1]);
        }
    }
    None
}
