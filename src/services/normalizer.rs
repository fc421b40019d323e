use regex::Regex;
use std::sync::OnceLock;

/// Turn raw model text into a candidate JSON document.
///
/// Steps run in order: trim, fence removal, whitespace collapse, brace
/// extraction. When no `{...}` span exists the cleaned text is returned so
/// the parse error still shows what the model said. Idempotent.
pub fn normalize_response(raw: &str) -> String {
    let trimmed = trim_whitespace(raw);
    let unfenced = strip_code_fences(trimmed);
    let collapsed = collapse_whitespace(&unfenced);

    match extract_json_object(&collapsed) {
        Some(object) => object.to_string(),
        None => collapsed,
    }
}

pub fn trim_whitespace(text: &str) -> &str {
    text.trim()
}

/// Remove Markdown fence markers (with any language tag) and stray backticks.
pub fn strip_code_fences(text: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"```[A-Za-z0-9_+-]*").expect("fence pattern is valid")
    });

    fence.replace_all(text, "").replace('`', "")
}

/// Newline runs become one space, then any whitespace run becomes one space.
pub fn collapse_whitespace(text: &str) -> String {
    static NEWLINES: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let newlines = NEWLINES.get_or_init(|| Regex::new(r"[\r\n]+").expect("newline pattern is valid"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("space pattern is valid"));

    let single_line = newlines.replace_all(text, " ");
    spaces.replace_all(&single_line, " ").trim().to_string()
}

/// Widest `{ ... }` span: first opening brace through last closing brace.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
