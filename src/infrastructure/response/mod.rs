/// Maximum number of characters of raw model output carried in error messages.
pub const RAW_SNIPPET_LIMIT: usize = 1000;

/// Strips a markdown code fence around a model response.
///
/// When the text starts with a fence, everything up to and including the first
/// newline (the fence line and its language tag) is dropped, then a trailing
/// fence is removed. Text without a leading fence is returned unchanged.
pub fn strip_code_fence(response: &str) -> String {
    let mut text = response;
    if !text.starts_with("```") {
        return text.to_string();
    }

    if let Some(first_newline) = text.find('\n') {
        text = &text[first_newline + 1..];
    }
    match text.strip_suffix("```") {
        Some(stripped) => stripped.trim().to_string(),
        None => text.to_string(),
    }
}

/// First `limit` characters of `value`, char-boundary safe.
pub fn snippet(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}
