//! Rich-text normalization for item content and connector captions

use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*(?:br\s*/?|/\s*p\s*)>").expect("valid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Convert a rich-text fragment into single-line plain text.
///
/// Line-break tags become newlines before the remaining tags are stripped,
/// entities are decoded, and whitespace runs collapse to one space.
///
/// Decoding can expose new markup (`&lt;b&gt;` decodes to `<b>`), so the
/// break/strip/decode passes repeat until the text stops changing. This is
/// what makes the function idempotent.
pub fn normalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut text = input.to_string();
    loop {
        let next = decode_pass(&text);
        if next == text {
            break;
        }
        text = next;
    }

    collapse_whitespace(&text)
}

/// Normalize optional content; absent content yields an empty string.
pub fn normalize_opt(input: Option<&str>) -> String {
    input.map(normalize).unwrap_or_default()
}

fn decode_pass(text: &str) -> String {
    let broken = LINE_BREAK.replace_all(text, "\n");
    let stripped = TAG.replace_all(&broken, "");
    htmlize::unescape(stripped.as_ref()).into_owned()
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
