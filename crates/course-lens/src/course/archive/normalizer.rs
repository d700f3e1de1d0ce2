use super::markup::compile;
use regex::Regex;
use std::sync::OnceLock;

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

fn script_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?s)<(script|style)[^>]*>.*?</(script|style)>"))
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"<[^>]+>"))
}

/// Reduces a markup fragment to single-line plain text.
///
/// Script and style blocks are dropped, every tag becomes one space, the six
/// common entities are decoded, and whitespace runs collapse to one space.
/// Exotic entities and nested comments may leak through.
pub fn strip_html(markup: &str) -> String {
    let without_scripts = script_blocks().replace_all(markup, "");
    let mut text = any_tag().replace_all(&without_scripts, " ").into_owned();
    for (entity, decoded) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, decoded);
        }
    }
    collapse_whitespace(&text)
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `limit` characters of `value`, never splitting a code point.
pub fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
