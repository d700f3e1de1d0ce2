//! Tag lookup over semi-structured export markup.
//!
//! Export XML is read by boundary splitting and first-occurrence tag lookup
//! rather than a full parser. Absent or empty tags surface as `None`.

use regex::{Regex, RegexBuilder};

/// Compiles one of the crate's constant patterns.
///
/// Several objective templates use wide bounded repetitions, so the compiled
/// size limit is raised above the library default.
pub(crate) fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .size_limit(64 * (1 << 20))
        .build()
        .unwrap_or_else(|err| panic!("invalid built-in pattern {pattern:?}: {err}"))
}

/// Splits `text` on every match of `boundary`, discarding the preamble before
/// the first boundary.
pub(crate) fn split_blocks<'a>(text: &'a str, boundary: &Regex) -> Vec<&'a str> {
    boundary.split(text).skip(1).collect()
}

/// Raw contents of the first `<tag>...</tag>` pair in `block`.
pub(crate) fn tag_raw<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    let value = block[start..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Contents of the first `<tag>` pair, reduced to plain text.
pub(crate) fn tag_text(block: &str, tag: &str) -> Option<String> {
    tag_raw(block, tag)
        .map(super::normalizer::strip_html)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_returns_first_non_empty_occurrence() {
        let xml = "<module><title> Intro &amp; Overview </title><title>Second</title></module>";
        assert_eq!(tag_raw(xml, "title"), Some("Intro &amp; Overview"));
        assert_eq!(tag_text(xml, "title").as_deref(), Some("Intro & Overview"));
        assert_eq!(tag_raw(xml, "position"), None);
        assert_eq!(tag_raw("<position>  </position>", "position"), None);
        assert_eq!(tag_raw("<position>3", "position"), None);
    }

    #[test]
    fn split_blocks_skips_preamble() {
        let boundary = compile(r"<item\s+identifier=[^>]+>");
        let xml = "<items><item identifier=\"a\">one</item><item identifier=\"b\">two</item></items>";
        let blocks = split_blocks(xml, &boundary);
        assert_eq!(blocks, vec!["one</item>", "two</item></items>"]);
        assert!(split_blocks("no items here", &boundary).is_empty());
    }
}
