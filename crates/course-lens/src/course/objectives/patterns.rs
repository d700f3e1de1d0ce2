//! Objective statement detection within one block of text.

use super::ObjectiveExtractor;
use crate::course::archive::markup::compile;
use crate::course::archive::normalizer::{collapse_whitespace, truncate_chars};
use crate::course::domain::{BloomsLevel, Objective, ObjectiveType};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const MIN_OBJECTIVE_CHARS: usize = 20;
const MAX_OBJECTIVE_CHARS: usize = 200;

/// Templates applied across the full text, in order. Capture group 1 holds
/// the objective statement.
const TEMPLATES: [&str; 5] = [
    // direct address
    r"(?im)(?:students|you|learners|participants)\s+will\s+([^.!?\n]{15,250})[.!?\n]",
    // end-of-period framing
    r"(?im)by\s+the\s+end\s+of\s+(?:this\s+)?(?:module|week|course|unit|lesson)[^,\n]*,?\s*(?:you\s+will\s+be\s+able\s+to|you\s+will|students\s+will)\s*:?\s*([^.!?\n]{15,250})",
    // completion framing
    r"(?im)upon\s+completion\s+of\s+(?:this\s+)?(?:module|course|unit|lesson)[^,\n]*,?\s*(?:students|you|learners)\s+will\s+([^.!?\n]{15,250})",
    // explicit labels
    r"(?im)(?:clo|mlo|slo|lo|course\s+objective|learning\s+objective|module\s+objective)\s*[-:#]?\s*\d*\s*[:.]\s*([^.\n]{15,250})",
    // numbered or bulleted capitalized lines
    r"(?im)(?:^|\n)\s*(?:\d+[.)]\s*|[-•*]\s*)([A-Z][a-z]{2,}\s[^.\n]{15,200})",
];

fn templates() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| TEMPLATES.iter().map(|pattern| compile(pattern)).collect())
}

fn objective_section() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(
            r"(?i)(?:course\s+)?(?:module\s+)?(?:learning\s+)?objectives?\s*:?[ \t]*\n((?:[^\n]+\n){1,30})",
        )
    })
}

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[\s\d.)\-•*]+"))
}

fn markup_artifact() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)href=|<[a-z]+|click here|log.?in|canvas\."))
}

fn normalize(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// Runs the section pass then the template pass over `text`.
///
/// `seen` holds normalized statements already accepted in this extraction
/// call; anything already present is skipped and new statements are added.
pub(crate) fn scan_text(
    extractor: &ObjectiveExtractor,
    text: &str,
    source: &str,
    seen: &mut HashSet<String>,
) -> Vec<Objective> {
    let mut found = Vec::new();
    scan_sections(extractor, text, source, seen, &mut found);

    for template in templates() {
        for captures in template.captures_iter(text) {
            let raw = captures
                .get(1)
                .or_else(|| captures.get(0))
                .map_or("", |m| m.as_str());
            if let Some(objective) = accept_match(extractor, raw, source, seen) {
                found.push(objective);
            }
        }
    }

    found
}

fn scan_sections(
    extractor: &ObjectiveExtractor,
    text: &str,
    source: &str,
    seen: &mut HashSet<String>,
    found: &mut Vec<Objective>,
) {
    for section in objective_section().captures_iter(text) {
        let whole = section.get(0).map_or("", |m| m.as_str());
        let header = whole.lines().next().unwrap_or("").to_lowercase();
        let hint = if header.contains("module") {
            Some(ObjectiveType::Mlo)
        } else if header.contains("course") {
            Some(ObjectiveType::Clo)
        } else {
            None
        };

        let body = section.get(1).map_or("", |m| m.as_str());
        for line in body.lines() {
            let line = list_marker().replace(line, "");
            let line = line.trim();
            if line.chars().count() < MIN_OBJECTIVE_CHARS {
                continue;
            }
            let norm = normalize(line);
            if seen.contains(&norm) {
                continue;
            }
            let blooms = extractor.detect_blooms(line);
            if blooms == BloomsLevel::Unclear && hint.is_none() {
                continue;
            }
            seen.insert(norm);
            found.push(Objective {
                text: truncate_chars(line, MAX_OBJECTIVE_CHARS).to_string(),
                blooms,
                source: source.to_string(),
                kind: hint.unwrap_or_else(|| extractor.classify(source, line)),
                module_number: None,
            });
        }
    }
}

fn accept_match(
    extractor: &ObjectiveExtractor,
    raw: &str,
    source: &str,
    seen: &mut HashSet<String>,
) -> Option<Objective> {
    let collapsed = collapse_whitespace(raw);
    let clean = collapsed.trim_end_matches(['.', ',', ';']);
    if clean.chars().count() < MIN_OBJECTIVE_CHARS || markup_artifact().is_match(clean) {
        return None;
    }
    if !seen.insert(normalize(clean)) {
        return None;
    }
    Some(Objective {
        text: truncate_chars(clean, MAX_OBJECTIVE_CHARS).to_string(),
        blooms: extractor.detect_blooms(clean),
        source: source.to_string(),
        kind: extractor.classify(source, clean),
        module_number: None,
    })
}
