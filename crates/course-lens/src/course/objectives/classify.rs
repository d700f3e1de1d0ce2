use crate::course::archive::markup::compile;
use crate::course::domain::{BloomsLevel, ModuleRecord, ObjectiveType, SYLLABUS_SOURCE};
use regex::Regex;
use std::sync::OnceLock;

/// Whole-word verb matchers, one per Bloom's level.
#[derive(Debug, Clone)]
pub struct BloomsMatcher {
    levels: Vec<(BloomsLevel, Regex)>,
}

impl BloomsMatcher {
    pub fn new(table: &[(BloomsLevel, &[&str])]) -> Self {
        let levels = table
            .iter()
            .filter(|(_, verbs)| !verbs.is_empty())
            .map(|(level, verbs)| {
                let alternation = verbs
                    .iter()
                    .map(|verb| regex::escape(verb))
                    .collect::<Vec<_>>()
                    .join("|");
                (*level, compile(&format!(r"\b(?:{alternation})\b")))
            })
            .collect();
        Self { levels }
    }

    /// Highest level with at least one verb present, or `Unclear`.
    pub fn detect(&self, text: &str) -> BloomsLevel {
        let lowered = text.to_lowercase();
        self.levels
            .iter()
            .filter(|(_, pattern)| pattern.is_match(&lowered))
            .map(|(level, _)| *level)
            .max()
            .unwrap_or(BloomsLevel::Unclear)
    }
}

fn explicit_clo() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(r"\bclo[-\s]?\d*\b|course.level.objective|course.learning.objective")
    })
}

fn explicit_mlo() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(
            r"\bmlo[-\s]?\d*\b|module.level.objective|module.learning.objective|module.objective",
        )
    })
}

fn end_of_course() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"by\s+the\s+end\s+of\s+(?:this\s+)?(?:the\s+)?course"))
}

fn end_of_module() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"by\s+the\s+end\s+of\s+(?:this\s+)?(?:module|week|unit|lesson)"))
}

fn module_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"module[-\s]?\d|week[-\s]?\d|unit[-\s]?\d|\bmod[-\s]?\d"))
}

fn module_number_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?:module|week|unit|mod)[-\s]?(\d+)"))
}

/// CLO/MLO classification; the first matching rule wins.
///
/// An explicit CLO/MLO label in the text or source outranks the syllabus
/// source rule.
pub fn classify_type(source: &str, text: &str, course_source_keys: &[&str]) -> ObjectiveType {
    let src = source.to_lowercase();
    let txt = text.to_lowercase();
    let labelled = format!("{txt} {src}");

    if explicit_clo().is_match(&labelled) {
        return ObjectiveType::Clo;
    }
    if explicit_mlo().is_match(&labelled) {
        return ObjectiveType::Mlo;
    }
    if src == SYLLABUS_SOURCE.to_lowercase() {
        return ObjectiveType::Clo;
    }
    if end_of_course().is_match(&txt) {
        return ObjectiveType::Clo;
    }
    if end_of_module().is_match(&txt) {
        return ObjectiveType::Mlo;
    }
    if course_source_keys.iter().any(|key| src.contains(key)) {
        return ObjectiveType::Clo;
    }
    if module_token().is_match(&src) || src.starts_with("[assignment]") {
        return ObjectiveType::Mlo;
    }
    ObjectiveType::Unknown
}

/// Module an objective belongs to, inferred from its source label.
///
/// A numeric module/week/unit token wins; otherwise the first module whose
/// title shares a long word with the source supplies its position. Numbers
/// inside that module's title are not consulted.
pub fn module_number(source: &str, modules: &[ModuleRecord]) -> Option<u32> {
    let src = source.to_lowercase();
    if let Some(captures) = module_number_token().captures(&src) {
        return captures.get(1).and_then(|m| m.as_str().parse().ok());
    }

    modules
        .iter()
        .find(|module| {
            module
                .title_keywords()
                .iter()
                .any(|word| src.contains(word.as_str()))
        })
        .and_then(ModuleRecord::number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::objectives::BLOOMS_VERBS;

    const COURSE_KEYS: &[&str] = &["syllabus", "welcome", "course-overview"];

    fn module(title: &str, position: &str) -> ModuleRecord {
        ModuleRecord {
            title: title.to_string(),
            position: position.to_string(),
            state: "active".to_string(),
            items: Vec::new(),
            weeks: Vec::new(),
        }
    }

    #[test]
    fn blooms_detects_highest_level_by_whole_word() {
        let matcher = BloomsMatcher::new(BLOOMS_VERBS);
        assert_eq!(
            matcher.detect("Students will analyze three case studies and design a solution."),
            BloomsLevel::Create
        );
        assert_eq!(matcher.detect("Identify and Explain key terms"), BloomsLevel::Understand);
        assert_eq!(matcher.detect("Reusable materials are provided"), BloomsLevel::Unclear);
        assert_eq!(matcher.detect("Summarizes the readings"), BloomsLevel::Unclear);
    }

    #[test]
    fn syllabus_source_is_always_course_level() {
        for text in [
            "by the end of this week you will summarize chapter two",
            "Describe the main causes of climate change",
            "Complete the module 3 lab",
        ] {
            assert_eq!(classify_type("[Syllabus]", text, COURSE_KEYS), ObjectiveType::Clo);
        }
    }

    #[test]
    fn classification_follows_precedence() {
        assert_eq!(
            classify_type("module-2-overview", "CLO 3: evaluate sources", COURSE_KEYS),
            ObjectiveType::Clo
        );
        assert_eq!(
            classify_type("welcome", "MLO-1 identify key terms", COURSE_KEYS),
            ObjectiveType::Mlo
        );
        assert_eq!(
            classify_type("week-4-notes", "By the end of the course, you will write", COURSE_KEYS),
            ObjectiveType::Clo
        );
        assert_eq!(
            classify_type("welcome", "By the end of this unit, explain the model", COURSE_KEYS),
            ObjectiveType::Mlo
        );
        assert_eq!(
            classify_type("course-overview", "Explain the model in detail", COURSE_KEYS),
            ObjectiveType::Clo
        );
        assert_eq!(
            classify_type("week-4-notes", "Explain the model in detail", COURSE_KEYS),
            ObjectiveType::Mlo
        );
        assert_eq!(
            classify_type("[Assignment] Essay", "Explain the model in detail", COURSE_KEYS),
            ObjectiveType::Mlo
        );
        assert_eq!(
            classify_type("readings", "Explain the model in detail", COURSE_KEYS),
            ObjectiveType::Unknown
        );
    }

    #[test]
    fn module_number_prefers_numeric_tokens_then_titles() {
        let modules = vec![module("Orientation", "?"), module("Research Methods", "4")];
        assert_eq!(module_number("module-7-readings", &modules), Some(7));
        assert_eq!(module_number("Week 2 Overview", &modules), Some(2));
        assert_eq!(module_number("research-primer", &modules), Some(4));
        assert_eq!(module_number("orientation-checklist", &modules), None);
        assert_eq!(module_number("glossary", &modules), None);

        let renumbered = vec![module("Module 9: Applied Ethics", "3")];
        assert_eq!(module_number("applied-ethics-primer", &renumbered), Some(3));
    }
}
