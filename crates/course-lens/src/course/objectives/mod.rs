//! Learning objective extraction, classification, and course/syllabus
//! comparison.

mod classify;
mod compare;
mod patterns;

pub use classify::{classify_type, module_number, BloomsMatcher};
pub use compare::{compare_objectives, ComparisonResult, FuzzyMatcher, MatchedPair};

use crate::course::archive::normalizer::truncate_chars;
use crate::course::domain::{
    AssignmentRecord, BloomsLevel, ModuleRecord, Objective, ObjectiveType,
    ASSIGNMENT_SOURCE_PREFIX, SYLLABUS_SOURCE,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

pub const BLOOMS_VERBS: &[(BloomsLevel, &[&str])] = &[
    (
        BloomsLevel::Remember,
        &[
            "define", "list", "recall", "identify", "name", "label", "match", "memorize",
            "recognize", "repeat", "reproduce", "state",
        ],
    ),
    (
        BloomsLevel::Understand,
        &[
            "explain", "summarize", "classify", "compare", "discuss", "interpret", "paraphrase",
            "predict", "report", "restate", "review", "translate",
        ],
    ),
    (
        BloomsLevel::Apply,
        &[
            "use", "demonstrate", "solve", "implement", "execute", "apply", "calculate",
            "complete", "illustrate", "modify", "operate", "show",
        ],
    ),
    (
        BloomsLevel::Analyze,
        &[
            "differentiate", "examine", "organize", "attribute", "deconstruct", "analyze",
            "contrast", "distinguish", "inspect", "question",
        ],
    ),
    (
        BloomsLevel::Evaluate,
        &[
            "judge", "critique", "justify", "argue", "assess", "appraise", "defend", "evaluate",
            "prioritize", "rank", "recommend", "support",
        ],
    ),
    (
        BloomsLevel::Create,
        &[
            "design", "construct", "develop", "formulate", "produce", "assemble", "build",
            "compose", "create", "devise", "generate", "plan", "write",
        ],
    ),
];

/// Source label fragments that mark a page as course-level.
pub const COURSE_SOURCE_KEYS: &[&str] = &[
    "syllabus",
    "course-info",
    "course-overview",
    "welcome",
    "introduction",
    "getting-started",
    "start-here",
    "outcomes",
    "goals",
    "course-objectives",
];

/// Page name fragments scanned first, in this order.
pub const PAGE_PRIORITY_KEYS: &[&str] = &[
    "objective",
    "overview",
    "welcome",
    "introduction",
    "getting-started",
    "start-here",
    "outcomes",
    "goals",
    "competenc",
    "module",
    "week",
    "unit",
];

pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "to", "of", "in", "for", "is", "are", "will", "be", "able",
    "that", "this", "their", "its", "by", "at", "students", "you", "learners", "participants",
    "course", "module",
];

/// Keyword tables and caps for objective extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectivePolicy {
    pub blooms_verbs: &'static [(BloomsLevel, &'static [&'static str])],
    pub course_source_keys: &'static [&'static str],
    pub page_priority_keys: &'static [&'static str],
    pub stopwords: &'static [&'static str],
    pub match_threshold: f64,
    /// Texts at or below this many characters are not scanned.
    pub min_source_chars: usize,
    /// Objectives sharing this many leading characters are duplicates.
    pub prefix_chars: usize,
    pub max_course_objectives: usize,
    pub max_syllabus_objectives: usize,
}

impl Default for ObjectivePolicy {
    fn default() -> Self {
        Self {
            blooms_verbs: BLOOMS_VERBS,
            course_source_keys: COURSE_SOURCE_KEYS,
            page_priority_keys: PAGE_PRIORITY_KEYS,
            stopwords: STOPWORDS,
            match_threshold: 0.55,
            min_source_chars: 80,
            prefix_chars: 60,
            max_course_objectives: 60,
            max_syllabus_objectives: 40,
        }
    }
}

impl ObjectivePolicy {
    pub fn fuzzy_matcher(&self) -> FuzzyMatcher {
        FuzzyMatcher {
            stopwords: self.stopwords,
            threshold: self.match_threshold,
        }
    }
}

/// Stateless extractor; every call owns its own deduplication state.
#[derive(Debug, Clone)]
pub struct ObjectiveExtractor {
    policy: ObjectivePolicy,
    blooms: BloomsMatcher,
}

impl Default for ObjectiveExtractor {
    fn default() -> Self {
        Self::new(ObjectivePolicy::default())
    }
}

impl ObjectiveExtractor {
    pub fn new(policy: ObjectivePolicy) -> Self {
        let blooms = BloomsMatcher::new(policy.blooms_verbs);
        Self { policy, blooms }
    }

    pub fn policy(&self) -> &ObjectivePolicy {
        &self.policy
    }

    pub fn detect_blooms(&self, text: &str) -> BloomsLevel {
        self.blooms.detect(text)
    }

    pub fn classify(&self, source: &str, text: &str) -> ObjectiveType {
        classify_type(source, text, self.policy.course_source_keys)
    }

    /// Objectives found in one text block, skipping any statement whose
    /// normalized form is already in `seen`. Accepted statements are added to
    /// `seen`, so sharing one set across calls deduplicates across texts.
    pub fn extract_from_text(
        &self,
        text: &str,
        source: &str,
        seen: &mut HashSet<String>,
    ) -> Vec<Objective> {
        patterns::scan_text(self, text, source, seen)
    }

    /// Course objectives from published pages then published assignments.
    ///
    /// Pages are visited in priority order (objective and overview pages
    /// first); ties keep archive order.
    pub fn extract_objectives(
        &self,
        pages: &IndexMap<String, String>,
        assignments: &IndexMap<String, AssignmentRecord>,
        modules: &[ModuleRecord],
    ) -> Vec<Objective> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        let mut ordered: Vec<(&String, &String)> = pages.iter().collect();
        ordered.sort_by_key(|(name, _)| self.page_priority(name));

        for (page_name, content) in ordered {
            if !self.is_scannable(content) {
                continue;
            }
            let module = module_number(page_name, modules);
            found.extend(
                self.extract_from_text(content, page_name, &mut seen)
                    .into_iter()
                    .map(|objective| Objective {
                        module_number: module,
                        ..objective
                    }),
            );
        }

        for (name, assignment) in assignments {
            let instructions = assignment.instructions.trim();
            if !self.is_scannable(instructions) {
                continue;
            }
            let label = format!("{ASSIGNMENT_SOURCE_PREFIX}{name}");
            let module = module_number(&assignment.folder_id, modules);
            found.extend(
                self.extract_from_text(instructions, &label, &mut seen)
                    .into_iter()
                    .map(|objective| Objective {
                        module_number: module,
                        ..objective
                    }),
            );
        }

        let objectives = self.dedupe_by_prefix(found, self.policy.max_course_objectives);
        debug!(count = objectives.len(), "extracted course objectives");
        objectives
    }

    /// Objectives from caller-supplied syllabus text, with their own
    /// deduplication state.
    pub fn extract_syllabus_objectives(&self, syllabus: &str) -> Vec<Objective> {
        let syllabus = syllabus.trim();
        if syllabus.is_empty() {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let found = self.extract_from_text(syllabus, SYLLABUS_SOURCE, &mut seen);
        let objectives = self.dedupe_by_prefix(found, self.policy.max_syllabus_objectives);
        debug!(count = objectives.len(), "extracted syllabus objectives");
        objectives
    }

    pub fn compare(&self, course: &[Objective], syllabus: &[Objective]) -> ComparisonResult {
        compare_objectives(course, syllabus, &self.policy.fuzzy_matcher())
    }

    fn is_scannable(&self, text: &str) -> bool {
        text.trim().chars().count() > self.policy.min_source_chars
    }

    fn page_priority(&self, page_name: &str) -> usize {
        let lowered = page_name.to_lowercase();
        self.policy
            .page_priority_keys
            .iter()
            .position(|key| lowered.contains(key))
            .unwrap_or(self.policy.page_priority_keys.len())
    }

    fn dedupe_by_prefix(&self, objectives: Vec<Objective>, cap: usize) -> Vec<Objective> {
        let mut prefixes = HashSet::new();
        objectives
            .into_iter()
            .filter(|objective| {
                let prefix = truncate_chars(&objective.text, self.policy.prefix_chars)
                    .to_lowercase()
                    .trim()
                    .to_string();
                prefixes.insert(prefix)
            })
            .take(cap)
            .collect()
    }
}
