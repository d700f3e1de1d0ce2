use crate::course::archive::markup::compile;
use crate::course::domain::Objective;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;

fn content_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"\b[a-z]{3,}\b"))
}

/// Word-overlap matcher deciding whether two statements express the same
/// objective.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatcher {
    pub stopwords: &'static [&'static str],
    pub threshold: f64,
}

impl FuzzyMatcher {
    fn words(&self, text: &str) -> HashSet<String> {
        content_word()
            .find_iter(&text.to_lowercase())
            .map(|m| m.as_str().to_string())
            .filter(|word| !self.stopwords.contains(&word.as_str()))
            .collect()
    }

    /// Overlap of the two content-word sets relative to the smaller set.
    /// Symmetric in its arguments; empty word sets never match.
    pub fn matches(&self, left: &str, right: &str) -> bool {
        let left = self.words(left);
        let right = self.words(right);
        if left.is_empty() || right.is_empty() {
            return false;
        }
        let shared = left.intersection(&right).count();
        shared as f64 / left.len().min(right.len()) as f64 >= self.threshold
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPair {
    pub course: Objective,
    pub syllabus: Objective,
}

/// Disjoint partition of course and syllabus objectives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub matched: Vec<MatchedPair>,
    pub course_only: Vec<Objective>,
    pub syllabus_only: Vec<Objective>,
}

impl ComparisonResult {
    pub fn has_mismatch(&self) -> bool {
        !self.course_only.is_empty() || !self.syllabus_only.is_empty()
    }
}

/// Greedy first-fit pairing in course order. Each syllabus objective is
/// claimed at most once and earlier course objectives claim first.
pub fn compare_objectives(
    course: &[Objective],
    syllabus: &[Objective],
    matcher: &FuzzyMatcher,
) -> ComparisonResult {
    let mut claimed = vec![false; syllabus.len()];
    let mut result = ComparisonResult::default();

    for course_objective in course {
        let candidate = (0..syllabus.len()).find(|&index| {
            !claimed[index] && matcher.matches(&course_objective.text, &syllabus[index].text)
        });
        match candidate {
            Some(index) => {
                claimed[index] = true;
                result.matched.push(MatchedPair {
                    course: course_objective.clone(),
                    syllabus: syllabus[index].clone(),
                });
            }
            None => result.course_only.push(course_objective.clone()),
        }
    }

    result.syllabus_only = syllabus
        .iter()
        .zip(claimed)
        .filter(|(_, was_claimed)| !was_claimed)
        .map(|(objective, _)| objective.clone())
        .collect();
    result
}
