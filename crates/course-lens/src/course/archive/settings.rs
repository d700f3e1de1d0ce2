use super::markup::{tag_raw, tag_text};
use super::normalizer::truncate_chars;
use super::publish::is_published_state;
use chrono::NaiveDateTime;

pub(crate) const DUE_DATE_NOT_SET: &str = "Not set";
pub(crate) const NOT_SPECIFIED: &str = "Not specified";

/// Fields read from an assignment folder's `assignment_settings.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssignmentSettings {
    pub(crate) published: bool,
    pub(crate) due_date: String,
    pub(crate) points: String,
    pub(crate) submission_type: String,
    pub(crate) title: Option<String>,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            published: true,
            due_date: DUE_DATE_NOT_SET.to_string(),
            points: NOT_SPECIFIED.to_string(),
            submission_type: NOT_SPECIFIED.to_string(),
            title: None,
        }
    }
}

impl AssignmentSettings {
    pub(crate) fn parse(xml: &str) -> Self {
        let defaults = Self::default();
        Self {
            published: tag_raw(xml, "workflow_state")
                .map(is_published_state)
                .unwrap_or(defaults.published),
            due_date: tag_raw(xml, "due_at")
                .map(format_due_date)
                .unwrap_or(defaults.due_date),
            points: tag_raw(xml, "points_possible")
                .map(str::to_string)
                .unwrap_or(defaults.points),
            submission_type: tag_text(xml, "submission_types").unwrap_or(defaults.submission_type),
            title: tag_text(xml, "title"),
        }
    }
}

/// Reformats an ISO 8601 timestamp as `MM/DD/YYYY HH:MM AM`.
///
/// Only the first 19 characters are read, so offsets and fractional seconds
/// are ignored. Unparseable input is returned unchanged.
pub fn format_due_date(iso: &str) -> String {
    if iso.is_empty() {
        return DUE_DATE_NOT_SET.to_string();
    }
    NaiveDateTime::parse_from_str(truncate_chars(iso, 19), "%Y-%m-%dT%H:%M:%S")
        .map(|parsed| parsed.format("%m/%d/%Y %I:%M %p").to_string())
        .unwrap_or_else(|_| iso.to_string())
}

/// Display name derived from an assignment file name slug.
pub(crate) fn assignment_name_from_file(file_name: &str) -> String {
    file_name
        .replace(".html", "")
        .replace("-|-", " | ")
        .replace('-', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
