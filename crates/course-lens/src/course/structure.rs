//! Structural extractors deriving identity, modules, grading, and rubrics
//! from the raw settings blobs of a [`CourseRecord`].
//!
//! Each extractor is independent and returns an empty or default result when
//! its source member is missing.

use crate::course::archive::markup::{compile, split_blocks, tag_raw, tag_text};
use crate::course::archive::normalizer::truncate_chars;
use crate::course::archive::publish::{is_published_state, item_boundary};
use crate::course::domain::{
    CourseIdentity, CourseRecord, GradingGroup, GroupWeight, ItemRecord, Modality,
    ModuleRecord, Rubric, UNKNOWN,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const UNTITLED_MODULE: &str = "Untitled Module";
const UNNAMED_GROUP: &str = "Unnamed";
const UNTITLED_RUBRIC: &str = "Untitled Rubric";
const UNKNOWN_POSITION: &str = "?";
const DEFAULT_STATE: &str = "active";

fn module_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"<module\s+identifier=[^>]+>"))
}

fn group_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"<assignmentGroup\s+identifier=[^>]+>"))
}

fn rubric_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"<rubric\s+identifier=[^>]+>"))
}

fn criterion_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"<criterion\s+identifier=[^>]+>"))
}

fn week_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)^week\s+(\d+)\s*(?:[|:—\-]\s*(.+))?"))
}

fn first_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"\d+"))
}

pub fn extract_identity(record: &CourseRecord) -> CourseIdentity {
    let settings = record.settings.course_settings.as_str();
    let field = |tag: &str| tag_text(settings, tag).unwrap_or_else(|| UNKNOWN.to_string());
    let date = |tag: &str| {
        tag_text(settings, tag)
            .map(|value| truncate_chars(&value, 10).to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    CourseIdentity {
        title: field("title"),
        code: field("course_code"),
        modality: infer_modality(record),
        start_date: date("start_at"),
        end_date: date("conclude_at"),
    }
}

/// Keyword search over page text then syllabus; the first matching modality
/// in priority order wins.
fn infer_modality(record: &CourseRecord) -> Modality {
    let mut combined = record.page_corpus();
    combined.push_str(&record.syllabus_text.to_lowercase());

    if combined.contains("online") {
        Modality::Online
    } else if combined.contains("hybrid") {
        Modality::Hybrid
    } else if combined.contains("face-to-face") || combined.contains("in-person") {
        Modality::FaceToFace
    } else {
        Modality::Unknown
    }
}

/// Published modules with their published items and week grouping.
pub fn extract_modules(record: &CourseRecord) -> Vec<ModuleRecord> {
    split_blocks(&record.settings.module_meta, module_boundary())
        .into_iter()
        .filter_map(parse_module)
        .collect()
}

fn parse_module(block: &str) -> Option<ModuleRecord> {
    let state = tag_raw(block, "workflow_state").unwrap_or(DEFAULT_STATE);
    if !is_published_state(state) {
        return None;
    }

    let items = tag_raw(block, "items").map(parse_items).unwrap_or_default();
    let weeks = sorted_weeks(&items);

    Some(ModuleRecord {
        title: tag_text(block, "title").unwrap_or_else(|| UNTITLED_MODULE.to_string()),
        position: tag_raw(block, "position")
            .unwrap_or(UNKNOWN_POSITION)
            .to_string(),
        state: state.to_string(),
        items,
        weeks,
    })
}

fn parse_items(section: &str) -> Vec<ItemRecord> {
    let mut items = Vec::new();
    let mut current_week: Option<String> = None;

    for block in split_blocks(section, item_boundary()) {
        let Some(title) = tag_text(block, "title") else {
            continue;
        };
        let state = tag_raw(block, "workflow_state").unwrap_or(DEFAULT_STATE);
        if !is_published_state(state) {
            continue;
        }

        let header = week_header().captures(&title).map(|captures| {
            let number = captures.get(1).map_or("", |m| m.as_str());
            match captures.get(2).map(|m| m.as_str().trim()) {
                Some(label) if !label.is_empty() => format!("Week {number} — {label}"),
                _ => format!("Week {number}"),
            }
        });
        let is_week_header = header.is_some();
        if header.is_some() {
            current_week = header;
        }

        items.push(ItemRecord {
            content_type: tag_text(block, "content_type").unwrap_or_default(),
            title,
            is_week_header,
            week: current_week.clone(),
        });
    }

    items
}

fn sorted_weeks(items: &[ItemRecord]) -> Vec<String> {
    let distinct: BTreeSet<&str> = items
        .iter()
        .filter(|item| item.is_week_header)
        .filter_map(|item| item.week.as_deref())
        .collect();
    let mut weeks: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    weeks.sort_by_key(|week| week_number(week));
    weeks
}

fn week_number(label: &str) -> u64 {
    first_number()
        .find(label)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Assignment groups ordered by numeric position; unnumbered groups sort last.
pub fn extract_grading(record: &CourseRecord) -> Vec<GradingGroup> {
    let mut groups: Vec<GradingGroup> =
        split_blocks(&record.settings.assignment_groups, group_boundary())
            .into_iter()
            .map(|block| GradingGroup {
                name: tag_text(block, "title").unwrap_or_else(|| UNNAMED_GROUP.to_string()),
                weight: parse_weight(tag_raw(block, "group_weight")),
                position: tag_raw(block, "position")
                    .unwrap_or(UNKNOWN_POSITION)
                    .to_string(),
            })
            .collect();

    groups.sort_by_key(|group| {
        let position = group.position.parse::<u64>().ok();
        (position.is_none(), position)
    });
    groups
}

fn parse_weight(raw: Option<&str>) -> GroupWeight {
    match raw {
        None => GroupWeight::Percent(0.0),
        Some(raw) => raw
            .parse::<f64>()
            .map(GroupWeight::Percent)
            .unwrap_or_else(|_| GroupWeight::Raw(raw.to_string())),
    }
}

pub fn extract_rubrics(record: &CourseRecord) -> Vec<Rubric> {
    split_blocks(&record.settings.rubrics, rubric_boundary())
        .into_iter()
        .map(|block| Rubric {
            title: tag_text(block, "title").unwrap_or_else(|| UNTITLED_RUBRIC.to_string()),
            criteria: split_blocks(block, criterion_boundary())
                .into_iter()
                .filter_map(|criterion| {
                    let description = tag_text(criterion, "description")?;
                    let points = tag_raw(criterion, "points").unwrap_or(UNKNOWN_POSITION);
                    Some(format!("{description} ({points} pts)"))
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::domain::SettingsBlobs;

    fn record_with(settings: SettingsBlobs) -> CourseRecord {
        CourseRecord {
            settings,
            ..CourseRecord::default()
        }
    }

    const MODULE_META: &str = r#"<?xml version="1.0"?>
<modules>
  <module identifier="m1">
    <title>Module 1: Foundations</title>
    <workflow_state>active</workflow_state>
    <position>1</position>
    <items>
      <item identifier="i1"><content_type>ContextModuleSubHeader</content_type><workflow_state>active</workflow_state><title>Week 2 | Ethics in Practice</title></item>
      <item identifier="i2"><content_type>WikiPage</content_type><workflow_state>active</workflow_state><title>Reading Guide</title></item>
      <item identifier="i3"><content_type>Assignment</content_type><workflow_state>unpublished</workflow_state><title>Draft Essay</title></item>
      <item identifier="i4"><content_type>ContextModuleSubHeader</content_type><title>Week 1</title></item>
      <item identifier="i5"><content_type>Quizzes::Quiz</content_type><title>Check-in Quiz</title></item>
    </items>
  </module>
  <module identifier="m2">
    <title>Module 2: Hidden</title>
    <workflow_state>unpublished</workflow_state>
    <position>2</position>
    <items>
      <item identifier="i6"><workflow_state>active</workflow_state><title>Visible Item</title></item>
    </items>
  </module>
</modules>"#;

    #[test]
    fn modules_keep_published_items_and_group_weeks() {
        let modules = extract_modules(&record_with(SettingsBlobs {
            module_meta: MODULE_META.to_string(),
            ..SettingsBlobs::default()
        }));

        assert_eq!(modules.len(), 1);
        let module = &modules[0];
        assert_eq!(module.title, "Module 1: Foundations");
        assert_eq!(module.number(), Some(1));

        let titles: Vec<&str> = module.items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["Week 2 | Ethics in Practice", "Reading Guide", "Week 1", "Check-in Quiz"]);
        assert_eq!(module.items[1].week.as_deref(), Some("Week 2 — Ethics in Practice"));
        assert!(!module.items[1].is_week_header);
        assert_eq!(module.items[3].week.as_deref(), Some("Week 1"));
        assert_eq!(module.weeks, vec!["Week 1", "Week 2 — Ethics in Practice"]);
    }

    #[test]
    fn unpublished_module_is_dropped_with_its_items() {
        let meta = r#"<modules><module identifier="m1"><title>Module 1</title>
<workflow_state>unpublished</workflow_state><items>
<item identifier="i1"><workflow_state>active</workflow_state><title>Welcome</title></item>
</items></module></modules>"#;
        let modules = extract_modules(&record_with(SettingsBlobs {
            module_meta: meta.to_string(),
            ..SettingsBlobs::default()
        }));
        assert!(modules.is_empty());
    }

    #[test]
    fn grading_groups_parse_weights_and_sort_by_position() {
        let xml = r#"<assignmentGroups>
<assignmentGroup identifier="g3"><title>Final Project</title><position>3</position><group_weight>40</group_weight></assignmentGroup>
<assignmentGroup identifier="gx"><title>Extra</title><group_weight>n/a</group_weight></assignmentGroup>
<assignmentGroup identifier="g1"><title>Discussions</title><position>1</position><group_weight>25.5</group_weight></assignmentGroup>
<assignmentGroup identifier="g2"><title>Quizzes</title><position>2</position></assignmentGroup>
</assignmentGroups>"#;
        let groups = extract_grading(&record_with(SettingsBlobs {
            assignment_groups: xml.to_string(),
            ..SettingsBlobs::default()
        }));

        let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
        assert_eq!(names, vec!["Discussions", "Quizzes", "Final Project", "Extra"]);
        assert_eq!(groups[0].weight.to_string(), "25.5");
        assert_eq!(groups[1].weight, GroupWeight::Percent(0.0));
        assert_eq!(groups[3].weight, GroupWeight::Raw("n/a".to_string()));
        assert_eq!(groups[3].position, "?");
    }

    #[test]
    fn rubrics_render_criteria_with_points() {
        let xml = r#"<rubrics><rubric identifier="r1"><title>Essay Rubric</title><criteria>
<criterion identifier="c1"><description>Thesis clarity</description><points>10.0</points></criterion>
<criterion identifier="c2"><description>Citations</description></criterion>
</criteria></rubric><rubric identifier="r2"></rubric></rubrics>"#;
        let rubrics = extract_rubrics(&record_with(SettingsBlobs {
            rubrics: xml.to_string(),
            ..SettingsBlobs::default()
        }));

        assert_eq!(rubrics.len(), 2);
        assert_eq!(rubrics[0].title, "Essay Rubric");
        assert_eq!(rubrics[0].criteria, vec!["Thesis clarity (10.0 pts)", "Citations (? pts)"]);
        assert_eq!(rubrics[1].title, "Untitled Rubric");
    }

    #[test]
    fn identity_reads_settings_and_infers_modality() {
        let mut record = record_with(SettingsBlobs {
            course_settings: "<course><title>Intro to Ethics</title><course_code>PHI2600</course_code>\
<start_at>2025-08-25T04:00:00Z</start_at></course>"
                .to_string(),
            ..SettingsBlobs::default()
        });
        record
            .published_pages
            .insert("welcome".to_string(), "This hybrid course meets weekly.".to_string());

        let identity = extract_identity(&record);
        assert_eq!(identity.title, "Intro to Ethics");
        assert_eq!(identity.code, "PHI2600");
        assert_eq!(identity.start_date, "2025-08-25");
        assert_eq!(identity.end_date, "Unknown");
        assert_eq!(identity.modality, Modality::Hybrid);

        record.syllabus_text = "Delivered fully online.".to_string();
        assert_eq!(extract_identity(&record).modality, Modality::Online);
    }

    #[test]
    fn missing_sources_yield_empty_results() {
        let record = CourseRecord::default();
        assert!(extract_modules(&record).is_empty());
        assert!(extract_grading(&record).is_empty());
        assert!(extract_rubrics(&record).is_empty());
        assert_eq!(extract_identity(&record), CourseIdentity::default());
    }
}
