use super::config::{mentions, EvaluationConfig};
use super::{EvaluationResult, StandardStatus, Verdict};
use crate::course::domain::{
    title_keywords, BloomsLevel, CourseRecord, GradingGroup, ModuleRecord, Objective,
};
use std::collections::HashMap;
use tracing::debug;

/// Everything the QM battery reads.
#[derive(Debug, Clone, Copy)]
pub struct CourseFacts<'a> {
    pub record: &'a CourseRecord,
    pub modules: &'a [ModuleRecord],
    pub grading: &'a [GradingGroup],
    pub objectives: &'a [Objective],
}

const UNDECIDED_NOTE: &str = "Insufficient data to evaluate";

/// Runs every QM rule. The result holds one verdict per standard in the
/// configured table; standards without a rule default to needs-review.
pub fn evaluate_qm(facts: &CourseFacts<'_>, config: &EvaluationConfig) -> EvaluationResult {
    let keywords = &config.qm;
    let record = facts.record;
    let pages = record.page_corpus();
    let assignments = record.assignment_corpus();
    let content = format!("{pages} {assignments}");
    let module_count = facts.modules.len();
    let page_named = |table: &[&str]| {
        record
            .published_pages
            .keys()
            .any(|name| mentions(&name.to_lowercase(), table))
    };

    let mut computed: HashMap<&'static str, Verdict> = HashMap::new();

    let has_welcome = page_named(keywords.welcome_pages);
    let has_contact = mentions(&content, keywords.contact);
    computed.insert(
        "1.1",
        Verdict::tiered(
            has_welcome && has_contact,
            "Welcome/overview and instructor info detected",
            has_welcome || has_contact,
            "Welcome page or contact info may be incomplete",
            "No clear overview or instructor info",
        ),
    );

    let has_expectations = mentions(&content, keywords.expectations);
    computed.insert(
        "1.2",
        Verdict::tiered(
            has_expectations && module_count > 0,
            "Expectations and module structure present",
            has_expectations || module_count > 0,
            "Partial expectations found",
            "Learner expectations not clearly articulated",
        ),
    );

    let objective_count = facts.objectives.len();
    computed.insert(
        "2.1",
        Verdict::tiered(
            objective_count >= 3,
            format!("{objective_count} objectives detected"),
            objective_count >= 1,
            format!("Only {objective_count} objective(s) clearly detected"),
            "No objectives detected — likely in external syllabus",
        ),
    );

    computed.insert("2.2", module_objectives(facts, config));

    let verbs = if objective_count == 0 {
        Verdict::new(StandardStatus::NeedsReview, "No objectives to evaluate")
    } else {
        let unclear = facts
            .objectives
            .iter()
            .filter(|objective| objective.blooms == BloomsLevel::Unclear)
            .count();
        Verdict::tiered(
            unclear == 0,
            "All objectives use Bloom's verbs",
            unclear < objective_count / 2,
            format!("{unclear}/{objective_count} lack clear verbs"),
            format!("{unclear}/{objective_count} use vague language"),
        )
    };
    computed.insert("2.3", verbs);

    let has_rubrics = record.settings.rubrics.chars().count() > config.min_rubric_chars;
    let has_assignments = !record.assignments.is_empty();
    computed.insert(
        "3.1",
        Verdict::tiered(
            has_rubrics && has_assignments,
            "Assignments and rubrics both present",
            has_assignments,
            "Assignments found but rubrics minimal",
            "Limited assessment data",
        ),
    );

    let mut task_types = Vec::new();
    if mentions(&assignments, keywords.discussion_tasks) {
        task_types.push("Discussion");
    }
    if !record.assessments.is_empty() {
        task_types.push("Quiz/Assessment");
    }
    if mentions(&assignments, keywords.written_tasks) {
        task_types.push("Written/Reflective");
    }
    if mentions(&assignments, keywords.project_tasks) {
        task_types.push("Project/Creative");
    }
    if mentions(&assignments, keywords.peer_tasks) {
        task_types.push("Peer Activity");
    }
    let listed = task_types.join(", ");
    computed.insert(
        "3.2",
        Verdict::tiered(
            task_types.len() >= 3,
            format!("Types: {listed}"),
            task_types.len() == 2,
            format!("Only: {listed}"),
            "Very limited variety",
        ),
    );

    let media_count = record.media_page_titles.len();
    let content_count = record.published_pages.len();
    computed.insert(
        "4.1",
        Verdict::tiered(
            media_count > 0 && content_count > 0,
            format!("{media_count} media items and {content_count} content pages"),
            content_count > 0,
            "Content pages found but media may be limited",
            "Material alignment unclear",
        ),
    );

    let activity_signals = [
        mentions(&content, keywords.discussion),
        mentions(&content, keywords.reflection),
        mentions(&content, keywords.active_learning),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();
    computed.insert(
        "5.1",
        Verdict::tiered(
            activity_signals >= 3,
            "Discussion, reflection, and active tasks all detected",
            activity_signals == 2,
            "Some active learning present",
            "Limited active learning detected",
        ),
    );

    let has_peer = mentions(&content, keywords.peer_interaction);
    let has_instructor = mentions(&content, keywords.instructor_interaction);
    computed.insert(
        "5.2",
        Verdict::tiered(
            has_peer && has_instructor,
            "Peer and instructor interaction both present",
            has_peer || has_instructor,
            "Some interaction present",
            "No clear interaction opportunities",
        ),
    );

    computed.insert(
        "6.1",
        if mentions(&content, keywords.technology) {
            Verdict::new(StandardStatus::Met, "Technology references found")
        } else {
            Verdict::new(
                StandardStatus::PartiallyMet,
                "Technology requirements may not be clearly stated",
            )
        },
    );

    computed.insert(
        "7.1",
        if mentions(&content, keywords.accessibility) {
            Verdict::new(StandardStatus::Met, "Accessibility language detected")
        } else {
            Verdict::new(
                StandardStatus::PartiallyMet,
                "Accessibility statements may be missing",
            )
        },
    );

    let has_start_page = page_named(keywords.start_pages);
    computed.insert(
        "8.1",
        Verdict::tiered(
            module_count > 0 && has_start_page,
            format!("{module_count} published modules with start page"),
            module_count > 0,
            "Modules found but \"Start Here\" page may be missing",
            "Course navigation unclear",
        ),
    );

    debug!(
        modules = module_count,
        grading_groups = facts.grading.len(),
        objectives = objective_count,
        "evaluated QM standards"
    );

    config
        .standards
        .iter()
        .map(|standard| {
            let verdict = computed
                .remove(standard.id)
                .unwrap_or_else(|| Verdict::new(StandardStatus::NeedsReview, UNDECIDED_NOTE));
            (standard.id.to_string(), verdict)
        })
        .collect()
}

/// Share of modules whose title-matched pages carry objective phrasing.
fn module_objectives(facts: &CourseFacts<'_>, config: &EvaluationConfig) -> Verdict {
    let total = facts.modules.len();
    if total == 0 {
        return Verdict::new(StandardStatus::NeedsReview, "Module structure not parseable");
    }

    let with_objectives = facts
        .modules
        .iter()
        .filter(|module| {
            let words = title_keywords(&module.title);
            facts
                .record
                .published_pages
                .iter()
                .filter(|(name, _)| {
                    let name = name.to_lowercase();
                    words.iter().any(|word| name.contains(word.as_str()))
                })
                .any(|(_, content)| {
                    mentions(&content.to_lowercase(), config.qm.module_objective_phrases)
                })
        })
        .count();

    let share = with_objectives as f64 / total as f64;
    Verdict::tiered(
        share >= 0.7,
        format!("Objectives in ~{with_objectives}/{total} modules"),
        share > 0.0,
        format!("Only ~{with_objectives}/{total} modules have clear objectives"),
        "Module objectives not detected",
    )
}
