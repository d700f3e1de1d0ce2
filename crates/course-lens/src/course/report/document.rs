//! Markdown handoff document for a completed [`CourseAnalysis`].
//!
//! The section layout is fixed so reviewers can navigate any report by
//! section number. Table cells are truncated to fixed widths and never carry
//! a raw `|`.

use super::super::archive::normalizer::truncate_chars;
use super::super::domain::{ItemRecord, ModuleRecord, Objective, ObjectiveType};
use super::super::evaluation::{StandardStatus, UDL_PRINCIPLES};
use super::super::CourseAnalysis;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

const UNPUBLISHED_PAGE_LIMIT: usize = 30;
const CHAIN_ASSIGNMENT_LIMIT: usize = 8;
const OVERVIEW_EXCERPT_CHARS: usize = 500;
const REDESIGN_FLAG_THRESHOLD: usize = 4;
const RULE: &str = "---";

const SYLLABUS_REVIEW_CHECKLIST: &[(&str, &str)] = &[
    ("GS 1.2", "Course description and purpose clearly stated"),
    ("GS 1.3", "Communication expectations and instructor response time"),
    ("GS 1.4", "Late work policy, academic integrity, course policies"),
    ("GS 1.5", "Technology requirements listed"),
    ("GS 2.1", "CLOs present, measurable, and use Bloom's verbs"),
    ("GS 2.4", "Alignment statements connecting activities to CLOs"),
    ("GS 3.2", "Grading criteria clearly explained"),
    ("GS 7.1", "Technical support resources listed"),
    ("GS 7.2", "Accessibility/disability statement present"),
    ("GS 7.3", "Student support services listed"),
];

/// Renders the full review document. `generated_at` is stamped into the
/// identity table and footer.
pub fn render_markdown(analysis: &CourseAnalysis, generated_at: NaiveDateTime) -> String {
    let stamp = generated_at.format("%Y-%m-%d %H:%M").to_string();
    let mut doc = Document::default();

    header(&mut doc, analysis);
    identity_section(&mut doc, analysis, &stamp);
    precheck_section(&mut doc, analysis);
    publish_section(&mut doc, analysis);
    syllabus_section(&mut doc, analysis);
    objectives_section(&mut doc, analysis);
    alignment_section(&mut doc, analysis);
    comparison_section(&mut doc, analysis);
    grading_section(&mut doc, analysis);
    structure_section(&mut doc, analysis);
    assignment_section(&mut doc, analysis);
    assessment_section(&mut doc, analysis);
    rubric_section(&mut doc, analysis);
    materials_section(&mut doc, analysis);
    page_section(&mut doc, analysis);
    flag_section(&mut doc, analysis);
    syllabus_placeholder_section(&mut doc, analysis);
    consultation_prompt(&mut doc, analysis);
    doc.line(RULE);
    doc.line(format!("*Course Analysis Report — Generated {stamp}*"));

    doc.finish()
}

#[derive(Default)]
struct Document {
    lines: Vec<String>,
}

impl Document {
    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Blank line then a horizontal rule, closing a section.
    fn close(&mut self) {
        self.lines([String::new(), RULE.to_string()]);
    }

    fn heading(&mut self, title: &str) {
        self.lines([String::new(), format!("## {title}")]);
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Table-safe text: at most `width` characters with pipes replaced.
fn cell(text: &str, width: usize) -> String {
    truncate_chars(text, width).replace('|', "-")
}

fn with_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn of_kind(objectives: &[Objective], kind: ObjectiveType) -> Vec<&Objective> {
    objectives.iter().filter(|objective| objective.kind == kind).collect()
}

fn is_assessed_item(item: &ItemRecord) -> bool {
    matches!(
        item.content_type.as_str(),
        "Assignment" | "Quiz" | "Quizzes::Quiz" | "Discussion" | "DiscussionTopic"
    )
}

fn assessed_items(module: &ModuleRecord) -> Vec<&str> {
    module
        .items
        .iter()
        .filter(|item| is_assessed_item(item))
        .map(|item| item.title.as_str())
        .collect()
}

fn grading_total(analysis: &CourseAnalysis) -> f64 {
    analysis
        .grading
        .iter()
        .filter_map(|group| group.weight.as_percent())
        .sum()
}

fn weights_off(total: f64) -> bool {
    (total - 100.0).abs() > 1.0
}

fn header(doc: &mut Document, analysis: &CourseAnalysis) {
    let banner = if analysis.record.has_syllabus() {
        "> ✅ Syllabus provided — included in Section 4."
    } else {
        "> ⚠️ **No syllabus was provided with this analysis.** \
Request it at the start of the consultation."
    };
    doc.lines([
        "# Course Analysis Report",
        "> Handoff document for instructional design review",
        "> **This report covers published content only.** \
Unpublished/draft items are noted but not analyzed.",
        "",
        RULE,
        "",
        banner,
        "",
        RULE,
    ]);
}

fn identity_section(doc: &mut Document, analysis: &CourseAnalysis, stamp: &str) {
    let identity = &analysis.identity;
    let stats = &analysis.record.publish_stats;
    doc.heading("SECTION 1: COURSE IDENTITY");
    doc.lines([
        String::new(),
        "| Field | Value |".to_string(),
        "|-------|-------|".to_string(),
        format!("| Course Title | {} |", cell(&identity.title, 120)),
        format!("| Course Code | {} |", cell(&identity.code, 60)),
        format!("| Delivery Mode | {} |", identity.modality.label()),
        format!("| Start Date | {} |", identity.start_date),
        format!("| End Date | {} |", identity.end_date),
        format!("| Published Modules | {} |", analysis.modules.len()),
        format!("| Weeks Detected | {} |", analysis.week_count()),
        format!(
            "| Published Pages | {} (of {} total) |",
            stats.pages_published,
            stats.pages_total()
        ),
        format!(
            "| Published Assignments | {} (of {} total) |",
            stats.assignments_published,
            stats.assignments_total()
        ),
        format!("| Published Quizzes | {} |", stats.assessments_published),
        format!("| Generated | {stamp} |"),
    ]);
    doc.close();
}

fn precheck_section(doc: &mut Document, analysis: &CourseAnalysis) {
    let total = analysis.health.total;
    doc.heading("SECTION 2: AUTOMATED QM / UDL PRE-CHECK");
    doc.lines([
        "> *Based on published content only.*",
        "",
        "### 2A — Quality Matters (QM 7th Edition)",
        "",
        "| Standard | Description | Status | Notes |",
        "|----------|-------------|--------|-------|",
    ]);
    for standard in analysis.standards {
        let (badge, note) = analysis.qm.get(standard.id).map_or_else(
            || (StandardStatus::NeedsReview.badge(), String::new()),
            |verdict| (verdict.status.badge(), cell(&verdict.note, 200)),
        );
        doc.line(format!(
            "| {} | {} | {badge} | {note} |",
            standard.id, standard.description
        ));
    }

    doc.lines([
        "",
        "**Key:** ✅ Met | ⚠️ Partially Met | ❌ Not Met | 🔍 Needs Human Review",
        "",
        "### 2B — UDL Summary",
        "",
        "| Principle | Status | Notes |",
        "|-----------|--------|-------|",
    ]);
    for (id, label) in UDL_PRINCIPLES {
        let (badge, note) = analysis.udl.get(id).map_or_else(
            || (StandardStatus::NeedsReview.badge(), String::new()),
            |verdict| (verdict.status.badge(), cell(&verdict.note, 200)),
        );
        doc.line(format!("| {label} | {badge} | {note} |"));
    }

    let health = &analysis.health;
    doc.lines([
        String::new(),
        "### 2C — Health Score".to_string(),
        String::new(),
        format!("- **Met:** {} / {total}", health.met),
        format!("- **Partially Met:** {} / {total}", health.partially_met),
        format!("- **Not Met:** {} / {total}", health.not_met),
        format!("- **Needs Review:** {} / {total}", health.needs_review),
        format!(
            "- **Recommendation:** {}",
            health.recommendation.summary()
        ),
    ]);
    doc.close();
}

fn publish_section(doc: &mut Document, analysis: &CourseAnalysis) {
    let record = &analysis.record;
    doc.heading("SECTION 3: PUBLISH STATUS SUMMARY");
    doc.lines([
        "> Items below were detected but excluded from analysis.".to_string(),
        String::new(),
        "### Unpublished / Draft Content".to_string(),
        String::new(),
        format!(
            "- **Pages skipped:** {}",
            record.publish_stats.pages_unpublished
        ),
        format!(
            "- **Assignments skipped:** {}",
            record.publish_stats.assignments_unpublished
        ),
    ]);

    if !record.unpublished_assignment_names.is_empty() {
        doc.lines(["", "**Unpublished assignments (not analyzed):**"]);
        for name in &record.unpublished_assignment_names {
            doc.line(format!("  - {name} *(unpublished)*"));
        }
    }

    let pages = &record.unpublished_page_titles;
    if !pages.is_empty() {
        doc.lines(["", "**Unpublished pages (not analyzed):**"]);
        for name in pages.iter().take(UNPUBLISHED_PAGE_LIMIT) {
            doc.line(format!("  - {name} *(unpublished)*"));
        }
        if pages.len() > UNPUBLISHED_PAGE_LIMIT {
            doc.line(format!(
                "  - ... and {} more",
                pages.len() - UNPUBLISHED_PAGE_LIMIT
            ));
        }
    }
    doc.close();
}

fn syllabus_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 4: SYLLABUS");
    doc.blank();
    if analysis.record.has_syllabus() {
        doc.line(analysis.record.syllabus_text.as_str());
    } else {
        doc.lines([
            "*No syllabus was provided with this analysis.*",
            "*Request it at the start of the consultation.*",
        ]);
    }
    doc.close();
}

fn objective_table(doc: &mut Document) {
    doc.lines([
        "| # | Bloom's | Source | Objective |",
        "|---|---------|--------|-----------|",
    ]);
}

fn objectives_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 5: LEARNING OBJECTIVES (COURSE)");
    doc.lines([
        "> Extracted from all published pages and assignment instructions.",
        "> The course is the authority. See Section 5C for comparison against the syllabus.",
        "",
    ]);

    if analysis.objectives.is_empty() {
        doc.line("*No objectives auto-detected in the course. Ask the instructor to provide them.*");
        doc.close();
        return;
    }

    let clos = of_kind(&analysis.objectives, ObjectiveType::Clo);
    let mlos = of_kind(&analysis.objectives, ObjectiveType::Mlo);
    let unclassified = of_kind(&analysis.objectives, ObjectiveType::Unknown);
    doc.lines([
        format!(
            "**{} CLOs | {} MLOs | {} unclassified**",
            clos.len(),
            mlos.len(),
            unclassified.len()
        ),
        String::new(),
        "### Course-Level Objectives (CLOs)".to_string(),
        String::new(),
    ]);
    if clos.is_empty() {
        doc.line("*No CLOs detected in the course. Ask the instructor to provide them.*");
    } else {
        objective_table(doc);
        for (index, objective) in clos.iter().enumerate() {
            doc.line(format!(
                "| CLO-{} | {} | {} | {} |",
                index + 1,
                objective.blooms.label(),
                cell(&objective.source, 35),
                cell(&objective.text, 130)
            ));
        }
    }
    doc.blank();

    doc.lines(["### Module-Level Objectives (MLOs)", ""]);
    if mlos.is_empty() {
        doc.line(
            "*No MLOs detected in the course. Ask the instructor to add module-level objectives.*",
        );
    } else {
        // Unresolved module numbers sort after every numbered module.
        let mut groups: BTreeMap<(bool, u32), Vec<&Objective>> = BTreeMap::new();
        for objective in mlos.iter().copied() {
            let key = (
                objective.module_number.is_none(),
                objective.module_number.unwrap_or(0),
            );
            groups.entry(key).or_default().push(objective);
        }
        for ((unresolved, number), members) in groups {
            let (label, prefix) = if unresolved {
                ("Module — number not detected".to_string(), "?".to_string())
            } else {
                (format!("Module {number}"), number.to_string())
            };
            doc.line(format!("**{label}**"));
            objective_table(doc);
            for (index, objective) in members.iter().enumerate() {
                doc.line(format!(
                    "| MLO-{prefix}.{} | {} | {} | {} |",
                    index + 1,
                    objective.blooms.label(),
                    cell(&objective.source, 30),
                    cell(&objective.text, 130)
                ));
            }
            doc.blank();
        }
    }
    doc.blank();

    if !unclassified.is_empty() {
        doc.lines(["### Unclassified (assign as CLO or MLO)", ""]);
        objective_table(doc);
        for (index, objective) in unclassified.iter().enumerate() {
            doc.line(format!(
                "| {} | {} | {} | {} |",
                index + 1,
                objective.blooms.label(),
                cell(&objective.source, 35),
                cell(&objective.text, 130)
            ));
        }
        doc.blank();
    }
    doc.close();
}

fn alignment_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 5B: ALIGNMENT MATRIX");
    doc.lines([
        "> Maps Course Learning Objectives → Module Learning Objectives → Assignments.",
        "> Built from course content (the authority). Syllabus comparison in Section 5C.",
        "> ⚠️ Auto-generated — verify chains and fill gaps during consultation.",
        "",
    ]);

    if analysis.objectives.is_empty() {
        doc.lines([
            "> ⚠️ No CLOs were auto-detected. The alignment matrix cannot be generated.",
            "> Ask the instructor for course-level objectives and build this matrix",
            "> manually during consultation.",
            "",
            "### Module Structure (objectives pending)",
            "| Module | Assignments Detected |",
            "|--------|---------------------|",
        ]);
        for module in &analysis.modules {
            doc.line(format!(
                "| {} | {} |",
                cell(&module.title, 50),
                assessed_items(module).len()
            ));
        }
        doc.close();
        return;
    }

    let mut clos = of_kind(&analysis.objectives, ObjectiveType::Clo);
    if clos.is_empty() {
        clos = of_kind(&analysis.objectives, ObjectiveType::Unknown);
    }
    if !clos.is_empty() {
        doc.lines([
            "### Course-Level Objectives (CLOs)",
            "| CLO # | Objective | Bloom's Level |",
            "|-------|-----------|--------------|",
        ]);
        for (index, objective) in clos.iter().enumerate() {
            doc.line(format!(
                "| CLO-{} | {} | {} |",
                index + 1,
                cell(&objective.text, 120),
                objective.blooms.label()
            ));
        }
        doc.lines(["", RULE, ""]);
    }

    doc.lines([
        "### Module Alignment Overview",
        "> For each module: detected objectives, assignment count, and alignment gaps.",
        "",
        "| Module | Items | Assignments Found | Objectives Detected | Gap Flag |",
        "|--------|-------|-------------------|---------------------|----------|",
    ]);
    for module in &analysis.modules {
        let assignments = assessed_items(module).len();
        let has_overview = module.items.iter().any(|item| {
            item.content_type == "WikiPage" && item.title.to_lowercase().contains("overview")
        });
        let objective_flag = if has_overview {
            "✅"
        } else {
            "⚠️ No MLO page detected"
        };
        let gap_flag = match (assignments > 0, has_overview) {
            (true, true) => "✅",
            (false, _) => "❌ No assignments",
            (true, false) => "⚠️ No objective page",
        };
        doc.line(format!(
            "| {} | {} | {assignments} | {objective_flag} | {gap_flag} |",
            cell(&module.title, 40),
            module.items.len()
        ));
    }
    doc.blank();

    doc.lines([
        "### Detailed Module-Assignment-Objective Chains",
        "> Each block lists what must be verified for objective alignment.",
        "",
    ]);
    for module in &analysis.modules {
        let assignments = assessed_items(module);
        doc.lines([
            format!("#### {}", module.title),
            format!(
                "**Detected assignments in this module:** {}",
                assignments.len()
            ),
        ]);
        if assignments.is_empty() {
            doc.line("- *No assignments detected in this module*");
        }
        for name in assignments.iter().take(CHAIN_ASSIGNMENT_LIMIT) {
            let points = analysis
                .record
                .assignments
                .get(*name)
                .map_or("?", |assignment| assignment.points.as_str());
            doc.line(format!("- {name} ({points} pts)"));
        }
        doc.lines([
            "",
            "**MLO alignment status:** ⚠️ To be verified — check that each assignment",
            "explicitly states which module objective it addresses.",
            "",
            "**CLO alignment status:** ⚠️ To be verified — confirm chain:",
            "Assignment → MLO → CLO.",
            "",
        ]);
    }
    doc.close();
}

fn comparison_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 5C: COURSE vs SYLLABUS OBJECTIVE COMPARISON");
    doc.lines([
        "> Compares objectives found in the course against the provided syllabus.",
        "> This section is for QM review only — it does not change the course objectives.",
        "> ✅ Matched = same objective found in both | ⚠️ Course only = in course, not in syllabus",
        "> ❌ Syllabus only = stated in syllabus, no matching content found in course",
        "",
    ]);

    if analysis.syllabus_objectives.is_empty() {
        doc.lines([
            "> ℹ️ No syllabus was provided — comparison not possible.",
            "> Request the syllabus and verify objective alignment manually.",
        ]);
        doc.close();
        return;
    }

    let comparison = &analysis.comparison;
    let matched = comparison.matched.len();
    let course_only = comparison.course_only.len();
    let syllabus_only = comparison.syllabus_only.len();
    doc.lines([
        format!(
            "**{matched} matched ✅ | {course_only} course-only ⚠️ | {syllabus_only} syllabus-only ❌ | \
{} total course objectives | {} total syllabus objectives**",
            matched + course_only,
            matched + syllabus_only
        ),
        String::new(),
    ]);
    if comparison.has_mismatch() {
        doc.lines([
            "> ⚠️ **MISMATCH DETECTED** — The course and syllabus do not fully agree on objectives.",
            "> Reconcile this with the instructor. Key QM standards affected: GS 2.1, GS 2.2, GS 2.4.",
            "",
        ]);
    } else {
        doc.lines([
            "> ✅ All course objectives have a corresponding entry in the syllabus.",
            "",
        ]);
    }

    if !comparison.matched.is_empty() {
        doc.lines([
            "### ✅ Matched — In Course and Syllabus",
            "",
            "| Course Objective | Syllabus Version | Bloom's |",
            "|------------------|------------------|---------|",
        ]);
        for pair in &comparison.matched {
            doc.line(format!(
                "| {} | {} | {} |",
                cell(&pair.course.text, 90),
                cell(&pair.syllabus.text, 90),
                pair.course.blooms.label()
            ));
        }
        doc.blank();
    }

    if !comparison.course_only.is_empty() {
        doc.lines([
            "### ⚠️ Course Only — Present in Course, Missing from Syllabus",
            "",
            "| Objective | Bloom's | Source |",
            "|-----------|---------|--------|",
        ]);
        for objective in &comparison.course_only {
            doc.line(format!(
                "| {} | {} | {} |",
                cell(&objective.text, 110),
                objective.blooms.label(),
                cell(&objective.source, 35)
            ));
        }
        doc.lines([
            "",
            "> These objectives exist in the course but are not stated in the syllabus.",
            "> The syllabus should be updated to reflect them (GS 2.1).",
            "",
        ]);
    }

    if !comparison.syllabus_only.is_empty() {
        doc.lines([
            "### ❌ Syllabus Only — Stated in Syllabus, Not Found in Course",
            "",
            "| Objective | Bloom's |",
            "|-----------|---------|",
        ]);
        for objective in &comparison.syllabus_only {
            doc.line(format!(
                "| {} | {} |",
                cell(&objective.text, 120),
                objective.blooms.label()
            ));
        }
        doc.lines([
            "",
            "> These objectives appear in the syllabus but no corresponding content,",
            "> activities, or assessments were found in the course.",
            "> Either the course content is missing, or the syllabus is out of date (GS 2.1, GS 2.4).",
            "",
        ]);
    }

    doc.lines([
        "### QM Standards That Require Syllabus Review",
        "> The following standards cannot be fully evaluated from the course export alone.",
        "",
        "| Standard | What to Check in Syllabus |",
        "|----------|---------------------------|",
    ]);
    for (standard, check) in SYLLABUS_REVIEW_CHECKLIST {
        doc.line(format!("| {standard} | {check} |"));
    }
    doc.blank();
    doc.close();
}

fn grading_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 6: GRADING STRUCTURE");
    doc.lines(["", "| # | Group Name | Weight |", "|---|------------|--------|"]);
    if analysis.grading.is_empty() {
        doc.line("*Not found — ask the instructor for the grading breakdown.*");
        doc.close();
        return;
    }

    for group in &analysis.grading {
        doc.line(format!(
            "| {} | {} | {}% |",
            group.position,
            cell(&group.name, 80),
            group.weight
        ));
    }
    let total = grading_total(analysis);
    doc.line(format!("| | **TOTAL** | **{total:.1}%** |"));
    if weights_off(total) {
        doc.lines([
            String::new(),
            format!("> ⚠️ Weights sum to {total:.1}% — confirm the intended breakdown."),
        ]);
    }
    doc.close();
}

fn structure_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 7: MODULE & WEEK STRUCTURE");
    doc.lines(["> Published modules and items only.", ""]);
    if analysis.modules.is_empty() {
        doc.lines(["*No published modules found.*", RULE]);
        return;
    }

    doc.lines([
        "### Overview",
        "",
        "| Module | Title | Weeks Inside | Published Items |",
        "|--------|-------|--------------|-----------------|",
    ]);
    for module in &analysis.modules {
        let weeks = if module.weeks.is_empty() {
            "No week labels".to_string()
        } else {
            module.weeks.join(", ")
        };
        doc.line(format!(
            "| {} | {} | {} | {} |",
            module.position,
            cell(&module.title, 120),
            cell(&weeks, 200),
            module.items.len()
        ));
    }
    doc.blank();

    for module in &analysis.modules {
        doc.line(format!("### Module {}: {}", module.position, module.title));
        if !module.weeks.is_empty() {
            doc.line(format!("**Weeks:** {}", module.weeks.join(", ")));
        }
        doc.blank();

        if module.items.is_empty() {
            doc.line("*No published items.*");
        }
        for item in &module.items {
            if item.is_week_header {
                doc.line(format!("#### 📅 {}", item.title));
            } else {
                let indent = if item.week.is_some() { "  " } else { "" };
                doc.line(format!(
                    "{indent}- **{}** *(type: {})*",
                    item.title, item.content_type
                ));
            }
        }

        let keywords = module.title_keywords();
        let overview = analysis.record.published_pages.iter().find(|(name, _)| {
            let lowered = name.to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
        });
        if let Some((name, content)) = overview {
            doc.lines([
                String::new(),
                format!("**Overview page — `{name}`:**"),
                String::new(),
                truncate_chars(content, OVERVIEW_EXCERPT_CHARS).to_string(),
                String::new(),
            ]);
        }
        doc.blank();
    }
    doc.line(RULE);
}

fn assignment_section(doc: &mut Document, analysis: &CourseAnalysis) {
    let assignments = &analysis.record.assignments;
    doc.heading("SECTION 8: ASSIGNMENT INVENTORY");
    doc.lines(["> Published assignments only.", ""]);
    if assignments.is_empty() {
        doc.line("*No published assignments found.*");
        doc.close();
        return;
    }

    doc.lines([
        "### Summary",
        "",
        "| Assignment | Points | Due Date | Submission Type |",
        "|------------|--------|----------|-----------------|",
    ]);
    for (name, assignment) in assignments {
        doc.line(format!(
            "| {} | {} | {} | {} |",
            cell(name, 120),
            assignment.points,
            assignment.due_date,
            cell(&assignment.submission_type, 80)
        ));
    }

    doc.lines(["", "### Full Instructions", ""]);
    for (name, assignment) in assignments {
        doc.lines([
            format!("#### {name}"),
            format!(
                "**Points:** {} | **Due:** {} | **Submission:** {}",
                assignment.points, assignment.due_date, assignment.submission_type
            ),
            String::new(),
            assignment.instructions.clone(),
            String::new(),
        ]);
    }
    doc.close();
}

fn assessment_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 9: ASSESSMENTS / QUIZZES");
    doc.lines(["> Published assessments only.", ""]);
    if analysis.record.assessments.is_empty() {
        doc.line("*No published assessments found.*");
    }
    for (name, content) in &analysis.record.assessments {
        doc.lines([format!("### {name}"), String::new(), content.clone(), String::new()]);
    }
    doc.close();
}

fn rubric_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 10: RUBRICS");
    doc.blank();
    if analysis.rubrics.is_empty() {
        doc.line("*No rubrics found. Recommend adding them.*");
    }
    for rubric in &analysis.rubrics {
        doc.line(format!("### {}", rubric.title));
        for criterion in &rubric.criteria {
            doc.line(format!("- {criterion}"));
        }
        doc.blank();
    }
    doc.close();
}

fn materials_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 11: INSTRUCTIONAL MATERIALS");
    doc.lines(["> Published media pages — titles only.", ""]);
    let mut titles: Vec<&String> = analysis.record.media_page_titles.iter().collect();
    titles.sort();
    if titles.is_empty() {
        doc.line("*No media/resource pages identified.*");
    }
    for title in titles {
        doc.line(format!("- {title}"));
    }
    doc.close();
}

fn page_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 12: COURSE PAGE CONTENT");
    doc.lines(["> Full text of published module and course pages.", ""]);
    for (name, content) in &analysis.record.published_pages {
        doc.lines([format!("### {name}"), String::new(), content.clone(), String::new()]);
    }
    doc.close();
}

fn flag_section(doc: &mut Document, analysis: &CourseAnalysis) {
    let record = &analysis.record;
    let stats = &record.publish_stats;
    let mut flags = Vec::new();

    if record.has_syllabus() {
        flags.push(format!(
            "✅ Syllabus provided ({} chars) — included in Section 4",
            with_thousands(record.syllabus_text.chars().count())
        ));
    } else {
        flags.push(
            "⚠️ No syllabus provided — request it at the start of consultation".to_string(),
        );
    }
    if analysis.objectives.is_empty() {
        flags.push("⚠️ No objectives auto-detected — likely in external syllabus".to_string());
    }
    if analysis.grading.is_empty() {
        flags.push("⚠️ Grading structure not found".to_string());
    } else {
        let total = grading_total(analysis);
        if weights_off(total) {
            flags.push(format!("⚠️ Grading weights sum to {total:.1}%"));
        }
    }
    if analysis.rubrics.is_empty() {
        flags.push("⚠️ No rubrics found — recommend adding them".to_string());
    }
    if analysis.modules.is_empty() {
        flags.push("⚠️ No published modules found".to_string());
    }
    if stats.assignments_unpublished > 0 {
        flags.push(format!(
            "ℹ️ {} unpublished assignment(s) excluded from analysis",
            stats.assignments_unpublished
        ));
    }
    if stats.pages_unpublished > 0 {
        flags.push(format!(
            "ℹ️ {} unpublished page(s) excluded from analysis",
            stats.pages_unpublished
        ));
    }
    if analysis.health.not_met >= REDESIGN_FLAG_THRESHOLD {
        flags.push("🔴 Multiple QM standards not met — full redesign recommended".to_string());
    }

    doc.heading("SECTION 13: AGENT FLAGS");
    doc.blank();
    if flags.is_empty() {
        doc.line("✅ No critical flags.");
    }
    doc.lines(flags);
    doc.close();
}

fn syllabus_placeholder_section(doc: &mut Document, analysis: &CourseAnalysis) {
    doc.heading("SECTION 14: SYLLABUS (INSTRUCTOR PROVIDED)");
    doc.lines([
        "> Syllabus is provided here for use during QM consultation.",
        "> Include: course description, learning objectives, grading breakdown,",
        "> policies, and schedule.",
        "",
        RULE,
        "",
    ]);
    if analysis.record.has_syllabus() {
        doc.lines(["*(Syllabus was provided with this analysis — see Section 4.)*", ""]);
    } else {
        doc.lines([
            "**Paste the complete syllabus text here if requested:**",
            "",
            "*[REPLACE THIS LINE WITH YOUR SYLLABUS CONTENT]*",
            "",
        ]);
    }
    doc.close();
}

fn consultation_prompt(doc: &mut Document, analysis: &CourseAnalysis) {
    let reconcile = if analysis.record.has_syllabus() {
        "   - Mismatches are flagged in Section 5C. Reconcile with the instructor before building the Blueprint."
    } else {
        "   - No syllabus provided. Request it so Section 5C comparison can be completed."
    };

    doc.heading("─── CONSULTATION PROMPT ───");
    doc.lines([
        "> Copy this entire document plus the prompt below into your review assistant.",
        "",
        "```",
        "You are a warm, expert instructional design consultant grounded in",
        "L. Dee Fink's Designing Courses for Significant Learning, the Quality Matters",
        "Rubric, and Universal Design for Learning principles.",
        "",
        "Review the course analysis above. Key sections:",
        "- Section 2:  Automated QM/UDL pre-check results",
        "- Section 3:  Publish status (unpublished items excluded from analysis)",
        "- Section 4:  Syllabus content (if provided)",
        "- Section 5:  Auto-detected learning objectives",
        "- Section 5B: Alignment matrix — CLOs → MLOs → Assignments",
        "- Section 7:  Module and week structure",
        "- Section 8:  Assignment inventory",
        "- Section 13: Agent flags",
        "- Section 14: Instructor-provided syllabus (check here first if Section 4 is empty)",
        "",
        "YOUR PRIORITIES (in order):",
        "",
        "1. OBJECTIVE ALIGNMENT — The course is the authority, not the syllabus.",
        "   - Section 5 shows CLOs and MLOs extracted from all published pages and assignment instructions.",
        "   - Section 5C compares those course objectives against the syllabus.",
        reconcile,
        "   Do not build the Blueprint until objectives are reconciled.",
        "2. ALIGNMENT — QM 2.4 and 2.5 are the backbone of a certifiable course.",
        "   Section 5B shows a preliminary alignment matrix. Your job is to:",
        "   a) Verify or construct the full CLO list from the syllabus",
        "   b) Check every module for stated MLOs and confirm they are measurable",
        "   c) Confirm every assignment traces back to at least one MLO and one CLO",
        "   d) Flag any broken chains: assignment with no MLO, MLO with no CLO, CLO with no assessment",
        "   e) Note any CLOs that are only assessed in one module (coverage gap)",
        "",
        "3. ASSESSMENT ALIGNMENT — For each assignment, verify:",
        "   - Does the submission type match the stated learning outcome?",
        "   - Is there a rubric? Does the rubric criteria map to the MLO?",
        "   - Is the point value proportional to the cognitive demand?",
        "",
        "4. QM STANDARDS — Work through all 8 General Standards.",
        "   Section 2 gives you the automated pre-check. Use it as a starting point,",
        "   not the final word. The automated engine cannot read context or intent.",
        "",
        "IMPORTANT CONTEXT:",
        "- This report covers PUBLISHED content only. Unpublished items are in Section 3.",
    ]);
    doc.lines([
        format!(
            "- {} published modules | {} detected week labels.",
            analysis.modules.len(),
            analysis.week_count()
        ),
        format!(
            "- {} course objectives auto-detected.",
            analysis.objectives.len()
        ),
        format!(
            "- Automated recommendation: {}",
            analysis.health.recommendation.summary()
        ),
    ]);
    doc.lines([
        "",
        "BEGIN by reading Section 14 (instructor syllabus) and Section 5B (alignment matrix).",
        "Then greet the instructor warmly, confirm your understanding of the course,",
        "and ask your first clarifying question.",
        "",
        "When consultation is complete, produce the Course Blueprint Document.",
        "```",
        "",
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::domain::{
        AssignmentRecord, BloomsLevel, CourseRecord, PublishStats, SettingsBlobs,
    };
    use crate::course::evaluation::EvaluationConfig;
    use crate::course::objectives::ObjectiveExtractor;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .expect("valid timestamp")
    }

    fn analyze(record: CourseRecord) -> CourseAnalysis {
        CourseAnalysis::from_record(
            record,
            &ObjectiveExtractor::default(),
            &EvaluationConfig::standard(),
        )
    }

    fn objective(text: &str, kind: ObjectiveType, module_number: Option<u32>) -> Objective {
        Objective {
            text: text.to_string(),
            blooms: BloomsLevel::Analyze,
            source: "module-1-overview".to_string(),
            kind,
            module_number,
        }
    }

    #[test]
    fn precheck_keeps_edition_heading_and_human_review_wording() {
        let document = analyze(CourseRecord::default()).render_markdown(generated_at());

        assert!(document.contains("### 2A — Quality Matters (QM 7th Edition)"));
        assert!(document.contains("| 🔍 Needs Human Review | No objectives to evaluate |"));
        assert!(document
            .contains("**Key:** ✅ Met | ⚠️ Partially Met | ❌ Not Met | 🔍 Needs Human Review"));
        assert!(document.contains("- **Needs Review:** "));
    }

    #[test]
    fn empty_course_renders_every_section_with_placeholders() {
        let document = analyze(CourseRecord::default()).render_markdown(generated_at());

        for heading in [
            "## SECTION 1: COURSE IDENTITY",
            "## SECTION 2: AUTOMATED QM / UDL PRE-CHECK",
            "## SECTION 3: PUBLISH STATUS SUMMARY",
            "## SECTION 4: SYLLABUS",
            "## SECTION 5: LEARNING OBJECTIVES (COURSE)",
            "## SECTION 5B: ALIGNMENT MATRIX",
            "## SECTION 5C: COURSE vs SYLLABUS OBJECTIVE COMPARISON",
            "## SECTION 6: GRADING STRUCTURE",
            "## SECTION 7: MODULE & WEEK STRUCTURE",
            "## SECTION 8: ASSIGNMENT INVENTORY",
            "## SECTION 9: ASSESSMENTS / QUIZZES",
            "## SECTION 10: RUBRICS",
            "## SECTION 11: INSTRUCTIONAL MATERIALS",
            "## SECTION 12: COURSE PAGE CONTENT",
            "## SECTION 13: AGENT FLAGS",
            "## SECTION 14: SYLLABUS (INSTRUCTOR PROVIDED)",
        ] {
            assert!(document.contains(heading), "missing {heading}");
        }
        assert!(document.contains("**No syllabus was provided with this analysis.**"));
        assert!(document.contains("comparison not possible"));
        assert!(document.contains("| Generated | 2026-01-05 09:30 |"));
        assert!(document.contains("| Course Title | Unknown |"));
        assert!(document.contains("⚠️ Grading structure not found"));
        assert!(document.contains("🔴 Multiple QM standards not met"));
        assert!(document.ends_with("*Course Analysis Report — Generated 2026-01-05 09:30*"));
    }

    #[test]
    fn rendering_is_deterministic_for_a_fixed_timestamp() {
        let analysis = analyze(CourseRecord::default());
        assert_eq!(
            analysis.render_markdown(generated_at()),
            analysis.render_markdown(generated_at())
        );
    }

    #[test]
    fn qm_table_follows_standard_order() {
        let document = analyze(CourseRecord::default()).render_markdown(generated_at());
        let first = document.find("| 1.1 |").expect("1.1 row");
        let last = document.find("| 8.1 |").expect("8.1 row");
        assert!(first < last);
        assert!(document.contains("- **Met:** 0 / 13"));
    }

    #[test]
    fn unpublished_pages_are_capped() {
        let record = CourseRecord {
            unpublished_page_titles: (1..=35).map(|index| format!("draft-{index}")).collect(),
            publish_stats: PublishStats {
                pages_unpublished: 35,
                ..PublishStats::default()
            },
            ..CourseRecord::default()
        };
        let document = analyze(record).render_markdown(generated_at());
        assert!(document.contains("  - draft-30 *(unpublished)*"));
        assert!(!document.contains("draft-31"));
        assert!(document.contains("  - ... and 5 more"));
        assert!(document.contains("ℹ️ 35 unpublished page(s) excluded from analysis"));
    }

    #[test]
    fn grading_total_warns_when_weights_drift() {
        let record = CourseRecord {
            settings: SettingsBlobs {
                assignment_groups: "<assignmentGroups>\
<assignmentGroup identifier=\"g1\"><title>Essays | Papers</title><position>1</position><group_weight>60</group_weight></assignmentGroup>\
<assignmentGroup identifier=\"g2\"><title>Quizzes</title><position>2</position><group_weight>30</group_weight></assignmentGroup>\
</assignmentGroups>"
                    .to_string(),
                ..SettingsBlobs::default()
            },
            ..CourseRecord::default()
        };
        let document = analyze(record).render_markdown(generated_at());
        assert!(document.contains("| 1 | Essays - Papers | 60.0% |"));
        assert!(document.contains("| | **TOTAL** | **90.0%** |"));
        assert!(document.contains("> ⚠️ Weights sum to 90.0%"));
        assert!(document.contains("⚠️ Grading weights sum to 90.0%"));
    }

    #[test]
    fn mlo_groups_put_unresolved_modules_last() {
        let mut analysis = analyze(CourseRecord::default());
        analysis.objectives = vec![
            objective("Explain the | pipe-bearing statement clearly", ObjectiveType::Mlo, None),
            objective("Analyze the second module case study", ObjectiveType::Mlo, Some(2)),
            objective("Analyze the first module case study", ObjectiveType::Mlo, Some(1)),
            objective("Evaluate frameworks across the whole course", ObjectiveType::Clo, None),
        ];
        let document = analysis.render_markdown(generated_at());

        assert!(document.contains("**1 CLOs | 3 MLOs | 0 unclassified**"));
        let first = document.find("**Module 1**").expect("module 1 group");
        let second = document.find("**Module 2**").expect("module 2 group");
        let unresolved = document
            .find("**Module — number not detected**")
            .expect("unresolved group");
        assert!(first < second && second < unresolved);
        assert!(document.contains("| MLO-?.1 | Analyze |"));
        assert!(document.contains("Explain the - pipe-bearing statement clearly"));
        assert!(document.contains("| CLO-1 | Evaluate frameworks across the whole course | Analyze |"));
    }

    #[test]
    fn alignment_chains_list_assessed_items_with_points() {
        let module_meta = r#"<modules><module identifier="m1"><title>Module 1: Overview of Ethics</title>
<workflow_state>active</workflow_state><position>1</position><items>
<item identifier="i1"><content_type>WikiPage</content_type><title>Module 1 Overview</title></item>
<item identifier="i2"><content_type>Assignment</content_type><title>Case Brief</title></item>
<item identifier="i3"><content_type>DiscussionTopic</content_type><title>Debate Thread</title></item>
</items></module></modules>"#;
        let mut record = CourseRecord {
            settings: SettingsBlobs {
                module_meta: module_meta.to_string(),
                ..SettingsBlobs::default()
            },
            ..CourseRecord::default()
        };
        record.assignments.insert(
            "Case Brief".to_string(),
            AssignmentRecord {
                instructions: "Brief the assigned case.".to_string(),
                due_date: "Not set".to_string(),
                points: "25".to_string(),
                submission_type: "online_upload".to_string(),
                folder_id: "case-brief".to_string(),
            },
        );
        let mut analysis = analyze(record);
        analysis.objectives = vec![objective(
            "Evaluate frameworks across the whole course",
            ObjectiveType::Clo,
            None,
        )];
        let document = analysis.render_markdown(generated_at());

        assert!(document.contains("| Module 1: Overview of Ethics | 3 | 2 | ✅ | ✅ |"));
        assert!(document.contains("- Case Brief (25 pts)"));
        assert!(document.contains("- Debate Thread (? pts)"));
        assert!(document.contains("| Case Brief | 25 | Not set | online_upload |"));
    }

    #[test]
    fn syllabus_banner_and_thousands_separator() {
        let record = CourseRecord {
            syllabus_text: "x".repeat(1_234),
            ..CourseRecord::default()
        };
        let document = analyze(record).render_markdown(generated_at());
        assert!(document.contains("> ✅ Syllabus provided — included in Section 4."));
        assert!(document.contains("✅ Syllabus provided (1,234 chars)"));
        assert!(document.contains("*(Syllabus was provided with this analysis — see Section 4.)*"));
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1_000_000), "1,000,000");
    }
}
