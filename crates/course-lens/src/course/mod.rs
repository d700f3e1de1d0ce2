pub mod archive;
pub mod domain;
pub mod evaluation;
pub mod objectives;
pub mod report;
pub mod structure;

use crate::config::AnalysisConfig;
use archive::{ArchiveError, ArchiveReader};
use chrono::NaiveDateTime;
use domain::{CourseIdentity, CourseRecord, GradingGroup, ModuleRecord, Objective, Rubric};
use evaluation::{
    evaluate_qm, evaluate_udl, health_score, CourseFacts, EvaluationConfig, EvaluationResult,
    HealthScore, QmStandard,
};
use objectives::{ComparisonResult, ObjectiveExtractor};
use tracing::info;

/// Every model derived from one course export.
///
/// Built once per invocation and never mutated; nothing is shared between
/// two analyses.
#[derive(Debug, Clone)]
pub struct CourseAnalysis {
    pub record: CourseRecord,
    pub identity: CourseIdentity,
    pub modules: Vec<ModuleRecord>,
    pub grading: Vec<GradingGroup>,
    pub rubrics: Vec<Rubric>,
    pub objectives: Vec<Objective>,
    pub syllabus_objectives: Vec<Objective>,
    pub comparison: ComparisonResult,
    pub qm: EvaluationResult,
    pub udl: EvaluationResult,
    pub health: HealthScore,
    pub standards: &'static [QmStandard],
}

impl CourseAnalysis {
    /// Reads the archive and runs every extractor and evaluator over it.
    ///
    /// Only an unopenable archive fails; every later stage degrades to empty
    /// or placeholder results.
    pub fn run(
        file_name: &str,
        bytes: &[u8],
        syllabus: &str,
        config: &AnalysisConfig,
    ) -> Result<Self, ArchiveError> {
        let archive_policy = config.archive_policy();
        let record = ArchiveReader::new(&archive_policy).read(file_name, bytes, syllabus)?;
        let extractor = ObjectiveExtractor::new(config.objective_policy());
        Ok(Self::from_record(
            record,
            &extractor,
            &EvaluationConfig::standard(),
        ))
    }

    pub fn from_record(
        record: CourseRecord,
        extractor: &ObjectiveExtractor,
        evaluation: &EvaluationConfig,
    ) -> Self {
        let identity = structure::extract_identity(&record);
        let modules = structure::extract_modules(&record);
        let grading = structure::extract_grading(&record);
        let rubrics = structure::extract_rubrics(&record);

        let objectives =
            extractor.extract_objectives(&record.published_pages, &record.assignments, &modules);
        let syllabus_objectives = extractor.extract_syllabus_objectives(&record.syllabus_text);
        let comparison = extractor.compare(&objectives, &syllabus_objectives);
        info!(
            modules = modules.len(),
            grading_groups = grading.len(),
            rubrics = rubrics.len(),
            objectives = objectives.len(),
            syllabus_objectives = syllabus_objectives.len(),
            matched = comparison.matched.len(),
            "extracted course structure"
        );

        let facts = CourseFacts {
            record: &record,
            modules: &modules,
            grading: &grading,
            objectives: &objectives,
        };
        let qm = evaluate_qm(&facts, evaluation);
        let udl = evaluate_udl(&record, evaluation);
        let health = health_score(&qm);
        info!(
            met = health.met,
            not_met = health.not_met,
            total = health.total,
            recommendation = health.recommendation.tier(),
            "evaluated course"
        );

        Self {
            record,
            identity,
            modules,
            grading,
            rubrics,
            objectives,
            syllabus_objectives,
            comparison,
            qm,
            udl,
            health,
            standards: evaluation.standards,
        }
    }

    /// Week labels across all published modules.
    pub fn week_count(&self) -> usize {
        self.modules.iter().map(|module| module.weeks.len()).sum()
    }

    pub fn render_markdown(&self, generated_at: NaiveDateTime) -> String {
        report::render_markdown(self, generated_at)
    }
}
