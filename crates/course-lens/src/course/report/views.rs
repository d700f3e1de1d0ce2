use super::super::domain::{CourseIdentity, PublishStats};
use super::super::evaluation::{HealthScore, StandardStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct VerdictRow {
    pub id: String,
    pub description: &'static str,
    pub status: StandardStatus,
    pub status_label: &'static str,
    pub note: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ObjectiveCounts {
    pub clo: usize,
    pub mlo: usize,
    pub unclassified: usize,
    pub syllabus: usize,
}

impl ObjectiveCounts {
    pub fn course_total(&self) -> usize {
        self.clo + self.mlo + self.unclassified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonCounts {
    pub matched: usize,
    pub course_only: usize,
    pub syllabus_only: usize,
    pub has_mismatch: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthView {
    #[serde(flatten)]
    pub score: HealthScore,
    pub recommendation_summary: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub file_name: String,
    pub identity: CourseIdentity,
    pub modality_label: &'static str,
    pub publish: PublishStats,
    pub module_count: usize,
    pub week_count: usize,
    pub grading_group_count: usize,
    pub rubric_count: usize,
    pub syllabus_provided: bool,
    pub objectives: ObjectiveCounts,
    /// Absent when no syllabus objectives were found to compare against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonCounts>,
    pub qm: Vec<VerdictRow>,
    pub udl: Vec<VerdictRow>,
    pub health: HealthView,
}
