use super::super::domain::{Objective, ObjectiveType};
use super::super::evaluation::{EvaluationResult, Verdict, UDL_PRINCIPLES};
use super::super::CourseAnalysis;
use super::views::{AnalysisSummary, ComparisonCounts, HealthView, ObjectiveCounts, VerdictRow};

impl CourseAnalysis {
    pub fn summary(&self) -> AnalysisSummary {
        let qm = verdict_rows(&self.qm, |id| self.standard_description(id));
        let udl = verdict_rows(&self.udl, |id| {
            UDL_PRINCIPLES
                .iter()
                .find(|(key, _)| *key == id)
                .map_or("", |(_, label)| *label)
        });

        let comparison = (!self.syllabus_objectives.is_empty()).then(|| ComparisonCounts {
            matched: self.comparison.matched.len(),
            course_only: self.comparison.course_only.len(),
            syllabus_only: self.comparison.syllabus_only.len(),
            has_mismatch: self.comparison.has_mismatch(),
        });

        AnalysisSummary {
            file_name: self.record.file_name.clone(),
            identity: self.identity.clone(),
            modality_label: self.identity.modality.label(),
            publish: self.record.publish_stats,
            module_count: self.modules.len(),
            week_count: self.week_count(),
            grading_group_count: self.grading.len(),
            rubric_count: self.rubrics.len(),
            syllabus_provided: self.record.has_syllabus(),
            objectives: ObjectiveCounts {
                clo: count_kind(&self.objectives, ObjectiveType::Clo),
                mlo: count_kind(&self.objectives, ObjectiveType::Mlo),
                unclassified: count_kind(&self.objectives, ObjectiveType::Unknown),
                syllabus: self.syllabus_objectives.len(),
            },
            comparison,
            qm,
            udl,
            health: HealthView {
                score: self.health,
                recommendation_summary: self.health.recommendation.summary(),
            },
        }
    }

    pub(crate) fn standard_description(&self, id: &str) -> &'static str {
        self.standards
            .iter()
            .find(|standard| standard.id == id)
            .map_or("", |standard| standard.description)
    }
}

fn verdict_rows(
    result: &EvaluationResult,
    describe: impl Fn(&str) -> &'static str,
) -> Vec<VerdictRow> {
    result
        .iter()
        .map(|(id, verdict)| to_row(id, describe(id), verdict))
        .collect()
}

fn to_row(id: &str, description: &'static str, verdict: &Verdict) -> VerdictRow {
    VerdictRow {
        id: id.to_string(),
        description,
        status: verdict.status,
        status_label: verdict.status.label(),
        note: verdict.note.clone(),
    }
}

fn count_kind(objectives: &[Objective], kind: ObjectiveType) -> usize {
    objectives
        .iter()
        .filter(|objective| objective.kind == kind)
        .count()
}

#[cfg(test)]
mod tests {
    use crate::course::domain::CourseRecord;
    use crate::course::evaluation::EvaluationConfig;
    use crate::course::objectives::ObjectiveExtractor;
    use crate::course::CourseAnalysis;

    fn analyze(record: CourseRecord) -> CourseAnalysis {
        CourseAnalysis::from_record(
            record,
            &ObjectiveExtractor::default(),
            &EvaluationConfig::standard(),
        )
    }

    #[test]
    fn empty_record_summarizes_without_comparison() {
        let summary = analyze(CourseRecord::default()).summary();
        assert_eq!(summary.qm.len(), 13);
        assert_eq!(summary.qm[0].id, "1.1");
        assert_eq!(summary.qm[0].description, "Course Overview & Introduction present");
        assert_eq!(summary.udl.len(), 3);
        assert_eq!(summary.udl[2].description, "Multiple Means of Action & Expression");
        assert!(summary.comparison.is_none());
        assert!(!summary.syllabus_provided);
        assert_eq!(summary.objectives.course_total(), 0);

        let json = serde_json::to_value(&summary).expect("summary serializes");
        assert!(json.get("comparison").is_none());
        assert_eq!(json["health"]["total"], 13);
        assert_eq!(json["identity"]["title"], "Unknown");
    }

    #[test]
    fn syllabus_objectives_enable_comparison_counts() {
        let record = CourseRecord {
            syllabus_text: "Course Objectives:\n\
1. Analyze ethical dilemmas using multiple philosophical frameworks\n\
2. Evaluate competing arguments about justice in contemporary society"
                .to_string(),
            ..CourseRecord::default()
        };
        let summary = analyze(record).summary();
        let comparison = summary.comparison.expect("syllabus objectives found");
        assert_eq!(summary.objectives.syllabus, 2);
        assert_eq!(comparison.matched, 0);
        assert_eq!(comparison.syllabus_only, 2);
        assert!(comparison.has_mismatch);
    }
}
