mod config;
mod policy;
mod rules;
mod udl;

pub use config::{EvaluationConfig, QmKeywords, QmStandard, UdlKeywords, QM_STANDARDS, UDL_PRINCIPLES};
pub use policy::{health_score, HealthScore, Recommendation};
pub use rules::{evaluate_qm, CourseFacts};
pub use udl::evaluate_udl;

use indexmap::IndexMap;
use serde::Serialize;

/// Outcome tier for one standard or principle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardStatus {
    Met,
    PartiallyMet,
    NotMet,
    NeedsReview,
}

impl StandardStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Met => "Met",
            Self::PartiallyMet => "Partially Met",
            Self::NotMet => "Not Met",
            Self::NeedsReview => "Needs Human Review",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Met => "✅",
            Self::PartiallyMet => "⚠️",
            Self::NotMet => "❌",
            Self::NeedsReview => "🔍",
        }
    }

    /// Symbol and label, as shown in report tables.
    pub fn badge(self) -> String {
        format!("{} {}", self.symbol(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub status: StandardStatus,
    pub note: String,
}

impl Verdict {
    pub fn new(status: StandardStatus, note: impl Into<String>) -> Self {
        Self {
            status,
            note: note.into(),
        }
    }

    /// Met, partially met, or not met, decided in that order.
    pub(crate) fn tiered(
        met: bool,
        met_note: impl Into<String>,
        partial: bool,
        partial_note: impl Into<String>,
        not_met_note: impl Into<String>,
    ) -> Self {
        if met {
            Self::new(StandardStatus::Met, met_note)
        } else if partial {
            Self::new(StandardStatus::PartiallyMet, partial_note)
        } else {
            Self::new(StandardStatus::NotMet, not_met_note)
        }
    }
}

/// Verdicts keyed by standard or principle id, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvaluationResult {
    verdicts: IndexMap<String, Verdict>,
}

impl EvaluationResult {
    pub(crate) fn insert(&mut self, id: &str, verdict: Verdict) {
        self.verdicts.insert(id.to_string(), verdict);
    }

    pub fn get(&self, id: &str) -> Option<&Verdict> {
        self.verdicts.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Verdict)> {
        self.verdicts.iter().map(|(id, verdict)| (id.as_str(), verdict))
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn count(&self, status: StandardStatus) -> usize {
        self.verdicts
            .values()
            .filter(|verdict| verdict.status == status)
            .count()
    }
}

impl FromIterator<(String, Verdict)> for EvaluationResult {
    fn from_iter<I: IntoIterator<Item = (String, Verdict)>>(iter: I) -> Self {
        Self {
            verdicts: iter.into_iter().collect(),
        }
    }
}
