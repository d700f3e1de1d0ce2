use super::{EvaluationResult, StandardStatus};
use serde::Serialize;

/// Overall design recommendation derived from the QM verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Pass,
    Review,
    Redesign,
}

impl Recommendation {
    pub const fn tier(self) -> &'static str {
        match self {
            Recommendation::Pass => "PASS",
            Recommendation::Review => "REVIEW",
            Recommendation::Redesign => "REDESIGN",
        }
    }

    pub const fn summary(self) -> &'static str {
        match self {
            Recommendation::Pass => {
                "PASS — This course is in strong shape. Targeted refinements only."
            }
            Recommendation::Review => "REVIEW — Good foundation with targeted areas to improve.",
            Recommendation::Redesign => {
                "REDESIGN — Significant alignment and design work recommended."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthScore {
    pub met: usize,
    pub partially_met: usize,
    pub not_met: usize,
    pub needs_review: usize,
    pub total: usize,
    pub recommendation: Recommendation,
}

/// Aggregates QM verdicts into counts and a recommendation tier.
///
/// Tiers are checked in order: PASS needs at least 75% met and nothing
/// unmet; REVIEW allows up to two unmet with at least half met.
pub fn health_score(qm: &EvaluationResult) -> HealthScore {
    let met = qm.count(StandardStatus::Met);
    let not_met = qm.count(StandardStatus::NotMet);
    let total = qm.len();
    let met_share = |fraction: f64| met as f64 >= total as f64 * fraction;

    let recommendation = if met_share(0.75) && not_met == 0 {
        Recommendation::Pass
    } else if not_met <= 2 && met_share(0.5) {
        Recommendation::Review
    } else {
        Recommendation::Redesign
    };

    HealthScore {
        met,
        partially_met: qm.count(StandardStatus::PartiallyMet),
        not_met,
        needs_review: qm.count(StandardStatus::NeedsReview),
        total,
        recommendation,
    }
}
