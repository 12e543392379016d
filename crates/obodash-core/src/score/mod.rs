//! Dashboard score strategies and the composite OBO score.

use std::fmt;

use crate::config::{CompositeMode, ScoreWeights, ScoringStrategy};
use crate::models::{MetricName, OntologyRecord};

mod category;
mod composite;
mod deduction;

#[cfg(test)]
mod tests;

pub use category::category_fraction_score;
pub use composite::{
    CompositeInputs, OboScore, compute_obo_score, external_impact, impact_fraction,
};
pub use deduction::{DeductionCounts, deduction_score};

/// Dashboard score rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DashboardScore(f64);

impl DashboardScore {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub fn rounded(raw: f64) -> Self {
        Self(round_to(raw, 2))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DashboardScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

pub trait DashboardScorer {
    fn score(&self, record: &OntologyRecord, weights: &ScoreWeights) -> DashboardScore;
}

impl DashboardScorer for ScoringStrategy {
    fn score(&self, record: &OntologyRecord, weights: &ScoreWeights) -> DashboardScore {
        if record.failure.is_some() {
            return DashboardScore::ZERO;
        }
        match self {
            Self::Deduction => deduction_score(&DeductionCounts::from_record(record), weights),
            Self::Category => category_fraction_score(record),
        }
    }
}

/// Dashboard score plus composite OBO score for one record; failed records score 0.
#[must_use]
pub fn score_record(
    record: &OntologyRecord,
    strategy: ScoringStrategy,
    weights: &ScoreWeights,
    mode: CompositeMode,
    impact: f64,
    external_usages: usize,
) -> (DashboardScore, OboScore) {
    let dashboard = strategy.score(record, weights);
    if record.failure.is_some() {
        return (dashboard, OboScore::failed(weights, mode));
    }
    let reuse = record
        .metric_f64(MetricName::EntitiesReused.as_str())
        .unwrap_or(0.0)
        / 100.0;
    let inputs = CompositeInputs {
        impact,
        dashboard: dashboard.value() / 100.0,
        reuse,
        impact_external: external_impact(external_usages),
    };
    (dashboard, compute_obo_score(&inputs, weights, mode))
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // Avoid persisting `-0.0`.
    if rounded == 0.0 { 0.0 } else { rounded }
}
