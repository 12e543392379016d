use super::DashboardScore;
use crate::checks::CheckId;
use crate::config::{ScoreFactor, ScoreWeights};
use crate::models::{LevelCounts, OntologyRecord};
use crate::summary::summarize_recorded;

/// Observed counts feeding the deduction formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeductionCounts {
    pub no_base: u64,
    pub overall: LevelCounts,
    pub report: LevelCounts,
}

impl DeductionCounts {
    #[must_use]
    pub fn from_record(record: &OntologyRecord) -> Self {
        let overall = record.summary.as_ref().map_or_else(
            || summarize_recorded(&record.results).summary_count,
            |summary| summary.summary_count,
        );
        let report = record
            .results
            .get(CheckId::RobotReport.label())
            .and_then(|result| result.results)
            .unwrap_or_default();
        Self {
            no_base: u64::from(record.base_generated),
            overall,
            report,
        }
    }

    fn observed(&self) -> [(ScoreFactor, u64); 7] {
        [
            (ScoreFactor::NoBase, self.no_base),
            (ScoreFactor::OverallError, self.overall.error),
            (ScoreFactor::OverallWarning, self.overall.warn),
            (ScoreFactor::OverallInfo, self.overall.info),
            (ScoreFactor::ReportErrors, self.report.error),
            (ScoreFactor::ReportWarning, self.report.warn),
            (ScoreFactor::ReportInfo, self.report.info),
        ]
    }
}

/// `100 - Σ min(weight × count, max_impact)`; not clamped at zero.
#[must_use]
pub fn deduction_score(counts: &DeductionCounts, weights: &ScoreWeights) -> DashboardScore {
    let deducted = counts
        .observed()
        .into_iter()
        .map(|(factor, count)| {
            (weights.weight(factor) * count as f64).min(weights.max_impact(factor))
        })
        .sum::<f64>();
    DashboardScore::rounded(100.0 - deducted)
}
