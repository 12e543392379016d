use super::DashboardScore;
use crate::models::{CheckStatus, OntologyRecord};

/// Share of passing categories, one extra category standing for a published base.
///
/// Each of the `k + 1` categories is worth `100 / (k + 1)`: ERROR loses all of it, WARN a
/// third, INFO a tenth. With no results the base category is the whole score. A failed
/// record or an unrecognized status scores 0.
#[must_use]
pub fn category_fraction_score(record: &OntologyRecord) -> DashboardScore {
    if record.failure.is_some() {
        return DashboardScore::ZERO;
    }
    let per_category = 100.0 / (record.results.len() + 1) as f64;

    let mut score = 100.0;
    for (check, result) in &record.results {
        score -= match result.status.known() {
            Some(CheckStatus::Error) => per_category,
            Some(CheckStatus::Warn) => per_category / 3.0,
            Some(CheckStatus::Info) => per_category / 10.0,
            Some(CheckStatus::Pass) => 0.0,
            None => {
                tracing::warn!(
                    namespace = %record.namespace,
                    check,
                    status = result.status.label(),
                    "unrecognized status, category score is 0"
                );
                return DashboardScore::ZERO;
            }
        };
    }
    if record.base_generated {
        score -= per_category;
    }
    DashboardScore::rounded(score.max(0.0))
}
