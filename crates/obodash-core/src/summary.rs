use std::collections::BTreeMap;

use crate::models::{CheckResult, CheckStatus, LevelCounts, RecordedResult, Summary};

/// Folds statuses into the record summary. Precedence: ERROR > WARN > INFO > PASS.
#[must_use]
pub fn aggregate(statuses: impl IntoIterator<Item = CheckStatus>) -> Summary {
    let mut counts = LevelCounts::default();
    for status in statuses {
        match status {
            CheckStatus::Error => counts.error += 1,
            CheckStatus::Warn => counts.warn += 1,
            CheckStatus::Info => counts.info += 1,
            CheckStatus::Pass => {}
        }
    }

    let (status, comment) = if counts.error > 0 {
        (CheckStatus::Error, format!("{} errors", counts.error))
    } else if counts.warn > 0 {
        (CheckStatus::Warn, format!("{} warnings", counts.warn))
    } else if counts.info > 0 {
        (CheckStatus::Info, format!("{} info messages", counts.info))
    } else {
        (CheckStatus::Pass, String::new())
    };

    Summary {
        status,
        comment,
        summary_count: counts,
    }
}

#[must_use]
pub fn summarize_results(results: &BTreeMap<String, CheckResult>) -> Summary {
    aggregate(results.values().map(|result| result.status))
}

/// Same as [`summarize_results`] for persisted results; unrecognized statuses are skipped.
#[must_use]
pub fn summarize_recorded(results: &BTreeMap<String, RecordedResult>) -> Summary {
    aggregate(results.iter().filter_map(|(check, result)| {
        let known = result.status.known();
        if known.is_none() {
            tracing::warn!(check, status = result.status.label(), "unknown status ignored in summary");
        }
        known
    }))
}
