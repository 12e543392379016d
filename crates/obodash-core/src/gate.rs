//! SHA-256 change detection deciding whether a namespace is re-evaluated.

use chrono::{DateTime, Duration, Utc};

use crate::models::{ChangeState, OntologyRecord};

/// Decides the change state of a freshly hashed artifact.
///
/// A stale record is only forced when `force_after` is configured and strictly exceeded.
#[must_use]
pub fn evaluate_gate(
    prior_hash: Option<&str>,
    last_processed_at: Option<DateTime<Utc>>,
    new_hash: &str,
    now: DateTime<Utc>,
    force_after: Option<Duration>,
) -> ChangeState {
    match prior_hash {
        Some(prior) if prior == new_hash => {
            let stale = match (force_after, last_processed_at) {
                (Some(limit), Some(at)) => now - at > limit,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if stale {
                ChangeState::StaleForced
            } else {
                ChangeState::Unchanged
            }
        }
        _ => ChangeState::Changed,
    }
}

/// Applies the gate outcome to `record` and returns it.
///
/// A changed artifact clears any previous failure so it is evaluated afresh.
pub fn apply_gate(
    record: &mut OntologyRecord,
    new_hash: &str,
    now: DateTime<Utc>,
    force_after: Option<Duration>,
) -> ChangeState {
    let state = evaluate_gate(
        record.sha256_hash.as_deref(),
        record.last_processed_at,
        new_hash,
        now,
        force_after,
    );
    if state == ChangeState::Changed {
        record.failure = None;
    }
    record.sha256_hash = Some(new_hash.to_string());
    record.changed = state.requires_processing();
    record.change_state = Some(state);
    tracing::debug!(namespace = %record.namespace, state = state.as_str(), "change gate");
    state
}

/// Records that the artifact could not be hashed this run.
pub fn mark_unknown(record: &mut OntologyRecord) {
    record.changed = false;
    record.change_state = Some(ChangeState::Unknown);
}

/// True when the namespace was processed within `window` and should not be downloaded again.
#[must_use]
pub fn within_redownload_window(
    record: &OntologyRecord,
    now: DateTime<Utc>,
    window: Option<Duration>,
) -> bool {
    match (window, record.last_processed_at) {
        (Some(window), Some(at)) => now - at < window,
        _ => false,
    }
}
