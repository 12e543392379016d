use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{CheckStatus, LevelCounts, RecordedResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub status: CheckStatus,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub summary_count: LevelCounts,
}

/// Outcome of the change-detection gate for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeState {
    Unknown,
    Unchanged,
    Changed,
    StaleForced,
}

impl ChangeState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Unchanged => "unchanged",
            Self::Changed => "changed",
            Self::StaleForced => "stale_forced",
        }
    }

    #[must_use]
    pub const fn requires_processing(self) -> bool {
        matches!(self, Self::Changed | Self::StaleForced)
    }
}

/// Terminal per-namespace failure marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    CorruptedResultsFile,
    MissingUrl,
    MissingBaseNamespaces,
    FailedDownload,
    FailedSha256Hash,
    NotAnOntology,
    FailedRobotBase,
    BrokenMetricsFile,
    EmptyOntology,
    InconsistentOntology,
    FailedOntologyDashboard,
    EngineTimeout,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CorruptedResultsFile => "corrupted_results_file",
            Self::MissingUrl => "missing_url",
            Self::MissingBaseNamespaces => "missing_base_namespaces",
            Self::FailedDownload => "failed_download",
            Self::FailedSha256Hash => "failed_sha256_hash",
            Self::NotAnOntology => "not_an_ontology",
            Self::FailedRobotBase => "failed_robot_base",
            Self::BrokenMetricsFile => "broken_metrics_file",
            Self::EmptyOntology => "empty_ontology",
            Self::InconsistentOntology => "inconsistent_ontology",
            Self::FailedOntologyDashboard => "failed_ontology_dashboard",
            Self::EngineTimeout => "engine_timeout",
        }
    }

    /// Human-readable label used on badges and the index page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CorruptedResultsFile => "Corrupted results file",
            Self::MissingUrl => "Missing URL",
            Self::MissingBaseNamespaces => "Missing base namespaces",
            Self::FailedDownload => "Failed download",
            Self::FailedSha256Hash => "Failed hash",
            Self::NotAnOntology => "Not an ontology",
            Self::FailedRobotBase => "Failed base extraction",
            Self::BrokenMetricsFile => "Broken metrics",
            Self::EmptyOntology => "Empty ontology",
            Self::InconsistentOntology => "Inconsistent",
            Self::FailedOntologyDashboard => "Failed dashboard",
            Self::EngineTimeout => "Timeout",
        }
    }

    /// Transient failures are cleared at the start of the next run.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::EngineTimeout)
    }

    /// Failures raised before the artifact is hashed; retried on every run.
    #[must_use]
    pub const fn is_acquisition(self) -> bool {
        matches!(
            self,
            Self::CorruptedResultsFile
                | Self::MissingUrl
                | Self::MissingBaseNamespaces
                | Self::FailedDownload
                | Self::FailedSha256Hash
        )
    }
}

/// Persisted per-namespace dashboard record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyRecord {
    pub namespace: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<String, RecordedResult>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_hash: Option<String>,
    #[serde(default)]
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_state: Option<ChangeState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub base_generated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl OntologyRecord {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            version: None,
            date: None,
            summary: None,
            results: BTreeMap::new(),
            metrics: BTreeMap::new(),
            sha256_hash: None,
            changed: false,
            change_state: None,
            failure: None,
            last_processed_at: None,
            base_generated: false,
            base_prefixes: Vec::new(),
            source_url: None,
            score: None,
        }
    }

    #[must_use]
    pub fn summary_status(&self) -> Option<CheckStatus> {
        self.summary.as_ref().map(|summary| summary.status)
    }

    #[must_use]
    pub fn metric_u64(&self, name: &str) -> Option<u64> {
        self.metrics.get(name).and_then(serde_json::Value::as_u64)
    }

    /// Numeric metric; also reads percentages stored as `"25.00 %"`.
    #[must_use]
    pub fn metric_f64(&self, name: &str) -> Option<f64> {
        match self.metrics.get(name)? {
            serde_json::Value::String(text) => {
                text.trim().trim_end_matches('%').trim_end().parse().ok()
            }
            value => value.as_f64(),
        }
    }

    /// Drops a transient failure so the namespace is retried.
    pub fn clear_transient_failure(&mut self) -> bool {
        match self.failure {
            Some(kind) if kind.is_transient() => {
                self.failure = None;
                true
            }
            _ => false,
        }
    }
}
