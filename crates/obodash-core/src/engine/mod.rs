//! Narrow interface to the external ontology-processing engine.
//!
//! The pipeline only sees handles, measurement bundles and lint reports; parsing,
//! reasoning and rule execution stay inside the engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::models::MetricsBundle;

mod header;
mod lint;
mod robot;

pub use header::{OntologyHeader, scan_ontology_header};
pub use lint::{LintReport, LintRow, truncate_report_rows};
pub use robot::RobotEngine;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout {
        operation: String,
        after: Duration,
    },

    #[error("{operation} failed: {detail}")]
    Failed { operation: String, detail: String },

    #[error("{operation} blocked: {reason}")]
    Blocked { operation: String, reason: String },

    #[error("unreadable engine output {path}: {detail}")]
    UnreadableOutput { path: PathBuf, detail: String },
}

impl EngineError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A loaded ontology artifact, owned by one namespace's scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyHandle {
    pub namespace: String,
    pub path: PathBuf,
    pub version_iri: Option<String>,
    pub syntax: Option<String>,
}

impl OntologyHandle {
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

pub trait OntologyEngine {
    fn load(&self, namespace: &str, source: &Path) -> EngineResult<OntologyHandle>;

    /// Metrics from one engine pass; logical consistency is `MetricsBundle::consistent`.
    fn compute_metrics(
        &self,
        handle: &OntologyHandle,
        prefix_map: &BTreeMap<String, String>,
    ) -> EngineResult<MetricsBundle>;

    fn extract_base_subset(
        &self,
        handle: &OntologyHandle,
        base_namespaces: &[String],
    ) -> EngineResult<OntologyHandle>;

    /// `Ok(None)` means the report could not be produced; callers degrade, not fail.
    fn run_lint_report(
        &self,
        handle: &OntologyHandle,
        profile: &Path,
    ) -> EngineResult<Option<LintReport>>;
}
