use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{DashError, Result};
use crate::models::{Badge, OntologyRecord};

pub const RECORD_FILE: &str = "dashboard.yml";
pub const QC_BADGE_FILE: &str = "dashboard-qc-badge.json";
pub const SCORE_BADGE_FILE: &str = "dashboard-score-badge.json";
pub const REPORT_TSV_FILE: &str = "robot_report.tsv";
pub const RESULTS_YAML_FILE: &str = "dashboard-results.yml";
pub const RESULTS_JSON_FILE: &str = "dashboard-results.json";

/// On-disk layout of the published dashboard: one directory per namespace.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(namespace)
    }

    #[must_use]
    pub fn record_path(&self, namespace: &str) -> PathBuf {
        self.namespace_dir(namespace).join(RECORD_FILE)
    }

    #[must_use]
    pub fn report_path(&self, namespace: &str) -> PathBuf {
        self.namespace_dir(namespace).join(REPORT_TSV_FILE)
    }

    /// `Ok(None)` when the namespace has never been processed.
    pub fn load(&self, namespace: &str) -> Result<Option<OntologyRecord>> {
        let path = self.record_path(namespace);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let record: OntologyRecord = serde_norway::from_str(&raw).map_err(|err| {
            DashError::CorruptedRecord(format!("{}: {err}", path.display()))
        })?;
        if record.namespace != namespace {
            return Err(DashError::CorruptedRecord(format!(
                "{} belongs to namespace '{}'",
                path.display(),
                record.namespace
            )));
        }
        Ok(Some(record))
    }

    pub fn save(&self, record: &OntologyRecord) -> Result<()> {
        let path = self.record_path(&record.namespace);
        write_atomic(&path, serde_norway::to_string(record)?.as_bytes())
    }

    /// Every readable record under the root, sorted by namespace.
    ///
    /// Unreadable records are logged and skipped.
    pub fn list(&self) -> Result<Vec<OntologyRecord>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|err| DashError::Io(err.into()))?;
            if entry.file_name() != RECORD_FILE {
                continue;
            }
            let Some(namespace) = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str())
            else {
                continue;
            };
            match self.load(namespace) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => tracing::warn!(namespace, error = %err, "skipping unreadable record"),
            }
        }
        records.sort_by(|left, right| left.namespace.cmp(&right.namespace));
        Ok(records)
    }

    pub fn write_badges(&self, namespace: &str, qc: &Badge, score: &Badge) -> Result<()> {
        let dir = self.namespace_dir(namespace);
        write_json(&dir.join(QC_BADGE_FILE), qc)?;
        write_json(&dir.join(SCORE_BADGE_FILE), score)
    }

    pub fn write_text(&self, relative: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        write_atomic(&path, content.as_bytes())?;
        Ok(path)
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, serde_norway::to_string(value)?.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let staging = path.with_extension("tmp");
    fs::write(&staging, bytes)?;
    fs::rename(&staging, path)?;
    Ok(())
}
