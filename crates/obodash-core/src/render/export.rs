use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ScoreFactor, ScoreWeights};
use crate::error::{DashError, Result};
use crate::models::OntologyRecord;
use crate::store::{RESULTS_JSON_FILE, RESULTS_YAML_FILE, RecordStore, write_json, write_yaml};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OboScoreWeights {
    pub dashboard_score_weights: BTreeMap<String, f64>,
    pub dashboard_score_max_impact: BTreeMap<String, f64>,
}

impl From<&ScoreWeights> for OboScoreWeights {
    fn from(weights: &ScoreWeights) -> Self {
        Self {
            dashboard_score_weights: named(weights.weights()),
            dashboard_score_max_impact: named(weights.max_impacts()),
        }
    }
}

fn named(values: &BTreeMap<ScoreFactor, f64>) -> BTreeMap<String, f64> {
    values
        .iter()
        .map(|(factor, value)| (factor.as_str().to_string(), *value))
        .collect()
}

/// `dashboard-results.yml`: every record plus the weights used to score them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsBundle {
    pub ontologies: Vec<OntologyRecord>,
    #[serde(default)]
    pub oboscore: OboScoreWeights,
}

impl ResultsBundle {
    #[must_use]
    pub fn new(ontologies: Vec<OntologyRecord>, weights: &ScoreWeights) -> Self {
        Self {
            ontologies,
            oboscore: OboScoreWeights::from(weights),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            return Ok(serde_json::from_str(&raw)?);
        }
        Ok(serde_norway::from_str(&raw)?)
    }

    /// Writes the YAML bundle and its JSON sibling under the store root.
    pub fn write(&self, store: &RecordStore) -> Result<(PathBuf, PathBuf)> {
        let yaml = store.root().join(RESULTS_YAML_FILE);
        let json = store.root().join(RESULTS_JSON_FILE);
        write_yaml(&yaml, self)?;
        write_json(&json, self)?;
        Ok((yaml, json))
    }
}

/// Converts any YAML document to a `.json` file next to it.
pub fn yaml_to_json(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(DashError::NotFound(path.display().to_string()));
    }
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_norway::from_str(&raw)?;
    if value.is_null() {
        return Err(DashError::Validation(format!(
            "{} does not contain a YAML document",
            path.display()
        )));
    }
    let target = path.with_extension("json");
    write_json(&target, &value)?;
    Ok(target)
}
