use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};
use crate::models::RegistryEntry;

mod env;
mod profile;
mod weights;

pub use env::{DOWNLOAD_RETRIES_ENV, HTTP_TIMEOUT_SECS_ENV, ROBOT_BIN_ENV, RuntimeConfig};
pub use profile::{DEFAULT_PROFILE_URL, MANDATORY_RULES, ProfileConfig};
pub use weights::{ScoreFactor, ScoreWeights, WeightOverride};

pub const DEFAULT_TITLE: &str = "OBO Dashboard";
pub const DEFAULT_DESCRIPTION: &str = "No description provided.";
pub const DEFAULT_OBO_REGISTRY: &str =
    "https://raw.githubusercontent.com/OBOFoundry/OBOFoundry.github.io/master/registry/ontologies.yml";
const DEFAULT_REPORT_TIMEOUT_SECONDS: u64 = 3600;

/// Formula used for the per-ontology dashboard score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    #[default]
    Deduction,
    Category,
}

impl ScoringStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deduction => "deduction",
            Self::Category => "category",
        }
    }
}

/// Factors mixed into the composite OBO score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMode {
    #[default]
    ImpactDashboard,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologySources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<RegistryEntry>,
}

/// Dashboard configuration file (`dashboard-config.yml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ontologies: OntologySources,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obo_registry: Option<String>,
    pub profile: ProfileConfig,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub obo_score_weights: BTreeMap<String, WeightOverride>,
    pub dashboard_score_formula: ScoringStrategy,
    pub obo_score_factors: CompositeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_report_timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_truncation_limit: Option<usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub robot_additional_prefixes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redownload_after_hours: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robot_opts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_regenerate_dashboard_after_hours: Option<u64>,
    pub prefer_base: bool,
}

impl DashboardConfig {
    /// Reads YAML, or TOML when the file extension is `.toml`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            DashError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
        })?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml_str(&raw)?
        } else {
            Self::from_yaml_str(&raw)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_norway::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.score_weights()?;
        if self.ontologies.registry.is_none() && self.ontologies.custom.is_empty() {
            return Err(DashError::InvalidConfig(
                "ontologies: either `registry` or `custom` must be set".to_string(),
            ));
        }
        if let Some(entry) = self.ontologies.custom.iter().find(|entry| entry.id.trim().is_empty()) {
            return Err(DashError::InvalidConfig(format!(
                "ontologies.custom: entry without id ({:?})",
                entry.title
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }

    #[must_use]
    pub fn obo_registry(&self) -> &str {
        self.obo_registry.as_deref().unwrap_or(DEFAULT_OBO_REGISTRY)
    }

    /// The `registry` value, treating an explicit `None` string as unset.
    #[must_use]
    pub fn registry_source(&self) -> Option<&str> {
        self.ontologies
            .registry
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "None")
    }

    pub fn score_weights(&self) -> Result<ScoreWeights> {
        ScoreWeights::with_overrides(&self.obo_score_weights)
    }

    #[must_use]
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(
            self.dashboard_report_timeout_seconds
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REPORT_TIMEOUT_SECONDS),
        )
    }

    /// Maximum rows kept in a published lint report; `0` keeps everything.
    #[must_use]
    pub fn report_truncation_limit(&self) -> usize {
        self.report_truncation_limit.unwrap_or(0)
    }

    #[must_use]
    pub fn redownload_after(&self) -> Option<chrono::Duration> {
        hours(self.redownload_after_hours)
    }

    #[must_use]
    pub fn force_regenerate_after(&self) -> Option<chrono::Duration> {
        hours(self.force_regenerate_dashboard_after_hours)
    }

    #[must_use]
    pub fn robot_opts(&self) -> Vec<String> {
        self.robot_opts
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(ToString::to_string)
            .collect()
    }

    /// `<ID>ALT` hash-namespace prefixes for every ontology id, then the configured extras.
    #[must_use]
    pub fn robot_prefixes<'a>(
        &self,
        ontology_ids: impl IntoIterator<Item = &'a str>,
    ) -> BTreeMap<String, String> {
        let mut prefixes = ontology_ids
            .into_iter()
            .map(|id| {
                (
                    format!("{}ALT", id.to_ascii_uppercase()),
                    format!("http://purl.obolibrary.org/obo/{id}#"),
                )
            })
            .collect::<BTreeMap<_, _>>();
        prefixes.extend(
            self.robot_additional_prefixes
                .iter()
                .map(|(prefix, iri)| (prefix.clone(), iri.clone())),
        );
        prefixes
    }
}

fn hours(value: Option<u64>) -> Option<chrono::Duration> {
    value
        .filter(|hours| *hours > 0)
        .and_then(|hours| i64::try_from(hours).ok())
        .map(chrono::Duration::hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
title: Test Dashboard
ontologies:
  custom:
    - id: foo
      mirror_from: file:///tmp/foo.owl
profile:
  custom:
    - "WARN\tmissing_label"
obo_score_weights:
  overall_error:
    impact_factor: 2
dashboard_score_formula: category
redownload_after_hours: 0
force_regenerate_dashboard_after_hours: 48
robot_opts: "-vv --catalog catalog.xml"
"#;

    #[test]
    fn yaml_config_resolves_defaults_and_overrides() {
        let config = DashboardConfig::from_yaml_str(CONFIG).expect("parse");
        config.validate().expect("valid");
        assert_eq!(config.title(), "Test Dashboard");
        assert_eq!(config.description(), DEFAULT_DESCRIPTION);
        assert_eq!(config.dashboard_score_formula, ScoringStrategy::Category);
        assert_eq!(config.obo_score_factors, CompositeMode::ImpactDashboard);
        assert_eq!(config.engine_timeout(), Duration::from_secs(3600));
        assert_eq!(config.redownload_after(), None);
        assert_eq!(config.force_regenerate_after(), Some(chrono::Duration::hours(48)));
        assert_eq!(config.robot_opts(), vec!["-vv", "--catalog", "catalog.xml"]);
        let weights = config.score_weights().expect("weights");
        assert_eq!(weights.weight(ScoreFactor::OverallError), 2.0);
    }

    #[test]
    fn toml_config_is_accepted() {
        let raw = "title = \"T\"\n[ontologies]\nregistry = \"registry.yml\"\n";
        let config = DashboardConfig::from_toml_str(raw).expect("parse");
        config.validate().expect("valid");
        assert_eq!(config.registry_source(), Some("registry.yml"));
    }

    #[test]
    fn config_without_ontologies_is_invalid() {
        let config = DashboardConfig::from_yaml_str("title: x\n").expect("parse");
        assert_eq!(config.validate().expect_err("invalid").code(), "INVALID_CONFIG");
    }

    #[test]
    fn robot_prefixes_add_hash_namespaces_then_extras() {
        let mut config = DashboardConfig::default();
        config
            .robot_additional_prefixes
            .insert("FOOALT".to_string(), "http://example.org/foo#".to_string());
        let prefixes = config.robot_prefixes(["foo", "bar"]);
        assert_eq!(
            prefixes.get("BARALT").map(String::as_str),
            Some("http://purl.obolibrary.org/obo/bar#")
        );
        assert_eq!(
            prefixes.get("FOOALT").map(String::as_str),
            Some("http://example.org/foo#")
        );
    }

    #[test]
    fn none_registry_string_is_unset() {
        let config = DashboardConfig::from_yaml_str("ontologies:\n  registry: None\n").expect("parse");
        assert_eq!(config.registry_source(), None);
    }
}
