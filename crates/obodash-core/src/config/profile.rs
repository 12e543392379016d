use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_PROFILE_URL: &str =
    "https://raw.githubusercontent.com/ontodev/robot/master/robot-core/src/main/resources/report_profile.txt";

/// Lint rules the checks depend on; a custom profile can lower them but never drop them.
pub const MANDATORY_RULES: [&str; 5] = [
    "duplicate_label",
    "missing_definition",
    "missing_ontology_license",
    "multiple_definitions",
    "multiple_labels",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseprofile: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<String>,
}

impl ProfileConfig {
    /// Builds the lint profile lines, fetching the base profile through `load_text`.
    pub fn resolve<F>(&self, mut load_text: F) -> Result<Vec<String>>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let mut lines = Vec::new();
        if let Some(base) = self.baseprofile.as_deref() {
            lines.extend(split_profile_lines(&load_text(base)?));
        }
        lines.extend(
            self.custom
                .iter()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty()),
        );

        if lines.is_empty() {
            return Ok(split_profile_lines(&load_text(DEFAULT_PROFILE_URL)?));
        }

        let missing = MANDATORY_RULES
            .iter()
            .filter(|rule| !lines.iter().any(|line| line.contains(**rule)))
            .map(|rule| {
                tracing::info!(rule, "mandatory lint rule missing from profile, adding at WARN");
                format!("WARN\t{rule}")
            })
            .collect::<Vec<_>>();
        lines.extend(missing);
        Ok(lines)
    }
}

fn split_profile_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
