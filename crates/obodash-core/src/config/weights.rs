use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};

/// Inputs that contribute to the dashboard and OBO scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    NoBase,
    OverallError,
    OverallWarning,
    OverallInfo,
    ReportErrors,
    ReportWarning,
    ReportInfo,
    Dashboard,
    Impact,
    Reuse,
    ImpactExternal,
}

impl ScoreFactor {
    pub const ALL: [Self; 11] = [
        Self::NoBase,
        Self::OverallError,
        Self::OverallWarning,
        Self::OverallInfo,
        Self::ReportErrors,
        Self::ReportWarning,
        Self::ReportInfo,
        Self::Dashboard,
        Self::Impact,
        Self::Reuse,
        Self::ImpactExternal,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoBase => "no_base",
            Self::OverallError => "overall_error",
            Self::OverallWarning => "overall_warning",
            Self::OverallInfo => "overall_info",
            Self::ReportErrors => "report_errors",
            Self::ReportWarning => "report_warning",
            Self::ReportInfo => "report_info",
            Self::Dashboard => "dashboard",
            Self::Impact => "impact",
            Self::Reuse => "reuse",
            Self::ImpactExternal => "impact_external",
        }
    }

    #[must_use]
    pub const fn default_weight(self) -> f64 {
        match self {
            Self::NoBase => 5.0,
            Self::OverallError => 1.0,
            Self::OverallWarning => 0.5,
            Self::OverallInfo => 0.1,
            Self::ReportErrors => 0.05,
            Self::ReportWarning => 0.01,
            Self::ReportInfo => 0.005,
            Self::Dashboard => 2.0,
            Self::Impact | Self::ImpactExternal => 3.0,
            Self::Reuse => 1.0,
        }
    }

    #[must_use]
    pub const fn default_max_impact(self) -> f64 {
        match self {
            Self::NoBase => 5.0,
            Self::OverallError => 20.0,
            Self::OverallWarning | Self::ReportErrors => 10.0,
            Self::OverallInfo | Self::ReportWarning => 5.0,
            Self::ReportInfo | Self::Dashboard => 2.0,
            Self::Impact | Self::ImpactExternal => 3.0,
            Self::Reuse => 1.0,
        }
    }
}

impl fmt::Display for ScoreFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreFactor {
    type Err = DashError;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        Self::ALL
            .into_iter()
            .find(|factor| factor.as_str() == normalized)
            .ok_or_else(|| DashError::InvalidConfig(format!("unknown score factor '{normalized}'")))
    }
}

/// User override for one factor, as written in `obo_score_weights`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_impact: Option<f64>,
}

/// Immutable weight and cap for every [`ScoreFactor`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreWeights {
    weights: BTreeMap<ScoreFactor, f64>,
    max_impact: BTreeMap<ScoreFactor, f64>,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            weights: ScoreFactor::ALL
                .into_iter()
                .map(|factor| (factor, factor.default_weight()))
                .collect(),
            max_impact: ScoreFactor::ALL
                .into_iter()
                .map(|factor| (factor, factor.default_max_impact()))
                .collect(),
        }
    }
}

impl ScoreWeights {
    pub fn with_overrides(overrides: &BTreeMap<String, WeightOverride>) -> Result<Self> {
        let mut resolved = Self::default();
        for (name, value) in overrides {
            let factor = name.parse::<ScoreFactor>()?;
            if let Some(weight) = value.impact_factor {
                validate_non_negative(factor, "impact_factor", weight)?;
                resolved.weights.insert(factor, weight);
            }
            if let Some(cap) = value.max_impact {
                validate_non_negative(factor, "max_impact", cap)?;
                resolved.max_impact.insert(factor, cap);
            }
        }
        Ok(resolved)
    }

    #[must_use]
    pub fn weight(&self, factor: ScoreFactor) -> f64 {
        self.weights
            .get(&factor)
            .copied()
            .unwrap_or_else(|| factor.default_weight())
    }

    #[must_use]
    pub fn max_impact(&self, factor: ScoreFactor) -> f64 {
        self.max_impact
            .get(&factor)
            .copied()
            .unwrap_or_else(|| factor.default_max_impact())
    }

    #[must_use]
    pub const fn weights(&self) -> &BTreeMap<ScoreFactor, f64> {
        &self.weights
    }

    #[must_use]
    pub const fn max_impacts(&self) -> &BTreeMap<ScoreFactor, f64> {
        &self.max_impact
    }
}

fn validate_non_negative(factor: ScoreFactor, field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(DashError::InvalidConfig(format!(
        "{factor}.{field} must be a non-negative number, got {value}"
    )))
}
