use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of a single principle check.
///
/// The derived ordering is the aggregation precedence: `Pass < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Info,
    Warn,
    Error,
}

impl CheckStatus {
    pub const ALL: [Self; 4] = [Self::Pass, Self::Info, Self::Warn, Self::Error];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PASS" => Ok(Self::Pass),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown check status '{other}'")),
        }
    }
}

/// Per-level violation counts, serialized with the level names as keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    #[serde(rename = "ERROR", default)]
    pub error: u64,
    #[serde(rename = "WARN", default)]
    pub warn: u64,
    #[serde(rename = "INFO", default)]
    pub info: u64,
}

impl LevelCounts {
    #[must_use]
    pub const fn new(error: u64, warn: u64, info: u64) -> Self {
        Self { error, warn, info }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.error + self.warn + self.info
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<LevelCounts>,
}

impl CheckResult {
    #[must_use]
    pub const fn new(status: CheckStatus) -> Self {
        Self {
            status,
            comment: None,
            file: None,
            results: None,
        }
    }

    #[must_use]
    pub const fn pass() -> Self {
        Self::new(CheckStatus::Pass)
    }

    #[must_use]
    pub fn info(comment: impl Into<String>) -> Self {
        Self::new(CheckStatus::Info).with_comment(comment)
    }

    #[must_use]
    pub fn warn(comment: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warn).with_comment(comment)
    }

    #[must_use]
    pub fn error(comment: impl Into<String>) -> Self {
        Self::new(CheckStatus::Error).with_comment(comment)
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = (!comment.is_empty()).then_some(comment);
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub const fn with_counts(mut self, counts: LevelCounts) -> Self {
        self.results = Some(counts);
        self
    }
}

/// A status as found in a persisted record.
///
/// Records written by other tooling may carry statuses outside the known set;
/// those are kept verbatim so scoring can fail closed instead of rejecting the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedStatus {
    Known(CheckStatus),
    Unrecognized(String),
}

impl RecordedStatus {
    #[must_use]
    pub const fn known(&self) -> Option<CheckStatus> {
        match self {
            Self::Known(status) => Some(*status),
            Self::Unrecognized(_) => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Known(status) => status.as_str(),
            Self::Unrecognized(raw) => raw.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResult {
    pub status: RecordedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<LevelCounts>,
}

impl From<CheckResult> for RecordedResult {
    fn from(result: CheckResult) -> Self {
        Self {
            status: RecordedStatus::Known(result.status),
            comment: result.comment,
            file: result.file,
            results: result.results,
        }
    }
}
