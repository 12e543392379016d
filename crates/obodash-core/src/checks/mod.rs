//! Principle checks evaluated for every processed namespace.
//!
//! Checks are pure functions over facts gathered beforehand: registry metadata, engine
//! measurements, the lint report and URL probe results. A failing check never takes the
//! others down; it is recorded as INFO and logged.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::engine::LintReport;
use crate::fetch::UrlProbe;
use crate::models::{CheckResult, MetricsBundle, RegistryEntry};

mod lint;
mod metadata;
mod ontology;
mod versioning;


#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("malformed input: {0}")]
    Malformed(String),
}

pub type CheckOutcome = std::result::Result<CheckResult, CheckError>;

/// Identifier of a principle check. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckId {
    Open,
    CommonFormat,
    Uris,
    Versioning,
    Scope,
    TextualDefinitions,
    Relations,
    Documented,
    PluralityOfUsers,
    LocusOfAuthority,
    NamingConventions,
    Maintenance,
    RobotReport,
}

impl CheckId {
    pub const ALL: [Self; 13] = [
        Self::Open,
        Self::CommonFormat,
        Self::Uris,
        Self::Versioning,
        Self::Scope,
        Self::TextualDefinitions,
        Self::Relations,
        Self::Documented,
        Self::PluralityOfUsers,
        Self::LocusOfAuthority,
        Self::NamingConventions,
        Self::Maintenance,
        Self::RobotReport,
    ];

    /// Key under which the result is persisted.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "FP01 Open",
            Self::CommonFormat => "FP02 Common Format",
            Self::Uris => "FP03 URIs",
            Self::Versioning => "FP04 Versioning",
            Self::Scope => "FP05 Scope",
            Self::TextualDefinitions => "FP06 Textual Definitions",
            Self::Relations => "FP07 Relations",
            Self::Documented => "FP08 Documented",
            Self::PluralityOfUsers => "FP09 Plurality of Users",
            Self::LocusOfAuthority => "FP11 Locus of Authority",
            Self::NamingConventions => "FP12 Naming Conventions",
            Self::Maintenance => "FP16 Maintenance",
            Self::RobotReport => "ROBOT Report",
        }
    }

    /// Foundry principle number; `None` for the lint report.
    #[must_use]
    pub const fn principle(self) -> Option<u8> {
        match self {
            Self::Open => Some(1),
            Self::CommonFormat => Some(2),
            Self::Uris => Some(3),
            Self::Versioning => Some(4),
            Self::Scope => Some(5),
            Self::TextualDefinitions => Some(6),
            Self::Relations => Some(7),
            Self::Documented => Some(8),
            Self::PluralityOfUsers => Some(9),
            Self::LocusOfAuthority => Some(11),
            Self::NamingConventions => Some(12),
            Self::Maintenance => Some(16),
            Self::RobotReport => None,
        }
    }

    #[must_use]
    pub fn documentation_url(self) -> String {
        match self.principle() {
            Some(number) => {
                let slug = self
                    .label()
                    .split_once(' ')
                    .map_or("", |(_, name)| name)
                    .to_ascii_lowercase()
                    .replace(' ', "-");
                format!("http://obofoundry.org/principles/fp-{number:03}-{slug}.html")
            }
            None => "http://robot.obolibrary.org/report".to_string(),
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.label() == label)
    }

    const fn run(self) -> CheckFn {
        match self {
            Self::Open => metadata::is_open,
            Self::CommonFormat => ontology::is_common_format,
            Self::Uris => ontology::has_valid_uris,
            Self::Versioning => versioning::has_versioning,
            Self::Scope => metadata::has_scope,
            Self::TextualDefinitions => lint::has_valid_definitions,
            Self::Relations => ontology::has_valid_relations,
            Self::Documented => metadata::has_documentation,
            Self::PluralityOfUsers => metadata::has_users,
            Self::LocusOfAuthority => metadata::has_contact,
            Self::NamingConventions => lint::has_valid_labels,
            Self::Maintenance => ontology::is_maintained,
            Self::RobotReport => lint::report_summary,
        }
    }
}

type CheckFn = fn(&CheckInputs<'_>) -> CheckOutcome;

/// Engine-derived facts about the processed ontology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OntologyFacts {
    pub version_iri: Option<String>,
    pub syntax: Option<String>,
    pub metrics: MetricsBundle,
    pub base_namespaces: Vec<String>,
    pub base_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStatus {
    Reached(u16),
    Unreachable,
}

impl UrlStatus {
    #[must_use]
    pub const fn from_probe(status: Option<u16>) -> Self {
        match status {
            Some(code) => Self::Reached(code),
            None => Self::Unreachable,
        }
    }
}

/// Network facts resolved before evaluation; `None` means nothing to probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeFacts {
    pub homepage: Option<UrlStatus>,
    pub version_iri: Option<UrlStatus>,
}

impl ProbeFacts {
    #[must_use]
    pub fn gather(
        metadata: Option<&RegistryEntry>,
        version_iri: Option<&str>,
        probe: &dyn UrlProbe,
    ) -> Self {
        let homepage = metadata
            .and_then(|entry| entry.homepage.as_deref())
            .map(|url| UrlStatus::from_probe(probe.status(url)));
        let version_iri = version_iri.map(|url| UrlStatus::from_probe(probe.status(url)));
        Self {
            homepage,
            version_iri,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckInputs<'a> {
    pub namespace: &'a str,
    pub metadata: Option<&'a RegistryEntry>,
    pub ontology: Option<&'a OntologyFacts>,
    pub report: Option<&'a LintReport>,
    pub probes: ProbeFacts,
    pub today: NaiveDate,
}

impl<'a> CheckInputs<'a> {
    fn metadata(&self) -> Result<&'a RegistryEntry, CheckError> {
        self.metadata.ok_or(CheckError::MissingInput("registry metadata"))
    }

    fn ontology(&self) -> Result<&'a OntologyFacts, CheckError> {
        self.ontology.ok_or(CheckError::MissingInput("ontology facts"))
    }
}

/// Runs one check, turning an error into an INFO result.
#[must_use]
pub fn run_check(id: CheckId, inputs: &CheckInputs<'_>) -> CheckResult {
    match (id.run())(inputs) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(
                namespace = inputs.namespace,
                check = id.label(),
                error = %err,
                "unable to run check"
            );
            CheckResult::info(format!("unable to run check {}", id.label()))
        }
    }
}

/// Evaluates every registered check, keyed by label.
#[must_use]
pub fn evaluate_all(inputs: &CheckInputs<'_>) -> BTreeMap<String, CheckResult> {
    CheckId::ALL
        .into_iter()
        .map(|id| (id.label().to_string(), run_check(id, inputs)))
        .collect()
}

/// `"{n} duplicate labels. {n} missing labels. See ROBOT Report for details."`
fn violation_comment(noun: &str, counts: &[(&str, u64)]) -> String {
    let mut parts = counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(kind, count)| format!("{count} {kind} {noun}."))
        .collect::<Vec<_>>();
    parts.push("See ROBOT Report for details.".to_string());
    parts.join(" ")
}
