use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{DashError, Result};

const OBO_PURL_PREFIX: &str = "http://purl.obolibrary.org/obo/";

/// Names of the metrics persisted in a record's `metrics` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    LogicalConsistency,
    UnsatisfiableClasses,
    Axioms,
    Classes,
    ObjectProperties,
    EntitiesReused,
    NamespaceUsage,
    Individuals,
    DataProperties,
    AnnotationProperties,
    AxiomTypes,
    ClassExpressions,
    Owl2Dl,
    Syntax,
    UsageCount,
    UsedBy,
    OboScore,
}

impl MetricName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogicalConsistency => "Info: Logical consistency",
            Self::UnsatisfiableClasses => "Entities: Number of unsatisfiable classes",
            Self::Axioms => "Axioms: Number of axioms",
            Self::Classes => "Entities: Number of classes",
            Self::ObjectProperties => "Entities: Number of object properties",
            Self::EntitiesReused => "Entities: % of entities reused",
            Self::NamespaceUsage => "Info: Usage of namespaces in axioms",
            Self::Individuals => "Entities: Number of individuals",
            Self::DataProperties => "Entities: Number of data properties",
            Self::AnnotationProperties => "Entities: Number of annotation properties",
            Self::AxiomTypes => "Axioms: Breakdown of axiom types",
            Self::ClassExpressions => "Info: Breakdown of OWL class expressions used",
            Self::Owl2Dl => "Info: Does the ontology fall under OWL 2 DL?",
            Self::Syntax => "Info: Syntax",
            Self::UsageCount => "Info: How many ontologies use it?",
            Self::UsedBy => "Info: Which ontologies use it?",
            Self::OboScore => "Info: Experimental OBO score",
        }
    }
}

/// The `metrics` section of an engine measurement (ROBOT `measure -f yaml`).
///
/// `consistent` is required: a measurement that does not say is unusable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    #[serde(default)]
    pub curie_map: BTreeMap<String, String>,
    pub consistent: bool,
    #[serde(default)]
    pub unsatisfiable_class_count: u64,
    #[serde(default)]
    pub axiom_count: u64,
    #[serde(default)]
    pub axiom_count_incl: u64,
    #[serde(default)]
    pub class_count_incl: u64,
    #[serde(default)]
    pub obj_property_count_incl: u64,
    #[serde(default)]
    pub individual_count_incl: u64,
    #[serde(default)]
    pub dataproperty_count_incl: u64,
    #[serde(default)]
    pub annotation_property_count_incl: u64,
    #[serde(default)]
    pub namespace_entity_count_incl: BTreeMap<String, u64>,
    #[serde(default)]
    pub namespace_axiom_count_incl: BTreeMap<String, u64>,
    #[serde(default)]
    pub axiom_type_count_incl: BTreeMap<String, u64>,
    #[serde(default)]
    pub class_expression_count_incl: BTreeMap<String, u64>,
    #[serde(default)]
    pub owl2_dl: bool,
    #[serde(default)]
    pub syntax: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeasureDocument {
    metrics: Option<MetricsBundle>,
}

impl MetricsBundle {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let document: MeasureDocument = serde_norway::from_str(raw)?;
        document
            .metrics
            .ok_or_else(|| DashError::Validation("measure output has no `metrics` section".into()))
    }

    /// Prefixes whose expansion is one of the base namespaces.
    ///
    /// Falls back to deriving `FOO` from an OBO PURL namespace `.../obo/FOO_` when the
    /// curie map does not cover a namespace.
    #[must_use]
    pub fn base_prefixes(&self, base_namespaces: &[String]) -> Vec<String> {
        let mut prefixes = BTreeSet::new();
        for namespace in base_namespaces {
            let mut matched = false;
            for (prefix, iri) in &self.curie_map {
                if iri == namespace {
                    prefixes.insert(prefix.clone());
                    matched = true;
                }
            }
            if !matched {
                if let Some(prefix) = obo_purl_prefix(namespace) {
                    prefixes.insert(prefix);
                }
            }
        }
        prefixes.into_iter().collect()
    }

    /// Percentage of entities whose prefix is not one of `internal_prefixes`.
    #[must_use]
    pub fn percentage_reused(&self, internal_prefixes: &[String]) -> f64 {
        let mut internal = 0_u64;
        let mut external = 0_u64;
        for (prefix, count) in &self.namespace_entity_count_incl {
            if internal_prefixes.iter().any(|own| own == prefix) {
                internal += count;
            } else {
                external += count;
            }
        }
        let total = internal + external;
        if total == 0 {
            return 0.0;
        }
        100.0 * external as f64 / total as f64
    }

    #[must_use]
    pub fn to_record_metrics(&self, base_prefixes: &[String]) -> BTreeMap<String, Value> {
        let mut metrics = BTreeMap::new();
        let mut put = |name: MetricName, value: Value| {
            metrics.insert(name.as_str().to_string(), value);
        };
        put(MetricName::LogicalConsistency, json!(self.consistent));
        put(
            MetricName::UnsatisfiableClasses,
            json!(self.unsatisfiable_class_count),
        );
        put(MetricName::Axioms, json!(self.axiom_count_incl));
        put(MetricName::Classes, json!(self.class_count_incl));
        put(MetricName::ObjectProperties, json!(self.obj_property_count_incl));
        put(
            MetricName::EntitiesReused,
            json!(percent_label(self.percentage_reused(base_prefixes))),
        );
        put(MetricName::NamespaceUsage, json!(self.namespace_axiom_count_incl));
        put(MetricName::Individuals, json!(self.individual_count_incl));
        put(MetricName::DataProperties, json!(self.dataproperty_count_incl));
        put(
            MetricName::AnnotationProperties,
            json!(self.annotation_property_count_incl),
        );
        put(MetricName::AxiomTypes, json!(self.axiom_type_count_incl));
        put(
            MetricName::ClassExpressions,
            json!(self.class_expression_count_incl),
        );
        put(MetricName::Owl2Dl, json!(self.owl2_dl));
        put(
            MetricName::Syntax,
            json!(self.syntax.clone().unwrap_or_else(|| "unknown".to_string())),
        );
        metrics
    }
}

/// Composite score breakdown persisted under [`MetricName::OboScore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OboScoreMetric {
    pub oboscore: f64,
    #[serde(rename = "_impact")]
    pub impact: f64,
    #[serde(rename = "_dashboard")]
    pub dashboard: f64,
    #[serde(rename = "_reuse")]
    pub reuse: f64,
    #[serde(rename = "_impact_external")]
    pub impact_external: f64,
    #[serde(rename = "_formula")]
    pub formula: String,
}

pub(crate) fn obo_purl_prefix(namespace: &str) -> Option<String> {
    let rest = namespace.strip_prefix(OBO_PURL_PREFIX)?;
    let prefix = rest.strip_suffix('_')?;
    if prefix.is_empty() || prefix.contains('/') {
        return None;
    }
    Some(prefix.to_string())
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `25.0` -> `"25.00 %"`.
fn percent_label(value: f64) -> String {
    format!("{:.2} %", round2(value))
}
