use chrono::Datelike;

use super::versioning::release_date;
use super::{CheckInputs, CheckOutcome};
use crate::models::CheckResult;

const OBO_PURL: &str = "http://purl.obolibrary.org/obo/";
const RO_PREFIX: &str = "RO";
const MAINTENANCE_ERROR_YEARS: i32 = 3;
const MAINTENANCE_WARN_YEARS: i32 = 2;

/// FP02: published as RDF/XML.
pub(super) fn is_common_format(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let facts = inputs.ontology()?;
    let syntax = facts
        .metrics
        .syntax
        .as_deref()
        .or(facts.syntax.as_deref());
    Ok(match syntax {
        None => CheckResult::info("Unable to determine the ontology syntax"),
        Some(syntax) if syntax.to_ascii_uppercase().contains("RDF/XML") => CheckResult::pass(),
        Some(syntax) => CheckResult::warn(format!(
            "Ontology is published as {syntax}; RDF/XML is the required exchange format"
        )),
    })
}

/// FP03: base namespaces are OBO PURLs and terms avoid the hash-style namespace.
pub(super) fn has_valid_uris(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let facts = inputs.ontology()?;
    if facts.base_namespaces.is_empty() {
        return Ok(CheckResult::error("No base namespaces declared"));
    }

    let invalid = facts
        .base_namespaces
        .iter()
        .filter(|namespace| !is_obo_namespace(namespace, inputs.namespace))
        .map(String::as_str)
        .collect::<Vec<_>>();
    if !invalid.is_empty() {
        return Ok(CheckResult::error(format!(
            "Base namespaces are not OBO PURLs: {}",
            invalid.join(", ")
        )));
    }

    let hash_namespace = format!("{OBO_PURL}{}#", inputs.namespace);
    let hash_entities = facts
        .metrics
        .curie_map
        .iter()
        .filter(|(_, iri)| **iri == hash_namespace)
        .filter_map(|(prefix, _)| facts.metrics.namespace_entity_count_incl.get(prefix))
        .sum::<u64>();
    if hash_entities > 0 {
        return Ok(CheckResult::warn(format!(
            "{hash_entities} entities use the hash namespace {hash_namespace}; use {OBO_PURL}<PREFIX>_<ID> instead"
        )));
    }
    Ok(CheckResult::pass())
}

fn is_obo_namespace(namespace: &str, id: &str) -> bool {
    let Some(rest) = namespace.strip_prefix(OBO_PURL) else {
        return false;
    };
    if let Some(prefix) = rest.strip_suffix('_') {
        return !prefix.is_empty()
            && prefix
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    }
    rest.strip_suffix('#').is_some_and(|local| local == id)
}

/// FP07: locally minted object properties without reuse of the Relation Ontology.
pub(super) fn has_valid_relations(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let metrics = &inputs.ontology()?.metrics;
    if metrics.obj_property_count_incl == 0 {
        return Ok(CheckResult::pass());
    }
    let reuses_ro = metrics
        .namespace_entity_count_incl
        .get(RO_PREFIX)
        .is_some_and(|count| *count > 0)
        || metrics
            .namespace_axiom_count_incl
            .get(RO_PREFIX)
            .is_some_and(|count| *count > 0);
    if reuses_ro {
        Ok(CheckResult::pass())
    } else {
        Ok(CheckResult::info(format!(
            "{} object properties but no Relation Ontology (RO) terms are used",
            metrics.obj_property_count_incl
        )))
    }
}

/// FP16: the last dated release is recent.
pub(super) fn is_maintained(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let facts = inputs.ontology()?;
    let released = match facts.version_iri.as_deref() {
        Some(iri) => release_date(iri)?,
        None => None,
    };
    let Some(released) = released else {
        return Ok(CheckResult::info(
            "Unable to determine the release date from the version IRI",
        ));
    };

    let years = years_between(released, inputs.today);
    if years >= MAINTENANCE_ERROR_YEARS {
        return Ok(CheckResult::error(format!(
            "Last release {released} is more than {MAINTENANCE_ERROR_YEARS} years old"
        )));
    }
    if years >= MAINTENANCE_WARN_YEARS {
        return Ok(CheckResult::warn(format!(
            "Last release {released} is more than {MAINTENANCE_WARN_YEARS} years old"
        )));
    }
    Ok(CheckResult::pass())
}

/// Whole calendar years elapsed from `from` to `to`.
fn years_between(from: chrono::NaiveDate, to: chrono::NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}
