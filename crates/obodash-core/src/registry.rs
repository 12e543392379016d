//! Resolves the configured ontology sources into per-namespace targets.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::fetch::{ArtifactSource, UrlProbe};
use crate::models::{OntologyTarget, RegistryEntry};

const OBO_PURL: &str = "http://purl.obolibrary.org/obo";

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    ontologies: Vec<RegistryEntry>,
}

pub fn parse_registry(raw: &str) -> Result<Vec<RegistryEntry>> {
    let document: RegistryDocument = serde_norway::from_str(raw)?;
    Ok(document.ontologies)
}

pub fn load_registry(source: &dyn ArtifactSource, location: &str) -> Result<Vec<RegistryEntry>> {
    let entries = parse_registry(&source.fetch_text(location)?)?;
    tracing::debug!(location, entries = entries.len(), "registry loaded");
    Ok(entries)
}

#[must_use]
pub fn default_base_namespaces(id: &str, prefix: &str) -> Vec<String> {
    vec![format!("{OBO_PURL}/{prefix}_"), format!("{OBO_PURL}/{id}#")]
}

#[must_use]
pub fn default_release_url(id: &str) -> String {
    format!("{OBO_PURL}/{id}.owl")
}

#[must_use]
pub fn base_release_url(id: &str) -> String {
    format!("{OBO_PURL}/{id}/{id}-base.owl")
}

/// Builds targets from the registry (active entries only) and the custom list, then
/// fills metadata gaps from the OBO Foundry registry.
pub fn resolve_targets(
    config: &DashboardConfig,
    registry: &[RegistryEntry],
    obo_registry: &[RegistryEntry],
    probe: &dyn UrlProbe,
) -> BTreeMap<String, OntologyTarget> {
    let mut targets = BTreeMap::new();

    for entry in registry.iter().filter(|entry| entry.is_active()) {
        let mirror = release_url(config, &entry.id, probe);
        targets.insert(entry.id.clone(), build_target(entry.clone(), Some(mirror)));
    }

    for entry in &config.ontologies.custom {
        let mirror = entry
            .mirror_from
            .clone()
            .unwrap_or_else(|| release_url(config, &entry.id, probe));
        targets.insert(entry.id.clone(), build_target(entry.clone(), Some(mirror)));
    }

    for target in targets.values_mut() {
        if let Some(obo) = obo_registry.iter().find(|obo| obo.id == target.id) {
            enrich_metadata(target, obo);
        }
    }

    tracing::info!(targets = targets.len(), "ontology targets resolved");
    targets
}

fn release_url(config: &DashboardConfig, id: &str, probe: &dyn UrlProbe) -> String {
    if config.prefer_base {
        let base = base_release_url(id);
        if probe.status(&base) == Some(200) {
            return base;
        }
        tracing::debug!(id, "no base release published, using full release");
    }
    default_release_url(id)
}

fn build_target(entry: RegistryEntry, mirror_from: Option<String>) -> OntologyTarget {
    let base_ns = if entry.base_ns.is_empty() {
        default_base_namespaces(&entry.id, &entry.prefix())
    } else {
        entry.base_ns.clone()
    };
    let base_generated = !mirror_from
        .as_deref()
        .is_some_and(|url| url.ends_with("-base.owl"));
    OntologyTarget {
        id: entry.id.clone(),
        mirror_from: mirror_from.filter(|url| !url.trim().is_empty()),
        base_ns,
        base_generated,
        metadata: entry,
    }
}

fn enrich_metadata(target: &mut OntologyTarget, obo: &RegistryEntry) {
    let meta = &mut target.metadata;
    let had_prefix = meta.preferred_prefix.is_some();
    fill(&mut meta.title, &obo.title);
    fill(&mut meta.preferred_prefix, &obo.preferred_prefix);
    fill(&mut meta.activity_status, &obo.activity_status);
    fill(&mut meta.domain, &obo.domain);
    fill(&mut meta.homepage, &obo.homepage);
    fill(&mut meta.description, &obo.description);
    fill(&mut meta.tracker, &obo.tracker);
    fill(&mut meta.contact, &obo.contact);
    fill(&mut meta.license, &obo.license);
    if meta.usages.is_empty() {
        meta.usages = obo.usages.clone();
    }
    for (key, value) in &obo.extra {
        meta.extra.entry(key.clone()).or_insert_with(|| value.clone());
    }

    if !had_prefix {
        if let Some(prefix) = obo.preferred_prefix.as_deref() {
            let namespace = format!("{OBO_PURL}/{prefix}_");
            if !target.base_ns.contains(&namespace) {
                target.base_ns.push(namespace);
            }
        }
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, fallback: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(fallback);
    }
}
