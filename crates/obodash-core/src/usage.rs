//! Cross-ontology reuse graph built from every record's namespace usage metric.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{MetricName, OntologyRecord};

/// For each namespace, the tracked namespaces whose axioms use its prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageGraph {
    used_by: BTreeMap<String, BTreeSet<String>>,
}

impl UsageGraph {
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a OntologyRecord>) -> Self {
        let records = records.into_iter().collect::<Vec<_>>();

        let mut owner_of_prefix = BTreeMap::<&str, BTreeSet<&str>>::new();
        for record in &records {
            for prefix in &record.base_prefixes {
                owner_of_prefix
                    .entry(prefix.as_str())
                    .or_default()
                    .insert(record.namespace.as_str());
            }
        }

        let mut used_by = records
            .iter()
            .map(|record| (record.namespace.clone(), BTreeSet::new()))
            .collect::<BTreeMap<_, _>>();
        for record in &records {
            for prefix in namespace_usage(record) {
                let Some(owners) = owner_of_prefix.get(prefix) else {
                    continue;
                };
                for owner in owners {
                    if *owner == record.namespace {
                        continue;
                    }
                    if let Some(users) = used_by.get_mut(*owner) {
                        users.insert(record.namespace.clone());
                    }
                }
            }
        }
        Self { used_by }
    }

    #[must_use]
    pub fn tracked(&self) -> usize {
        self.used_by.len()
    }

    #[must_use]
    pub fn used_by(&self, namespace: &str) -> Vec<String> {
        self.used_by
            .get(namespace)
            .map(|users| users.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn usage_count(&self, namespace: &str) -> usize {
        self.used_by.get(namespace).map_or(0, BTreeSet::len)
    }
}

fn namespace_usage(record: &OntologyRecord) -> impl Iterator<Item = &str> {
    record
        .metrics
        .get(MetricName::NamespaceUsage.as_str())
        .and_then(serde_json::Value::as_object)
        .into_iter()
        .flat_map(|usage| {
            usage
                .iter()
                .filter(|(_, count)| count.as_u64().is_none_or(|count| count > 0))
                .map(|(prefix, _)| prefix.as_str())
        })
}
