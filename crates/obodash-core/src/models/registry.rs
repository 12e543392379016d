use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One ontology entry from the registry or from the `custom` config list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "preferredPrefix", skip_serializing_if = "Option::is_none")]
    pub preferred_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_status: Option<String>,
    pub is_obsolete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub usages: Vec<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub base_ns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_from: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RegistryEntry {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_obsolete
            && self
                .activity_status
                .as_deref()
                .is_some_and(|status| status.eq_ignore_ascii_case("active"))
    }

    /// Registry prefix, falling back to the upper-cased id.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.preferred_prefix
            .clone()
            .unwrap_or_else(|| self.id.to_ascii_uppercase())
    }
}

/// A resolved unit of work for one namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct OntologyTarget {
    pub id: String,
    pub mirror_from: Option<String>,
    pub base_ns: Vec<String>,
    /// The artifact is a full release and the pipeline must derive the base subset.
    pub base_generated: bool,
    pub metadata: RegistryEntry,
}

impl OntologyTarget {
    #[must_use]
    pub fn external_usage_count(&self) -> usize {
        self.metadata.usages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_keeps_unknown_fields() {
        let yaml = "id: foo\npreferredPrefix: FOO\nactivity_status: active\nrepository: https://example.org/foo\n";
        let entry: RegistryEntry = serde_norway::from_str(yaml).expect("parse");
        assert_eq!(entry.prefix(), "FOO");
        assert!(entry.is_active());
        assert!(entry.extra.contains_key("repository"));
    }

    #[test]
    fn obsolete_entries_are_inactive() {
        let entry = RegistryEntry {
            id: "old".to_string(),
            activity_status: Some("active".to_string()),
            is_obsolete: true,
            ..RegistryEntry::default()
        };
        assert!(!entry.is_active());
        assert_eq!(entry.prefix(), "OLD");
    }
}
