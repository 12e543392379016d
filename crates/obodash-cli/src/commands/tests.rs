use std::fs;
use std::path::Path;

use tempfile::tempdir;

use super::support::{NamespaceSelector, load_config};

#[test]
fn empty_selector_matches_everything() {
    let selector = NamespaceSelector::new(&[]).expect("selector");
    assert!(selector.matches("go"));
    assert!(selector.matches("uberon"));
}

#[test]
fn selector_matches_any_pattern() {
    let selector =
        NamespaceSelector::new(&["go".to_string(), "u*".to_string()]).expect("selector");
    assert!(selector.matches("go"));
    assert!(selector.matches("uberon"));
    assert!(!selector.matches("gop"));
    assert!(!selector.matches("chebi"));
}

#[test]
fn invalid_pattern_is_rejected() {
    let err = NamespaceSelector::new(&["a[".to_string()]).expect_err("invalid glob");
    assert!(err.to_string().contains("invalid --only pattern"));
}

#[test]
fn config_resolves_against_root() {
    let root = tempdir().expect("tempdir");
    fs::write(
        root.path().join("dashboard-config.yml"),
        "title: Test dashboard\nontologies:\n  custom:\n    - id: foo\n",
    )
    .expect("write config");
    let config =
        load_config(root.path(), Path::new("dashboard-config.yml")).expect("load config");
    assert_eq!(config.title(), "Test dashboard");
    assert_eq!(config.ontologies.custom.len(), 1);
}

#[test]
fn config_without_sources_is_rejected() {
    let root = tempdir().expect("tempdir");
    fs::write(root.path().join("dashboard-config.yml"), "title: Empty\n").expect("write config");
    let err = load_config(root.path(), Path::new("dashboard-config.yml")).expect_err("invalid");
    assert!(format!("{err:#}").contains("either `registry` or `custom`"));
}
