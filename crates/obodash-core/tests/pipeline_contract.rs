use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use obodash_core::client::{DashboardRun, RunDeps};
use obodash_core::config::DashboardConfig;
use obodash_core::engine::{
    EngineError, EngineResult, LintReport, OntologyEngine, OntologyHandle, scan_ontology_header,
};
use obodash_core::fetch::{ArtifactSource, UrlProbe};
use obodash_core::models::{
    ChangeState, CheckStatus, FailureKind, LevelCounts, MetricName, MetricsBundle,
    OntologyRecord, Usage,
};
use obodash_core::pipeline::NamespaceOutcome;
use obodash_core::store::{QC_BADGE_FILE, RECORD_FILE, REPORT_TSV_FILE, SCORE_BADGE_FILE};
use obodash_core::{DashError, Dashboard, Result};
use tempfile::tempdir;

const FOO_OWL: &str = include_str!("fixtures/foo.owl");
const BAR_OWL: &str = include_str!("fixtures/bar.owl");
const FOO_REPORT: &str = include_str!("fixtures/foo_report.tsv");

const CONFIG: &str = r#"
title: Contract dashboard
obo_registry: mem://obo-registry.yml
ontologies:
  custom:
    - id: foo
      mirror_from: mem://foo.owl
    - id: bar
      mirror_from: mem://bar.owl
profile:
  custom:
    - "ERROR\tduplicate_label"
"#;

/// In-memory artifacts keyed by location.
#[derive(Default)]
struct MemorySource {
    artifacts: RefCell<BTreeMap<String, String>>,
}

impl MemorySource {
    fn with(artifacts: &[(&str, &str)]) -> Self {
        let source = Self::default();
        for (location, content) in artifacts {
            source.put(location, content);
        }
        source
    }

    fn put(&self, location: &str, content: &str) {
        self.artifacts
            .borrow_mut()
            .insert(location.to_string(), content.to_string());
    }

    fn remove(&self, location: &str) {
        self.artifacts.borrow_mut().remove(location);
    }
}

impl ArtifactSource for MemorySource {
    fn fetch_to(&self, location: &str, dest: &Path) -> Result<()> {
        let artifacts = self.artifacts.borrow();
        let content = artifacts
            .get(location)
            .ok_or_else(|| DashError::Download(format!("{location}: 404")))?;
        fs::write(dest, content)?;
        Ok(())
    }

    fn fetch_text(&self, location: &str) -> Result<String> {
        self.artifacts
            .borrow()
            .get(location)
            .cloned()
            .ok_or_else(|| DashError::NotFound(location.to_string()))
    }
}

struct ReachableProbe;

impl UrlProbe for ReachableProbe {
    fn status(&self, _url: &str) -> Option<u16> {
        Some(200)
    }
}

/// Engine double: canned metrics per namespace, optional lint report, scripted timeouts.
#[derive(Default)]
struct ScriptedEngine {
    timeouts: RefCell<BTreeMap<String, u32>>,
    inconsistent: Vec<String>,
    metrics_calls: RefCell<u32>,
}

impl ScriptedEngine {
    fn inconsistent(mut self, namespace: &str) -> Self {
        self.inconsistent.push(namespace.to_string());
        self
    }

    fn time_out(self, namespace: &str, times: u32) -> Self {
        self.timeouts.borrow_mut().insert(namespace.to_string(), times);
        self
    }

    fn metrics_calls(&self) -> u32 {
        *self.metrics_calls.borrow()
    }
}

impl OntologyEngine for ScriptedEngine {
    fn load(&self, namespace: &str, source: &Path) -> EngineResult<OntologyHandle> {
        let header = scan_ontology_header(source).map_err(|err| EngineError::Failed {
            operation: "load".to_string(),
            detail: err.to_string(),
        })?;
        Ok(OntologyHandle {
            namespace: namespace.to_string(),
            path: source.to_path_buf(),
            version_iri: header.version_iri,
            syntax: header.syntax,
        })
    }

    fn compute_metrics(
        &self,
        handle: &OntologyHandle,
        _prefix_map: &BTreeMap<String, String>,
    ) -> EngineResult<MetricsBundle> {
        *self.metrics_calls.borrow_mut() += 1;
        if let Some(remaining) = self.timeouts.borrow_mut().get_mut(&handle.namespace) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EngineError::Timeout {
                    operation: "measure".to_string(),
                    after: Duration::from_secs(1),
                });
            }
        }

        let own = handle.namespace.to_ascii_uppercase();
        let mut usage = BTreeMap::from([(own.clone(), 40)]);
        if handle.namespace == "foo" {
            usage.insert("BAR".to_string(), 2);
        }
        Ok(MetricsBundle {
            curie_map: BTreeMap::from([(
                own.clone(),
                format!("http://purl.obolibrary.org/obo/{own}_"),
            )]),
            consistent: !self.inconsistent.contains(&handle.namespace),
            axiom_count: 42,
            axiom_count_incl: 42,
            class_count_incl: 10,
            namespace_axiom_count_incl: usage,
            owl2_dl: true,
            ..MetricsBundle::default()
        })
    }

    fn extract_base_subset(
        &self,
        handle: &OntologyHandle,
        _base_namespaces: &[String],
    ) -> EngineResult<OntologyHandle> {
        Ok(handle.clone())
    }

    fn run_lint_report(
        &self,
        handle: &OntologyHandle,
        _profile: &Path,
    ) -> EngineResult<Option<LintReport>> {
        if handle.namespace != "foo" {
            return Ok(Some(LintReport::default()));
        }
        LintReport::parse_tsv(FOO_REPORT)
            .map(Some)
            .map_err(|err| EngineError::Failed {
                operation: "report".to_string(),
                detail: err.to_string(),
            })
    }
}

fn config() -> DashboardConfig {
    let config = DashboardConfig::from_yaml_str(CONFIG).expect("config");
    config.validate().expect("valid config");
    config
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0)
        .single()
        .expect("timestamp")
}

fn run(
    app: &Dashboard,
    engine: &ScriptedEngine,
    source: &MemorySource,
    now: DateTime<Utc>,
) -> DashboardRun {
    let deps = RunDeps {
        engine,
        source,
        probe: &ReachableProbe,
    };
    app.run(&config(), deps, |_| true, now).expect("run")
}

fn default_source() -> MemorySource {
    MemorySource::with(&[("mem://foo.owl", FOO_OWL), ("mem://bar.owl", BAR_OWL)])
}

#[test]
fn first_run_evaluates_scores_and_publishes_every_namespace() {
    // Pseudocode:
    // Given two fresh namespaces where foo's axioms reference BAR terms
    // When the dashboard runs once
    // Then both are evaluated, bar is counted as used by foo and all artifacts are published.
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let outcome = run(&app, &ScriptedEngine::default(), &default_source(), at(1));

    assert_eq!(outcome.batch.outcomes["foo"], NamespaceOutcome::Evaluated);
    assert_eq!(outcome.batch.outcomes["bar"], NamespaceOutcome::Evaluated);
    assert_eq!(outcome.batch.failed(), 0);

    let foo = app.store().load("foo").expect("load").expect("foo record");
    assert!(foo.changed);
    assert_eq!(foo.change_state, Some(ChangeState::Changed));
    assert_eq!(foo.date.as_deref(), Some("2024-03-01"));
    assert_eq!(
        foo.version.as_deref(),
        Some("http://purl.obolibrary.org/obo/foo/releases/2024-02-20/foo.owl")
    );
    assert_eq!(foo.results.len(), 13);
    let report = &foo.results["ROBOT Report"];
    assert_eq!(report.status.known(), Some(CheckStatus::Error));
    assert_eq!(report.results, Some(LevelCounts::new(1, 1, 0)));
    assert_eq!(
        foo.summary.as_ref().map(|summary| summary.status),
        Some(CheckStatus::Error)
    );
    assert!(foo.score.is_some_and(|score| score < 100.0));
    assert!(foo.metrics.contains_key(MetricName::OboScore.as_str()));

    let bar = app.store().load("bar").expect("load").expect("bar record");
    assert_eq!(bar.metric_u64(MetricName::UsageCount.as_str()), Some(1));
    assert_eq!(
        bar.metrics[MetricName::UsedBy.as_str()],
        serde_json::json!(["foo"])
    );
    assert_eq!(foo.metric_u64(MetricName::UsageCount.as_str()), Some(0));

    let store_root = app.store().root();
    for file in [RECORD_FILE, QC_BADGE_FILE, SCORE_BADGE_FILE, "dashboard.html"] {
        assert!(store_root.join("foo").join(file).is_file(), "missing foo/{file}");
    }
    assert!(store_root.join("foo").join(REPORT_TSV_FILE).is_file());
    assert!(store_root.join("foo/robot_report.html").is_file());
    assert!(store_root.join("index.html").is_file());
    assert!(store_root.join("dashboard-results.yml").is_file());
    assert_eq!(outcome.rendered.reports, 2);
}

#[test]
fn same_artifact_twice_keeps_results_and_score_stable() {
    // Pseudocode:
    // Given a namespace processed once
    // When the same bytes are downloaded again
    // Then changed is false, the engine is not invoked and the stored record stops moving.
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let engine = ScriptedEngine::default();
    let source = default_source();

    run(&app, &engine, &source, at(1));
    let first = app.store().load("foo").expect("load").expect("foo");
    let calls_after_first = engine.metrics_calls();

    let second_run = run(&app, &engine, &source, at(2));
    assert_eq!(second_run.batch.outcomes["foo"], NamespaceOutcome::Unchanged);
    assert_eq!(engine.metrics_calls(), calls_after_first);

    let second = app.store().load("foo").expect("load").expect("foo");
    assert!(!second.changed);
    assert_eq!(second.change_state, Some(ChangeState::Unchanged));
    assert_eq!(second.score, first.score);
    assert_eq!(second.results, first.results);
    assert_eq!(second.last_processed_at, first.last_processed_at);

    let record_path = app.store().record_path("foo");
    let bytes_after_second = fs::read(&record_path).expect("record bytes");
    run(&app, &engine, &source, at(3));
    assert_eq!(fs::read(&record_path).expect("record bytes"), bytes_after_second);
}

#[test]
fn changed_artifact_is_evaluated_again() {
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let engine = ScriptedEngine::default();
    let source = default_source();
    run(&app, &engine, &source, at(1));

    source.put("mem://bar.owl", &BAR_OWL.replace("2024-01-05", "2024-03-02"));
    let outcome = run(&app, &engine, &source, at(2));

    assert_eq!(outcome.batch.outcomes["bar"], NamespaceOutcome::Evaluated);
    assert_eq!(outcome.batch.outcomes["foo"], NamespaceOutcome::Unchanged);
    let bar = app.store().load("bar").expect("load").expect("bar");
    assert!(bar.changed);
    assert_eq!(
        bar.version.as_deref(),
        Some("http://purl.obolibrary.org/obo/bar/releases/2024-03-02/bar.owl")
    );
    assert_eq!(bar.date.as_deref(), Some("2024-03-02"));
}

#[test]
fn engine_timeout_shows_na_and_is_retried_next_run() {
    // Pseudocode:
    // Given an engine that times out once on bar
    // When the dashboard runs twice over unchanged bytes
    // Then the first run records the timeout with NA badges and the second evaluates bar.
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let engine = ScriptedEngine::default().time_out("bar", 1);
    let source = default_source();

    let first = run(&app, &engine, &source, at(1));
    assert_eq!(
        first.batch.outcomes["bar"],
        NamespaceOutcome::Failed(FailureKind::EngineTimeout)
    );
    assert_eq!(first.batch.outcomes["foo"], NamespaceOutcome::Evaluated);

    let bar = app.store().load("bar").expect("load").expect("bar");
    assert_eq!(bar.failure, Some(FailureKind::EngineTimeout));
    assert!(bar.results.is_empty());
    assert_eq!(bar.score, Some(0.0));
    let bar_dir = app.store().namespace_dir("bar");
    let score_badge = fs::read_to_string(bar_dir.join(SCORE_BADGE_FILE)).expect("score badge");
    assert!(score_badge.contains("\"message\": \"NA\""));
    let qc_badge = fs::read_to_string(bar_dir.join(QC_BADGE_FILE)).expect("qc badge");
    assert!(qc_badge.contains("\"message\": \"Timeout\""));

    let second = run(&app, &engine, &source, at(2));
    assert_eq!(second.batch.outcomes["bar"], NamespaceOutcome::Evaluated);
    let bar = app.store().load("bar").expect("load").expect("bar");
    assert_eq!(bar.failure, None);
    assert_eq!(bar.results.len(), 13);
    assert!(bar.summary.is_some());
}

#[test]
fn failed_download_is_recorded_and_retried() {
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let engine = ScriptedEngine::default();
    let source = MemorySource::with(&[("mem://foo.owl", FOO_OWL)]);

    let first = run(&app, &engine, &source, at(1));
    assert_eq!(
        first.batch.outcomes["bar"],
        NamespaceOutcome::Failed(FailureKind::FailedDownload)
    );
    let bar = app.store().load("bar").expect("load").expect("bar");
    assert_eq!(bar.change_state, Some(ChangeState::Unknown));
    assert_eq!(bar.sha256_hash, None);

    source.put("mem://bar.owl", BAR_OWL);
    let second = run(&app, &engine, &source, at(2));
    assert_eq!(second.batch.outcomes["bar"], NamespaceOutcome::Evaluated);
    assert_eq!(second.batch.outcomes["foo"], NamespaceOutcome::Unchanged);
}

#[test]
fn score_command_matches_the_run_that_produced_the_records() {
    // Pseudocode:
    // Given a run where foo documents external usages and counts them in the OBO score
    // And a stored record for a namespace that is no longer tracked
    // When only the scoring pass is repeated
    // Then foo keeps its OBO score and the retired record is not rescored.
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let mut config = DashboardConfig::from_yaml_str(&format!("{CONFIG}obo_score_factors: all\n"))
        .expect("config");
    config.ontologies.custom[0].usages = vec![Usage::default(); 3];
    let engine = ScriptedEngine::default();
    let source = default_source();
    let deps = RunDeps {
        engine: &engine,
        source: &source,
        probe: &ReachableProbe,
    };
    let first = app.run(&config, deps, |_| true, at(1)).expect("run");
    let retired = OntologyRecord::new("retired");
    app.store().save(&retired).expect("save retired");

    let foo_after_run = app.store().load("foo").expect("load").expect("foo");
    let obo_after_run = foo_after_run.metrics[MetricName::OboScore.as_str()].clone();
    assert_eq!(obo_after_run["_impact_external"], serde_json::json!(0.5));

    let rescored = app
        .score(&config, &source, &ReachableProbe)
        .expect("score");
    assert_eq!(rescored, first.scored);
    assert!(rescored.iter().all(|scored| scored.namespace != "retired"));

    let foo = app.store().load("foo").expect("load").expect("foo");
    assert_eq!(foo.metrics[MetricName::OboScore.as_str()], obo_after_run);
    let retired = app.store().load("retired").expect("load").expect("retired");
    assert_eq!(retired.score, None);
}

#[test]
fn inconsistency_is_read_from_the_single_metrics_pass() {
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let engine = ScriptedEngine::default().inconsistent("bar");
    let outcome = run(&app, &engine, &default_source(), at(1));

    assert_eq!(
        outcome.batch.outcomes["bar"],
        NamespaceOutcome::Failed(FailureKind::InconsistentOntology)
    );
    assert_eq!(outcome.batch.outcomes["foo"], NamespaceOutcome::Evaluated);
    assert_eq!(engine.metrics_calls(), 2);
    let bar = app.store().load("bar").expect("load").expect("bar");
    assert_eq!(
        bar.metrics[MetricName::LogicalConsistency.as_str()],
        serde_json::json!(false)
    );
}

#[test]
fn failure_for_unchanged_bytes_survives_a_failed_download() {
    // Pseudocode:
    // Given bar failed evaluation for its current artifact
    // When one run cannot download bar and the next run gets the same bytes back
    // Then bar keeps the original failure and the engine is not asked again.
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let engine = ScriptedEngine::default().inconsistent("bar");
    let source = default_source();
    run(&app, &engine, &source, at(1));
    let failed = app.store().load("bar").expect("load").expect("bar");
    assert_eq!(failed.failure, Some(FailureKind::InconsistentOntology));
    let calls_after_first = engine.metrics_calls();

    source.remove("mem://bar.owl");
    let offline = run(&app, &engine, &source, at(2));
    assert_eq!(
        offline.batch.outcomes["bar"],
        NamespaceOutcome::Failed(FailureKind::FailedDownload)
    );
    let bar = app.store().load("bar").expect("load").expect("bar");
    assert_eq!(bar.failure, Some(FailureKind::InconsistentOntology));
    assert_eq!(bar.sha256_hash, failed.sha256_hash);
    assert_ne!(bar.change_state, Some(ChangeState::Unknown));

    source.put("mem://bar.owl", BAR_OWL);
    let restored = run(&app, &engine, &source, at(3));
    assert_eq!(restored.batch.outcomes["bar"], NamespaceOutcome::Unchanged);
    assert_eq!(engine.metrics_calls(), calls_after_first);
    let bar = app.store().load("bar").expect("load").expect("bar");
    assert_eq!(bar.failure, Some(FailureKind::InconsistentOntology));
}

#[test]
fn selection_limits_processing_but_not_rendering() {
    let root = tempdir().expect("tempdir");
    let app = Dashboard::new(root.path()).expect("dashboard");
    let engine = ScriptedEngine::default();
    let source = default_source();
    run(&app, &engine, &source, at(1));

    let deps = RunDeps {
        engine: &engine,
        source: &source,
        probe: &ReachableProbe,
    };
    let outcome = app
        .run(&config(), deps, |namespace| namespace == "foo", at(2))
        .expect("run");
    assert_eq!(outcome.batch.outcomes.len(), 1);
    assert!(outcome.batch.outcomes.contains_key("foo"));
    assert_eq!(outcome.scored.len(), 2);
}
