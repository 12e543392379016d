//! Two-pass batch driver: evaluate every namespace, then score them against each other.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::checks::{CheckInputs, OntologyFacts, ProbeFacts, evaluate_all};
use crate::config::{DashboardConfig, ScoreWeights};
use crate::engine::{
    EngineError, LintReport, OntologyEngine, scan_ontology_header, truncate_report_rows,
};
use crate::error::Result;
use crate::fetch::{ArtifactSource, UrlProbe, sha256_file};
use crate::gate::{apply_gate, mark_unknown, within_redownload_window};
use crate::models::{FailureKind, MetricName, OntologyRecord, OntologyTarget, RecordedResult};
use crate::score::{impact_fraction, score_record};
use crate::store::{REPORT_TSV_FILE, RecordStore};
use crate::summary::summarize_results;
use crate::usage::UsageGraph;

/// Everything pass 1 needs to process one namespace.
pub struct PipelineContext<'a> {
    pub config: &'a DashboardConfig,
    pub engine: &'a dyn OntologyEngine,
    pub source: &'a dyn ArtifactSource,
    pub probe: &'a dyn UrlProbe,
    pub store: &'a RecordStore,
    pub build_dir: PathBuf,
    pub profile_path: PathBuf,
    pub prefix_map: BTreeMap<String, String>,
    pub now: DateTime<Utc>,
}

impl std::fmt::Debug for PipelineContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("store", &self.store.root())
            .field("build_dir", &self.build_dir)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "failure", rename_all = "snake_case")]
pub enum NamespaceOutcome {
    Evaluated,
    Unchanged,
    Skipped,
    Failed(FailureKind),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub outcomes: BTreeMap<String, NamespaceOutcome>,
}

impl BatchReport {
    #[must_use]
    pub fn count(&self, wanted: impl Fn(&NamespaceOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|outcome| wanted(outcome)).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, NamespaceOutcome::Failed(_)))
    }
}

/// Pass 1. A namespace error never aborts the batch; only store writes are fatal.
pub fn run_batch(
    ctx: &PipelineContext<'_>,
    targets: &BTreeMap<String, OntologyTarget>,
) -> BatchReport {
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, namespaces = targets.len(), "dashboard run started");

    let mut outcomes = BTreeMap::new();
    for (namespace, target) in targets {
        let outcome = match process_namespace(ctx, target) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(namespace = %namespace, error = %err, "namespace not persisted");
                NamespaceOutcome::Failed(FailureKind::FailedOntologyDashboard)
            }
        };
        outcomes.insert(namespace.clone(), outcome);
    }

    let report = BatchReport {
        run_id,
        started_at: ctx.now,
        outcomes,
    };
    tracing::info!(
        %run_id,
        evaluated = report.count(|outcome| *outcome == NamespaceOutcome::Evaluated),
        unchanged = report.count(|outcome| *outcome == NamespaceOutcome::Unchanged),
        failed = report.failed(),
        "dashboard run finished"
    );
    report
}

/// Acquires, gates and evaluates one namespace, then persists its record.
pub fn process_namespace(
    ctx: &PipelineContext<'_>,
    target: &OntologyTarget,
) -> Result<NamespaceOutcome> {
    let namespace = target.id.as_str();
    let mut record = match ctx.store.load(namespace) {
        Ok(Some(record)) => record,
        Ok(None) => OntologyRecord::new(namespace),
        Err(err) => {
            tracing::warn!(namespace, error = %err, "previous record unreadable");
            let mut record = OntologyRecord::new(namespace);
            return fail_before_hash(ctx, &mut record, FailureKind::CorruptedResultsFile);
        }
    };

    if within_redownload_window(&record, ctx.now, ctx.config.redownload_after()) {
        tracing::info!(namespace, "processed recently, skipping download");
        return Ok(NamespaceOutcome::Skipped);
    }
    if record.clear_transient_failure() {
        tracing::info!(namespace, "retrying after transient failure");
    }
    if record.failure.is_some_and(FailureKind::is_acquisition) {
        record.failure = None;
        tracing::info!(namespace, "retrying after acquisition failure");
    }
    record.base_generated = target.base_generated;
    record.source_url = target.mirror_from.clone();

    let Some(url) = target.mirror_from.as_deref() else {
        return fail_before_hash(ctx, &mut record, FailureKind::MissingUrl);
    };
    if target.base_ns.is_empty() {
        return fail_before_hash(ctx, &mut record, FailureKind::MissingBaseNamespaces);
    }

    let scratch = ctx.build_dir.join(namespace);
    fs::create_dir_all(&scratch)?;
    let raw = scratch.join(format!("{namespace}-raw.owl"));
    if let Err(err) = ctx.source.fetch_to(url, &raw) {
        tracing::warn!(namespace, url, error = %err, "download failed");
        return fail_before_hash(ctx, &mut record, FailureKind::FailedDownload);
    }
    let hash = match sha256_file(&raw) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::warn!(namespace, error = %err, "artifact could not be hashed");
            return fail_before_hash(ctx, &mut record, FailureKind::FailedSha256Hash);
        }
    };

    let state = apply_gate(
        &mut record,
        &hash,
        ctx.now,
        ctx.config.force_regenerate_after(),
    );
    let sticky_failure = record.failure.is_some();
    let needs_results = record.results.is_empty() && !sticky_failure;
    if sticky_failure || !(state.requires_processing() || needs_results) {
        tracing::info!(namespace, state = state.as_str(), "artifact unchanged, keeping results");
        ctx.store.save(&record)?;
        return Ok(NamespaceOutcome::Unchanged);
    }

    let outcome = match evaluate(ctx, target, &mut record, &raw) {
        Ok(()) => NamespaceOutcome::Evaluated,
        Err(kind) => {
            record.failure = Some(kind);
            record.results.clear();
            record.summary = None;
            NamespaceOutcome::Failed(kind)
        }
    };
    record.last_processed_at = Some(ctx.now);
    ctx.store.save(&record)?;
    Ok(outcome)
}

fn fail_before_hash(
    ctx: &PipelineContext<'_>,
    record: &mut OntologyRecord,
    kind: FailureKind,
) -> Result<NamespaceOutcome> {
    tracing::warn!(namespace = %record.namespace, failure = kind.as_str(), "namespace failed");
    // A failure tied to the stored hash outlives acquisition trouble; it clears only on new bytes.
    if let Some(recorded) = record.failure {
        tracing::info!(
            namespace = %record.namespace,
            failure = recorded.as_str(),
            "keeping failure recorded for the last artifact"
        );
    } else {
        record.failure = Some(kind);
        mark_unknown(record);
    }
    ctx.store.save(record)?;
    Ok(NamespaceOutcome::Failed(kind))
}

fn evaluate(
    ctx: &PipelineContext<'_>,
    target: &OntologyTarget,
    record: &mut OntologyRecord,
    raw: &Path,
) -> std::result::Result<(), FailureKind> {
    let namespace = target.id.as_str();
    let header = scan_ontology_header(raw).map_err(|err| {
        tracing::warn!(namespace, error = %err, "artifact header unreadable");
        FailureKind::NotAnOntology
    })?;
    if header.bucket_listing || !header.has_content {
        tracing::warn!(namespace, "downloaded file is not an ontology");
        return Err(FailureKind::NotAnOntology);
    }

    let engine = ctx.engine;
    let handle = engine
        .load(namespace, raw)
        .map_err(engine_failure(namespace, FailureKind::NotAnOntology))?;
    let metrics = engine
        .compute_metrics(&handle, &ctx.prefix_map)
        .map_err(engine_failure(namespace, FailureKind::BrokenMetricsFile))?;
    if metrics.axiom_count < 1 {
        return Err(FailureKind::EmptyOntology);
    }

    let base_prefixes = metrics.base_prefixes(&target.base_ns);
    record.metrics = metrics.to_record_metrics(&base_prefixes);
    record.base_prefixes.clone_from(&base_prefixes);
    if !metrics.consistent {
        return Err(FailureKind::InconsistentOntology);
    }

    let subject = if target.base_generated {
        engine
            .extract_base_subset(&handle, &target.base_ns)
            .map_err(engine_failure(namespace, FailureKind::FailedRobotBase))?
    } else {
        handle.clone()
    };

    let report = engine
        .run_lint_report(&subject, &ctx.profile_path)
        .map_err(engine_failure(namespace, FailureKind::FailedOntologyDashboard))?;
    if let Some(report) = &report {
        publish_report(ctx, namespace, report).map_err(|err| {
            tracing::error!(namespace, error = %err, "lint report not written");
            FailureKind::FailedOntologyDashboard
        })?;
    }

    let version_iri = handle.version_iri.clone().or(header.version_iri);
    let facts = OntologyFacts {
        version_iri: version_iri.clone(),
        syntax: metrics.syntax.clone().or_else(|| handle.syntax.clone()),
        metrics,
        base_namespaces: target.base_ns.clone(),
        base_prefixes,
    };
    let inputs = CheckInputs {
        namespace,
        metadata: Some(&target.metadata),
        ontology: Some(&facts),
        report: report.as_ref(),
        probes: ProbeFacts::gather(Some(&target.metadata), version_iri.as_deref(), ctx.probe),
        today: ctx.now.date_naive(),
    };
    let results = evaluate_all(&inputs);

    record.summary = Some(summarize_results(&results));
    record.results = results
        .into_iter()
        .map(|(label, result)| (label, RecordedResult::from(result)))
        .collect();
    record.version = version_iri;
    record.date = Some(ctx.now.format("%Y-%m-%d").to_string());
    tracing::info!(
        namespace,
        status = record.summary_status().map_or("NONE", |status| status.as_str()),
        "namespace evaluated"
    );
    Ok(())
}

fn engine_failure(
    namespace: &str,
    kind: FailureKind,
) -> impl Fn(EngineError) -> FailureKind + '_ {
    move |err| {
        tracing::warn!(namespace, error = %err, "engine call failed");
        if err.is_timeout() {
            FailureKind::EngineTimeout
        } else {
            kind
        }
    }
}

fn publish_report(ctx: &PipelineContext<'_>, namespace: &str, report: &LintReport) -> Result<()> {
    let limit = ctx.config.report_truncation_limit();
    let published = truncate_report_rows(report, limit);
    if published.rows().len() < report.rows().len() {
        tracing::info!(
            namespace,
            kept = published.rows().len(),
            total = report.rows().len(),
            "lint report truncated"
        );
    }
    ctx.store
        .write_text(Path::new(namespace).join(REPORT_TSV_FILE), &published.to_tsv())?;
    Ok(())
}

/// Per-namespace result of pass 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredNamespace {
    pub namespace: String,
    pub dashboard_score: f64,
    pub obo_score: f64,
    pub usage_count: usize,
}

/// Pass 2: builds the usage graph over every record and writes scores back.
///
/// `external_usages` maps a namespace to its documented registry usages.
pub fn score_records(
    records: &mut [OntologyRecord],
    config: &DashboardConfig,
    weights: &ScoreWeights,
    external_usages: &BTreeMap<String, usize>,
) -> Vec<ScoredNamespace> {
    let graph = UsageGraph::from_records(records.iter());
    let strategy = config.dashboard_score_formula;
    let mode = config.obo_score_factors;

    records
        .iter_mut()
        .map(|record| {
            let namespace = record.namespace.clone();
            let usage_count = graph.usage_count(&namespace);
            let impact = impact_fraction(usage_count, graph.tracked());
            let external = external_usages.get(&namespace).copied().unwrap_or(0);
            let (dashboard, obo) =
                score_record(record, strategy, weights, mode, impact, external);

            record.score = Some(dashboard.value());
            record.metrics.insert(
                MetricName::UsageCount.as_str().to_string(),
                serde_json::json!(usage_count),
            );
            record.metrics.insert(
                MetricName::UsedBy.as_str().to_string(),
                serde_json::json!(graph.used_by(&namespace)),
            );
            match serde_json::to_value(obo.to_metric()) {
                Ok(value) => {
                    record
                        .metrics
                        .insert(MetricName::OboScore.as_str().to_string(), value);
                }
                Err(err) => {
                    tracing::warn!(namespace = %namespace, error = %err, "OBO score not stored");
                    record.metrics.remove(MetricName::OboScore.as_str());
                }
            }
            ScoredNamespace {
                namespace,
                dashboard_score: dashboard.value(),
                obo_score: obo.score,
                usage_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckResult, LevelCounts};

    fn scored_record(namespace: &str, prefixes: &[&str], uses: &[&str]) -> OntologyRecord {
        let mut record = OntologyRecord::new(namespace);
        record.base_prefixes = prefixes.iter().map(|prefix| prefix.to_string()).collect();
        let usage = uses
            .iter()
            .map(|prefix| (prefix.to_string(), serde_json::json!(3)))
            .collect::<serde_json::Map<_, _>>();
        record.metrics.insert(
            MetricName::NamespaceUsage.as_str().to_string(),
            serde_json::Value::Object(usage),
        );
        record.results.insert(
            "FP01 Open".to_string(),
            RecordedResult::from(CheckResult::pass()),
        );
        record.results.insert(
            "ROBOT Report".to_string(),
            RecordedResult::from(CheckResult::pass().with_counts(LevelCounts::default())),
        );
        record
    }

    #[test]
    fn score_pass_writes_usage_and_scores() {
        let mut records = vec![
            scored_record("ro", &["RO"], &["RO"]),
            scored_record("go", &["GO"], &["GO", "RO"]),
        ];
        let config = DashboardConfig::default();
        let scored = score_records(&mut records, &config, &ScoreWeights::default(), &BTreeMap::new());

        assert_eq!(scored.len(), 2);
        let ro = &records[0];
        assert_eq!(ro.metric_u64(MetricName::UsageCount.as_str()), Some(1));
        assert_eq!(ro.score, Some(100.0));
        // (3*1 + 2*1) / 5
        assert_eq!(scored[0].obo_score, 1.0);
        // (3*0 + 2*1) / 5
        assert_eq!(scored[1].obo_score, 0.4);
        let obo = ro
            .metrics
            .get(MetricName::OboScore.as_str())
            .and_then(|value| value.get("_formula"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(obo, Some("(3*impact+2*dashboard)/5"));
    }

    #[test]
    fn failed_record_scores_zero_in_score_pass() {
        let mut records = vec![scored_record("foo", &["FOO"], &[])];
        records[0].failure = Some(FailureKind::EmptyOntology);
        let scored = score_records(
            &mut records,
            &DashboardConfig::default(),
            &ScoreWeights::default(),
            &BTreeMap::new(),
        );
        assert_eq!(scored[0].dashboard_score, 0.0);
        assert_eq!(scored[0].obo_score, 0.0);
        assert_eq!(records[0].score, Some(0.0));
    }

    #[test]
    fn obo_score_metric_replaces_previous_value_with_breakdown() {
        let mut records = vec![scored_record("foo", &["FOO"], &[])];
        records[0].failure = Some(FailureKind::EngineTimeout);
        records[0].metrics.insert(
            MetricName::OboScore.as_str().to_string(),
            serde_json::json!("stale"),
        );
        score_records(
            &mut records,
            &DashboardConfig::default(),
            &ScoreWeights::default(),
            &BTreeMap::new(),
        );
        let obo = &records[0].metrics[MetricName::OboScore.as_str()];
        assert!(obo.is_object(), "got: {obo}");
        assert_eq!(obo["oboscore"], serde_json::json!(0.0));
        assert_eq!(obo["_formula"], "(3*impact+2*dashboard)/5");
    }

    #[test]
    fn batch_report_counts_failures() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("a".to_string(), NamespaceOutcome::Evaluated);
        outcomes.insert(
            "b".to_string(),
            NamespaceOutcome::Failed(FailureKind::MissingUrl),
        );
        let report = BatchReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            outcomes,
        };
        assert_eq!(report.failed(), 1);
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["outcomes"]["b"]["failure"], "missing_url");
    }
}
