use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{DashboardConfig, RuntimeConfig};
use crate::engine::{OntologyEngine, RobotEngine};
use crate::error::Result;
use crate::fetch::{ArtifactSource, HttpFetcher, UrlProbe, sha256_file};
use crate::gate::apply_gate;
use crate::models::{ChangeState, OntologyRecord, OntologyTarget};
use crate::pipeline::{BatchReport, PipelineContext, ScoredNamespace, run_batch, score_records};
use crate::registry::{load_registry, resolve_targets};
use crate::render::{IndexHeader, RenderSummary, render_dashboard};
use crate::store::RecordStore;

pub const DASHBOARD_DIR: &str = "dashboard";
pub const BUILD_DIR: &str = "build/ontologies";
pub const PROFILE_FILE: &str = "profile.txt";

/// Collaborators used by a dashboard run.
#[derive(Clone, Copy)]
pub struct RunDeps<'a> {
    pub engine: &'a dyn OntologyEngine,
    pub source: &'a dyn ArtifactSource,
    pub probe: &'a dyn UrlProbe,
}

impl std::fmt::Debug for RunDeps<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunDeps").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRun {
    pub batch: BatchReport,
    pub scored: Vec<ScoredNamespace>,
    pub rendered: RenderSummary,
}

/// Dashboard workspace rooted at one directory.
#[derive(Debug, Clone)]
pub struct Dashboard {
    root: PathBuf,
    store: RecordStore,
    runtime: RuntimeConfig,
}

impl Dashboard {
    pub fn new(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root = root_dir.into();
        fs::create_dir_all(root.join(DASHBOARD_DIR))?;
        let store = RecordStore::new(root.join(DASHBOARD_DIR));
        Ok(Self {
            root,
            store,
            runtime: RuntimeConfig::from_env(),
        })
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    #[must_use]
    pub fn profile_path(&self) -> PathBuf {
        self.root.join(PROFILE_FILE)
    }

    /// Reads the registry and the OBO Foundry registry, then resolves the targets.
    pub fn resolve_targets(
        &self,
        config: &DashboardConfig,
        source: &dyn ArtifactSource,
        probe: &dyn UrlProbe,
    ) -> Result<BTreeMap<String, OntologyTarget>> {
        let registry = match config.registry_source() {
            Some(location) => load_registry(source, location)?,
            None => Vec::new(),
        };
        let obo_registry = load_registry(source, config.obo_registry()).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "OBO registry unavailable, metadata not enriched");
            Vec::new()
        });
        Ok(resolve_targets(config, &registry, &obo_registry, probe))
    }

    /// Writes the resolved lint profile to `profile.txt`.
    pub fn prepare_profile(
        &self,
        config: &DashboardConfig,
        source: &dyn ArtifactSource,
    ) -> Result<PathBuf> {
        let lines = config.profile.resolve(|location| source.fetch_text(location))?;
        let path = self.profile_path();
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Full run with the HTTP fetcher and the `robot` engine.
    pub fn run_default(
        &self,
        config: &DashboardConfig,
        select: impl Fn(&str) -> bool,
        now: DateTime<Utc>,
    ) -> Result<DashboardRun> {
        let fetcher = HttpFetcher::new(&self.runtime)?;
        let engine = RobotEngine::new(self.runtime.robot_bin.clone(), config.engine_timeout())
            .with_global_opts(config.robot_opts())
            .with_environment(config.environment.clone());
        let deps = RunDeps {
            engine: &engine,
            source: &fetcher,
            probe: &fetcher,
        };
        self.run(config, deps, select, now)
    }

    /// Pass 1 over the selected targets, then pass 2 and rendering over every record.
    pub fn run(
        &self,
        config: &DashboardConfig,
        deps: RunDeps<'_>,
        select: impl Fn(&str) -> bool,
        now: DateTime<Utc>,
    ) -> Result<DashboardRun> {
        let targets = self.resolve_targets(config, deps.source, deps.probe)?;
        let selected = targets
            .iter()
            .filter(|(id, _)| select(id))
            .map(|(id, target)| (id.clone(), target.clone()))
            .collect::<BTreeMap<_, _>>();
        let profile_path = self.prepare_profile(config, deps.source)?;

        let ctx = PipelineContext {
            config,
            engine: deps.engine,
            source: deps.source,
            probe: deps.probe,
            store: &self.store,
            build_dir: self.build_dir(),
            profile_path,
            prefix_map: config.robot_prefixes(targets.keys().map(String::as_str)),
            now,
        };
        let batch = run_batch(&ctx, &selected);

        let records = self.tracked_records(&targets)?;
        let (records, scored) = self.score_and_save(records, config, &targets)?;
        let rendered = self.render_records(&records, config, now, None)?;
        Ok(DashboardRun {
            batch,
            scored,
            rendered,
        })
    }

    /// Pass 2 alone with the HTTP fetcher resolving the registry.
    pub fn score_default(&self, config: &DashboardConfig) -> Result<Vec<ScoredNamespace>> {
        let fetcher = HttpFetcher::new(&self.runtime)?;
        self.score(config, &fetcher, &fetcher)
    }

    /// Pass 2 alone over the stored records of the current targets.
    pub fn score(
        &self,
        config: &DashboardConfig,
        source: &dyn ArtifactSource,
        probe: &dyn UrlProbe,
    ) -> Result<Vec<ScoredNamespace>> {
        let targets = self.resolve_targets(config, source, probe)?;
        let records = self.tracked_records(&targets)?;
        Ok(self.score_and_save(records, config, &targets)?.1)
    }

    /// Renders pages, badges and the results bundle from the stored records.
    pub fn render(
        &self,
        config: &DashboardConfig,
        now: DateTime<Utc>,
        engine_version: Option<String>,
    ) -> Result<RenderSummary> {
        let records = self.store.list()?;
        self.render_records(&records, config, now, engine_version)
    }

    /// Hashes `artifact` and applies the change gate to the stored record.
    pub fn gate(
        &self,
        namespace: &str,
        artifact: &Path,
        config: &DashboardConfig,
        now: DateTime<Utc>,
    ) -> Result<ChangeState> {
        let mut record = self
            .store
            .load(namespace)?
            .unwrap_or_else(|| OntologyRecord::new(namespace));
        let hash = sha256_file(artifact)?;
        let state = apply_gate(&mut record, &hash, now, config.force_regenerate_after());
        self.store.save(&record)?;
        Ok(state)
    }

    fn tracked_records(
        &self,
        targets: &BTreeMap<String, OntologyTarget>,
    ) -> Result<Vec<OntologyRecord>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|record| targets.contains_key(&record.namespace))
            .collect())
    }

    fn score_and_save(
        &self,
        mut records: Vec<OntologyRecord>,
        config: &DashboardConfig,
        targets: &BTreeMap<String, OntologyTarget>,
    ) -> Result<(Vec<OntologyRecord>, Vec<ScoredNamespace>)> {
        let weights = config.score_weights()?;
        let external_usages = targets
            .iter()
            .map(|(id, target)| (id.clone(), target.external_usage_count()))
            .collect();
        let scored = score_records(&mut records, config, &weights, &external_usages);
        for record in &records {
            self.store.save(record)?;
        }
        Ok((records, scored))
    }

    fn render_records(
        &self,
        records: &[OntologyRecord],
        config: &DashboardConfig,
        now: DateTime<Utc>,
        engine_version: Option<String>,
    ) -> Result<RenderSummary> {
        let header = IndexHeader {
            title: config.title().to_string(),
            description: config.description().to_string(),
            generated_on: now.format("%Y-%m-%d").to_string(),
            engine_version,
        };
        let prefixes = config.robot_prefixes(
            records.iter().map(|record| record.namespace.as_str()),
        );
        render_dashboard(
            &self.store,
            records,
            &header,
            &config.score_weights()?,
            &prefixes,
        )
    }
}

#[cfg(test)]
mod tests;
