use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{EngineError, EngineResult, LintReport, OntologyEngine, OntologyHandle};
use crate::engine::header::scan_ontology_header;
use crate::host_tools::{HostCommandResult, HostCommandSpec, run_host_command};
use crate::models::MetricsBundle;

const STDERR_EXCERPT_CHARS: usize = 600;

/// [`OntologyEngine`] backed by the ROBOT command-line tool.
#[derive(Debug, Clone)]
pub struct RobotEngine {
    program: String,
    global_opts: Vec<String>,
    timeout: Duration,
    environment: BTreeMap<String, String>,
}

impl RobotEngine {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            global_opts: Vec::new(),
            timeout,
            environment: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_global_opts(mut self, opts: Vec<String>) -> Self {
        self.global_opts = opts;
        self
    }

    /// Extra variables for the child process, e.g. `ROBOT_JAVA_ARGS`.
    #[must_use]
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    fn command_args(&self, subcommand: &str, rest: Vec<String>) -> Vec<String> {
        let mut args = self.global_opts.clone();
        args.push(subcommand.to_string());
        args.extend(rest);
        args
    }

    fn run(&self, operation: &str, args: &[String], cwd: &Path) -> EngineResult<()> {
        let spec = HostCommandSpec::new(operation, &self.program, args)
            .with_current_dir(cwd)
            .with_envs(&self.environment)
            .with_timeout(self.timeout);
        match run_host_command(spec) {
            HostCommandResult::Completed { success: true, .. } => Ok(()),
            HostCommandResult::Completed { stderr, .. } => Err(EngineError::Failed {
                operation: operation.to_string(),
                detail: excerpt(&stderr),
            }),
            HostCommandResult::TimedOut { after } => Err(EngineError::Timeout {
                operation: operation.to_string(),
                after,
            }),
            HostCommandResult::SpawnError { error } => Err(EngineError::Failed {
                operation: operation.to_string(),
                detail: format!("cannot start {}: {error}", self.program),
            }),
            HostCommandResult::Blocked { reason } => Err(EngineError::Blocked {
                operation: operation.to_string(),
                reason,
            }),
        }
    }
}

impl OntologyEngine for RobotEngine {
    fn load(&self, namespace: &str, source: &Path) -> EngineResult<OntologyHandle> {
        let header = scan_ontology_header(source).map_err(|err| EngineError::Failed {
            operation: "robot:load".to_string(),
            detail: format!("{}: {err}", source.display()),
        })?;
        if !header.has_content {
            return Err(EngineError::Failed {
                operation: "robot:load".to_string(),
                detail: format!("{} is empty", source.display()),
            });
        }
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
        prefix_map: &BTreeMap<String, String>,
    ) -> EngineResult<MetricsBundle> {
        let output = sibling(handle, "metrics.yml");
        let mut rest = vec!["--input".to_string(), path_arg(&handle.path)];
        for (prefix, iri) in prefix_map {
            rest.push("--prefix".to_string());
            rest.push(format!("{prefix}: {iri}"));
        }
        rest.extend(
            ["--metrics", "extended-reasoner", "--format", "yaml", "--output"]
                .map(ToString::to_string),
        );
        rest.push(path_arg(&output));

        let args = self.command_args("measure", rest);
        self.run("robot:measure", &args, handle.scratch_dir())?;

        let raw = fs::read_to_string(&output).map_err(|err| EngineError::UnreadableOutput {
            path: output.clone(),
            detail: err.to_string(),
        })?;
        let mut bundle =
            MetricsBundle::from_yaml_str(&raw).map_err(|err| EngineError::UnreadableOutput {
                path: output,
                detail: err.to_string(),
            })?;
        if bundle.syntax.is_none() {
            bundle.syntax = handle.syntax.clone();
        }
        Ok(bundle)
    }

    fn extract_base_subset(
        &self,
        handle: &OntologyHandle,
        base_namespaces: &[String],
    ) -> EngineResult<OntologyHandle> {
        let output = handle.scratch_dir().join(format!("{}.owl", handle.namespace));
        let mut rest = vec!["--input".to_string(), path_arg(&handle.path)];
        for namespace in base_namespaces {
            rest.push("--base-iri".to_string());
            rest.push(namespace.clone());
        }
        rest.extend(
            [
                "--axioms",
                "external",
                "--preserve-structure",
                "false",
                "--trim",
                "false",
                "--output",
            ]
            .map(ToString::to_string),
        );
        rest.push(path_arg(&output));

        let args = self.command_args("remove", rest);
        self.run("robot:base", &args, handle.scratch_dir())?;

        let mut base = self.load(&handle.namespace, &output)?;
        if base.version_iri.is_none() {
            base.version_iri = handle.version_iri.clone();
        }
        if base.syntax.is_none() {
            base.syntax = handle.syntax.clone();
        }
        Ok(base)
    }

    fn run_lint_report(
        &self,
        handle: &OntologyHandle,
        profile: &Path,
    ) -> EngineResult<Option<LintReport>> {
        let output = sibling(handle, "robot_report.tsv");
        let mut rest = vec![
            "--input".to_string(),
            path_arg(&handle.path),
            "--profile".to_string(),
            path_arg(profile),
        ];
        rest.extend(
            ["--labels", "false", "--fail-on", "none", "--output"].map(ToString::to_string),
        );
        rest.push(path_arg(&output));

        let args = self.command_args("report", rest);
        match self.run("robot:report", &args, handle.scratch_dir()) {
            Ok(()) => {}
            Err(err @ EngineError::Timeout { .. }) => return Err(err),
            Err(err) => {
                tracing::warn!(namespace = %handle.namespace, error = %err, "lint report not generated");
                return Ok(None);
            }
        }

        match LintReport::load(&output) {
            Ok(report) => Ok(Some(report)),
            Err(err) => {
                tracing::warn!(namespace = %handle.namespace, error = %err, "lint report unreadable");
                Ok(None)
            }
        }
    }
}

fn sibling(handle: &OntologyHandle, suffix: &str) -> PathBuf {
    let stem = handle
        .path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(handle.namespace.as_str());
    handle.scratch_dir().join(format!("{stem}-{suffix}"))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.chars().count() <= STDERR_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let tail = trimmed
        .chars()
        .rev()
        .take(STDERR_EXCERPT_CHARS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<String>();
    format!("...{tail}")
}
