use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use obodash_core::Dashboard;
use obodash_core::render::{render_markdown_page, yaml_to_json};
use obodash_core::summarize::{summarize_file, summary_tsv};
use serde_json::json;

use crate::cli::{Commands, GateArgs, MdToHtmlArgs, RenderArgs, RunArgs, SummarizeArgs};

mod support;

#[cfg(test)]
mod tests;

use self::support::{NamespaceSelector, load_config, print_json};

pub(crate) fn run_from_root(root: &Path, command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run(&open(root)?, root, &args),
        Commands::Score(args) => {
            let app = open(root)?;
            let config = load_config(root, &args.config)?;
            let scored = app
                .score_default(&config)
                .context("failed to score records")?;
            print_json(&scored)
        }
        Commands::Render(RenderArgs {
            config,
            robot_version,
        }) => {
            let app = open(root)?;
            let config = load_config(root, &config.config)?;
            let summary = app
                .render(&config, Utc::now(), robot_version)
                .context("failed to render dashboard")?;
            print_json(&summary)
        }
        Commands::Gate(args) => gate(&open(root)?, root, &args),
        Commands::ToJson(args) => {
            let output = yaml_to_json(&args.yaml)
                .with_context(|| format!("failed to convert {}", args.yaml.display()))?;
            print_json(&json!({ "output": output }))
        }
        Commands::MdToHtml(args) => convert_markdown(&args),
        Commands::Summarize(args) => summarize(&args),
    }
}

fn open(root: &Path) -> Result<Dashboard> {
    Dashboard::new(root).context("failed to open dashboard root")
}

fn gate(app: &Dashboard, root: &Path, args: &GateArgs) -> Result<()> {
    let config = load_config(root, &args.config.config)?;
    let state = app
        .gate(&args.namespace, &args.artifact, &config, Utc::now())
        .with_context(|| format!("failed to gate {}", args.namespace))?;
    print_json(&json!({
        "namespace": args.namespace,
        "change_state": state,
        "requires_processing": state.requires_processing(),
    }))
}

fn run(app: &Dashboard, root: &Path, args: &RunArgs) -> Result<()> {
    let config = load_config(root, &args.config.config)?;
    let selector = NamespaceSelector::new(&args.only)?;
    if args.clean {
        let build_dir = app.build_dir();
        if build_dir.exists() {
            fs::remove_dir_all(&build_dir)
                .with_context(|| format!("failed to clean {}", build_dir.display()))?;
        }
    }
    let outcome = app
        .run_default(&config, |namespace| selector.matches(namespace), Utc::now())
        .context("dashboard run failed")?;
    if outcome.batch.failed() > 0 {
        tracing::warn!(
            failed = outcome.batch.failed(),
            "some ontologies failed; see their records for details"
        );
    }
    print_json(&outcome)
}

fn convert_markdown(args: &MdToHtmlArgs) -> Result<()> {
    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("html"));
    fs::write(&output, render_markdown_page(&content, &args.title))
        .with_context(|| format!("failed to write {}", output.display()))?;
    print_json(&json!({ "output": output }))
}

fn summarize(args: &SummarizeArgs) -> Result<()> {
    let rows = args
        .results
        .iter()
        .map(|path| {
            summarize_file(path).with_context(|| format!("failed to summarize {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    fs::write(&args.output, summary_tsv(&rows))
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    print_json(&json!({ "output": args.output, "rows": rows.len() }))
}
