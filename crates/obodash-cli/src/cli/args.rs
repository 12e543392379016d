use std::path::PathBuf;

use clap::Args;

pub const DEFAULT_CONFIG: &str = "dashboard-config.yml";

#[derive(Debug, Args)]
pub struct ConfigArg {
    /// Dashboard config (YAML, or TOML by extension), relative to `--root`.
    #[arg(long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArg,
    /// Only process namespaces matching this glob. Repeatable.
    #[arg(long = "only", value_name = "GLOB")]
    pub only: Vec<String>,
    /// Remove downloaded artifacts before processing.
    #[arg(long, default_value_t = false)]
    pub clean: bool,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub config: ConfigArg,
    /// Engine version shown in the index header.
    #[arg(long)]
    pub robot_version: Option<String>,
}

#[derive(Debug, Args)]
pub struct GateArgs {
    pub namespace: String,
    /// Downloaded artifact to hash.
    pub artifact: PathBuf,
    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(Debug, Args)]
pub struct ToJsonArgs {
    /// YAML file; the JSON lands next to it.
    pub yaml: PathBuf,
}

#[derive(Debug, Args)]
pub struct MdToHtmlArgs {
    pub input: PathBuf,
    /// Output path; defaults to the input with an `.html` extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Page title when the document has no top-level heading.
    #[arg(long, default_value = "OBO Dashboard")]
    pub title: String,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    /// Results bundles (`dashboard-results.yml` or `.json`), one row each.
    #[arg(required = true)]
    pub results: Vec<PathBuf>,
    #[arg(short, long, default_value = "summary.tsv")]
    pub output: PathBuf,
}
