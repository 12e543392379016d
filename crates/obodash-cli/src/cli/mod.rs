use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod args;


pub use args::{
    ConfigArg, GateArgs, MdToHtmlArgs, RenderArgs, RunArgs, SummarizeArgs, ToJsonArgs,
};

#[derive(Debug, Parser)]
#[command(name = "obodash")]
#[command(about = "OBO Foundry ontology dashboard", version)]
pub struct Cli {
    /// Working directory holding `dashboard/`, `build/` and the config file.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process the selected ontologies, then score and render every record.
    Run(RunArgs),
    /// Recompute dashboard and OBO scores for the stored records.
    Score(ConfigArg),
    /// Rebuild pages, badges and the results bundle from the stored records.
    Render(RenderArgs),
    /// Hash an artifact and report whether its namespace must be reprocessed.
    Gate(GateArgs),
    /// Convert a YAML document to a JSON sibling file.
    ToJson(ToJsonArgs),
    /// Render a markdown document into a standalone HTML page.
    MdToHtml(MdToHtmlArgs),
    /// Tabulate PASS counts per principle across results bundles.
    Summarize(SummarizeArgs),
}
