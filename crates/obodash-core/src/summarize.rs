//! Passing-check counts per dashboard run, as a TSV table over time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::models::CheckStatus;
use crate::render::ResultsBundle;

pub const TOTAL_COLUMN: &str = "total";
pub const DATE_COLUMN: &str = "date";

/// One row of the summary table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub date: String,
    pub counts: BTreeMap<String, u64>,
}

/// Counts ontologies and, per principle check, how many of them passed.
#[must_use]
pub fn summarize_run(bundle: &ResultsBundle) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for ontology in &bundle.ontologies {
        *counts.entry(TOTAL_COLUMN.to_string()).or_insert(0) += 1;
        for (check, result) in &ontology.results {
            if check.starts_with("FP") && result.status.known() == Some(CheckStatus::Pass) {
                *counts.entry(check.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Summarizes one results file, dated by the latest run date it contains.
pub fn summarize_file(path: &Path) -> Result<RunSummary> {
    let bundle = ResultsBundle::load(path)?;
    let date = bundle
        .ontologies
        .iter()
        .filter_map(|ontology| ontology.date.clone())
        .max()
        .unwrap_or_else(|| "unknown".to_string());
    Ok(RunSummary {
        date,
        counts: summarize_run(&bundle),
    })
}

/// Tab-separated table, columns sorted case-insensitively, missing counts as 0.
#[must_use]
pub fn summary_tsv(rows: &[RunSummary]) -> String {
    let mut columns = rows
        .iter()
        .flat_map(|row| row.counts.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .chain(std::iter::once(DATE_COLUMN.to_string()))
        .collect::<Vec<_>>();
    columns.sort_by_key(|column| column.to_lowercase());
    columns.dedup();

    let mut out = columns.join("\t");
    out.push('\n');
    for row in rows {
        let cells = columns
            .iter()
            .map(|column| {
                if column == DATE_COLUMN {
                    row.date.clone()
                } else {
                    row.counts.get(column).copied().unwrap_or(0).to_string()
                }
            })
            .collect::<Vec<_>>();
        let _ = writeln!(out, "{}", cells.join("\t"));
    }
    out
}
