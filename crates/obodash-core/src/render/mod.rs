//! Static HTML pages, shields badges and the aggregated results export.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::checks::CheckId;
use crate::config::ScoreWeights;
use crate::engine::LintReport;
use crate::error::Result;
use crate::models::OntologyRecord;
use crate::store::RecordStore;

mod badge;
mod export;
mod html;
mod index;
#[cfg(feature = "markdown")]
mod markdown;
mod ontology;
mod report;

pub use badge::{QC_LABEL, SCORE_LABEL, qc_badge, score_badge};
pub use export::{OboScoreWeights, ResultsBundle, yaml_to_json};
pub use html::{escape_attribute, escape_text};
pub use index::{IndexHeader, index_order, render_index_page};
#[cfg(feature = "markdown")]
pub use markdown::{MarkdownDocument, render_markdown, render_markdown_html, render_markdown_page};
pub use ontology::{alert_class, render_ontology_page};
pub use report::{link_cell, render_report_page, row_class};

pub const INDEX_PAGE: &str = "index.html";
pub const ONTOLOGY_PAGE: &str = "dashboard.html";
pub const REPORT_PAGE: &str = "robot_report.html";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub pages: usize,
    pub badges: usize,
    pub reports: usize,
}

/// Renders every namespace page and badge, then the index and results bundle.
///
/// `prefixes` resolves CURIEs in lint report cells.
pub fn render_dashboard(
    store: &RecordStore,
    records: &[OntologyRecord],
    header: &IndexHeader,
    weights: &ScoreWeights,
    prefixes: &BTreeMap<String, String>,
) -> Result<RenderSummary> {
    let mut summary = RenderSummary::default();
    for record in records {
        let namespace = record.namespace.as_str();
        store.write_badges(namespace, &qc_badge(record), &score_badge(record))?;
        summary.badges += 2;

        store.write_text(
            Path::new(namespace).join(ONTOLOGY_PAGE),
            &render_ontology_page(record),
        )?;
        summary.pages += 1;

        let report_path = store.report_path(namespace);
        if report_path.is_file() {
            match LintReport::load(&report_path) {
                Ok(report) => {
                    let totals = record
                        .results
                        .get(CheckId::RobotReport.label())
                        .and_then(|result| result.results);
                    store.write_text(
                        Path::new(namespace).join(REPORT_PAGE),
                        &render_report_page(namespace, &report, totals, prefixes),
                    )?;
                    summary.reports += 1;
                }
                Err(err) => {
                    tracing::warn!(namespace, error = %err, "published lint report unreadable");
                }
            }
        }
    }

    store.write_text(INDEX_PAGE, &render_index_page(header, records))?;
    summary.pages += 1;

    let ordered = index_order(records).into_iter().cloned().collect();
    ResultsBundle::new(ordered, weights).write(store)?;
    tracing::info!(
        pages = summary.pages,
        reports = summary.reports,
        "dashboard rendered"
    );
    Ok(summary)
}
