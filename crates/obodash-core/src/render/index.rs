use std::fmt::Write as _;

use super::html::{escape_attribute, escape_text, page};
use crate::checks::CheckId;
use crate::models::{CheckStatus, OntologyRecord};

/// Header facts shown above the index table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHeader {
    pub title: String,
    pub description: String,
    pub generated_on: String,
    pub engine_version: Option<String>,
}

/// Stable order: records with an ERROR summary after the others, records without a summary last.
#[must_use]
pub fn index_order(records: &[OntologyRecord]) -> Vec<&OntologyRecord> {
    let mut ordered = records.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|record| match record.summary_status() {
        Some(CheckStatus::Error) => 1,
        Some(_) => 0,
        None => 2,
    });
    ordered
}

const fn cell_class(status: Option<CheckStatus>) -> &'static str {
    match status {
        Some(CheckStatus::Pass) => "table-success",
        Some(CheckStatus::Info) => "table-info",
        Some(CheckStatus::Warn) => "table-warning",
        Some(CheckStatus::Error) => "table-danger",
        None => "table-secondary",
    }
}

#[must_use]
pub fn render_index_page(header: &IndexHeader, records: &[OntologyRecord]) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape_text(&header.title));
    let _ = writeln!(body, "<p class=\"lead\">{}</p>", escape_text(&header.description));
    let _ = write!(body, "<p>Last updated {}", escape_text(&header.generated_on));
    if let Some(version) = &header.engine_version {
        let _ = write!(body, " with ROBOT {}", escape_text(version));
    }
    body.push_str("</p>\n<table class=\"table table-sm\">\n  <tr><th>Ontology</th><th>Score</th>");
    for id in CheckId::ALL {
        let short = id.label().split_once(' ').map_or(id.label(), |(head, _)| head);
        let _ = write!(
            body,
            "<th><abbr title=\"{}\">{}</abbr></th>",
            escape_attribute(id.label()),
            escape_text(if id.principle().is_some() { short } else { "Report" })
        );
    }
    body.push_str("<th>Summary</th></tr>\n");

    for record in index_order(records) {
        let namespace = escape_attribute(&record.namespace);
        let _ = write!(
            body,
            "  <tr><td><a href=\"{namespace}/dashboard.html\">{}</a></td>",
            escape_text(&record.namespace)
        );
        match (record.failure, record.score) {
            (None, Some(score)) => {
                let _ = write!(body, "<td>{score:.2}</td>");
            }
            _ => body.push_str("<td>NA</td>"),
        }

        if let Some(failure) = record.failure {
            let _ = write!(
                body,
                "<td class=\"table-danger\" colspan=\"{}\">{}</td>",
                CheckId::ALL.len() + 1,
                escape_text(failure.label())
            );
        } else {
            for id in CheckId::ALL {
                let result = record.results.get(id.label());
                let status = result.and_then(|result| result.status.known());
                let title = result
                    .and_then(|result| result.comment.as_deref())
                    .unwrap_or_default();
                let _ = write!(
                    body,
                    "<td class=\"{}\" title=\"{}\">{}</td>",
                    cell_class(status),
                    escape_attribute(title),
                    status.map_or("", CheckStatus::as_str)
                );
            }
            let summary = record.summary_status();
            let _ = write!(
                body,
                "<td class=\"{}\">{}</td>",
                cell_class(summary),
                summary.map_or("", CheckStatus::as_str)
            );
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</table>\n");
    page(&header.title, &body)
}
