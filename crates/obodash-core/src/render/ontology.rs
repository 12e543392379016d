use std::fmt::Write as _;

use serde_json::Value;

use super::html::{escape_attribute, escape_text, page};
use crate::checks::CheckId;
use crate::models::{CheckStatus, OntologyRecord, RecordedResult};

const REPORT_PAGE: &str = "robot_report.html";

/// Bootstrap alert class for a summary status.
#[must_use]
pub const fn alert_class(status: Option<CheckStatus>) -> &'static str {
    match status {
        Some(CheckStatus::Error) => "alert-danger",
        Some(CheckStatus::Warn) => "alert-warning",
        Some(CheckStatus::Info) => "alert-info",
        Some(CheckStatus::Pass) | None => "alert-primary",
    }
}

/// Per-namespace dashboard page (`<ns>/dashboard.html`).
#[must_use]
pub fn render_ontology_page(record: &OntologyRecord) -> String {
    let mut body = String::new();
    body.push_str("<div class=\"row\"><div class=\"col-md-2\"></div><div class=\"col-md-8\">\n");
    let _ = writeln!(
        body,
        "<h1>Dashboard Report - <a href=\"http://obofoundry.org/ontology/{0}.html\">{0}</a></h1>",
        escape_attribute(&record.namespace)
    );
    let _ = writeln!(
        body,
        "<p class=\"lead\">Version: {}<br>\nDate ran: {}</p>",
        escape_text(record.version.as_deref().unwrap_or("unknown")),
        escape_text(record.date.as_deref().unwrap_or("unknown"))
    );

    if let Some(failure) = record.failure {
        let _ = writeln!(
            body,
            "<div class=\"alert alert-danger\"><center><h3>{}</h3></center></div>",
            escape_text(failure.label())
        );
    } else if let Some(summary) = &record.summary {
        let mut heading = summary.status.as_str().to_string();
        if !summary.comment.is_empty() {
            let _ = write!(heading, " - {}", summary.comment);
        }
        let _ = writeln!(
            body,
            "<div class=\"alert {}\"><center><h3>{}</h3></center></div>",
            alert_class(Some(summary.status)),
            escape_text(&heading)
        );
    }

    if !record.results.is_empty() {
        push_results_table(&mut body, record);
    }
    push_metrics_table(&mut body, record);
    body.push_str("</div></div>\n");
    page(&format!("{} Dashboard Report", record.namespace), &body)
}

fn ordered_results(record: &OntologyRecord) -> Vec<(&str, &RecordedResult)> {
    let mut known = CheckId::ALL
        .into_iter()
        .filter_map(|id| {
            record
                .results
                .get_key_value(id.label())
                .map(|(label, result)| (label.as_str(), result))
        })
        .collect::<Vec<_>>();
    known.extend(
        record
            .results
            .iter()
            .filter(|(label, _)| CheckId::from_label(label).is_none())
            .map(|(label, result)| (label.as_str(), result)),
    );
    known
}

fn push_results_table(body: &mut String, record: &OntologyRecord) {
    body.push_str("<table class=\"table\">\n  <tr><th>Check</th><th>Status</th><th>Comment</th><th>Resources</th></tr>\n");
    for (label, result) in ordered_results(record) {
        let (url, name) = match CheckId::from_label(label) {
            Some(id) if id.principle().is_some() => (
                id.documentation_url(),
                label.split_once(' ').map_or(label, |(_, name)| name),
            ),
            Some(id) => (id.documentation_url(), label),
            None => ("#".to_string(), label),
        };
        let resource = match result.file.as_deref() {
            Some(_) => format!("<a href=\"{REPORT_PAGE}\">View Report</a>"),
            None => String::new(),
        };
        let _ = writeln!(
            body,
            "  <tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_attribute(&url),
            escape_text(name),
            escape_text(result.status.label()),
            escape_text(result.comment.as_deref().unwrap_or_default()),
            resource
        );
    }
    body.push_str("</table>\n");
}

fn push_metrics_table(body: &mut String, record: &OntologyRecord) {
    let scalars = record
        .metrics
        .iter()
        .filter_map(|(name, value)| scalar_text(value).map(|text| (name, text)))
        .collect::<Vec<_>>();
    if scalars.is_empty() && record.score.is_none() {
        return;
    }
    body.push_str("<h2>Metrics</h2>\n<table class=\"table table-sm\">\n");
    if let Some(score) = record.score.filter(|_| record.failure.is_none()) {
        let _ = writeln!(body, "  <tr><td>OBO Dashboard Score</td><td>{score:.2}</td></tr>");
    }
    for (name, text) in scalars {
        let _ = writeln!(
            body,
            "  <tr><td>{}</td><td>{}</td></tr>",
            escape_text(name),
            escape_text(&text)
        );
    }
    body.push_str("</table>\n");
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(map) => map
            .get("oboscore")
            .and_then(Value::as_f64)
            .map(|score| format!("{score:.3}")),
        Value::Null => None,
    }
}
