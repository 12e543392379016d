use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::html::{escape_text, external_link, page};
use crate::engine::LintReport;
use crate::models::{CheckStatus, LevelCounts};

const REPORT_QUERY_DOCS: &str = "http://robot.obolibrary.org/report_queries/";
const OBO_PURL: &str = "http://purl.obolibrary.org/obo/";

const KNOWN_RULES: [&str; 30] = [
    "annotation_whitespace",
    "deprecated_boolean_datatype",
    "deprecated_class_reference",
    "deprecated_property_reference",
    "duplicate_definition",
    "duplicate_exact_synonym",
    "duplicate_label_synonym",
    "duplicate_label",
    "duplicate_scoped_synonym",
    "equivalent_class_axiom_no_genus",
    "equivalent_pair",
    "illegal_use_of_built_in_vocabulary",
    "invalid_xref",
    "label_formatting",
    "label_whitespace",
    "lowercase_definition",
    "missing_definition",
    "missing_label",
    "missing_obsolete_label",
    "missing_ontology_description",
    "missing_ontology_license",
    "missing_ontology_title",
    "missing_subset_declaration",
    "missing_superclass",
    "misused_obsolete_label",
    "misused_replaced_by",
    "multiple_definitions",
    "multiple_equivalent_classes",
    "multiple_equivalent_class_definitions",
    "multiple_labels",
];

const WELL_KNOWN_PREFIXES: [(&str, &str); 6] = [
    ("terms", "http://purl.org/dc/terms/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("oboInOwl", "http://www.geneontology.org/formats/oboInOwl#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
];

#[must_use]
pub const fn row_class(level: CheckStatus) -> &'static str {
    match level {
        CheckStatus::Pass => "table-success",
        CheckStatus::Info => "table-info",
        CheckStatus::Warn => "table-warning",
        CheckStatus::Error => "table-danger",
    }
}

/// Lint report page. `totals` are the counts before truncation, when known.
#[must_use]
pub fn render_report_page(
    namespace: &str,
    report: &LintReport,
    totals: Option<LevelCounts>,
    prefixes: &BTreeMap<String, String>,
) -> String {
    let totals = totals.unwrap_or_else(|| report.level_counts());
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{} ROBOT Report</h1>", escape_text(namespace));
    let _ = writeln!(
        body,
        "<p class=\"lead\">{} errors, {} warnings, {} info messages</p>",
        totals.error, totals.warn, totals.info
    );
    if report.rows().len() as u64 != totals.total() {
        let _ = writeln!(
            body,
            "<p>Showing {} of {} rows. Errors are always listed.</p>",
            report.rows().len(),
            totals.total()
        );
    }

    body.push_str("<h2>Violations by rule</h2>\n<table class=\"table table-sm\">\n");
    body.push_str("  <tr><th>Rule</th><th>Count</th></tr>\n");
    for (rule, count) in report.rule_counts() {
        let _ = writeln!(
            body,
            "  <tr><td>{}</td><td>{count}</td></tr>",
            link_cell(&rule, prefixes)
        );
    }
    body.push_str("</table>\n");

    body.push_str("<table class=\"table\">\n");
    body.push_str(
        "  <tr><th>Level</th><th>Rule Name</th><th>Subject</th><th>Property</th><th>Value</th></tr>\n",
    );
    for row in report.rows() {
        let _ = writeln!(
            body,
            "  <tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row_class(row.level),
            row.level.as_str(),
            link_cell(&row.rule_name, prefixes),
            link_cell(&row.subject, prefixes),
            link_cell(&row.property, prefixes),
            link_cell(&row.value, prefixes)
        );
    }
    body.push_str("</table>\n");
    page(&format!("{namespace} ROBOT Report"), &body)
}

/// Escaped cell content, wrapped in a link when it names a rule, CURIE or OBO IRI.
#[must_use]
pub fn link_cell(cell: &str, prefixes: &BTreeMap<String, String>) -> String {
    match cell_url(cell, prefixes) {
        Some(url) => external_link(&url, cell),
        None => escape_text(cell),
    }
}

fn cell_url(cell: &str, prefixes: &BTreeMap<String, String>) -> Option<String> {
    if KNOWN_RULES.contains(&cell) {
        return Some(format!("{REPORT_QUERY_DOCS}{cell}"));
    }
    if let Some(start) = cell.find(OBO_PURL) {
        let iri = cell[start..]
            .split(|ch: char| ch.is_whitespace() || ch == '<' || ch == '>')
            .next()
            .unwrap_or_default();
        return Some(iri.to_string());
    }
    let (prefix, local) = find_curie(cell)?;
    let namespace = prefixes
        .get(prefix)
        .map(String::as_str)
        .or_else(|| {
            WELL_KNOWN_PREFIXES
                .iter()
                .find(|(known, _)| *known == prefix)
                .map(|(_, iri)| *iri)
        })
        .map(ToString::to_string)
        .or_else(|| obo_style_prefix(prefix).then(|| format!("{OBO_PURL}{prefix}_")))?;
    Some(format!("{namespace}{local}"))
}

fn find_curie(cell: &str) -> Option<(&str, &str)> {
    let is_prefix_char = |ch: char| ch.is_ascii_alphanumeric() || ch == '_';
    let is_local_char = |ch: char| ch.is_ascii_alphanumeric() || ch == '-';
    for (colon, _) in cell.match_indices(':') {
        let head = &cell[..colon];
        let Some(prefix_start) = head
            .char_indices()
            .rev()
            .take_while(|(_, ch)| is_prefix_char(*ch))
            .last()
            .map(|(index, _)| index)
        else {
            continue;
        };
        let tail = &cell[colon + 1..];
        let local_end = tail
            .char_indices()
            .find(|(_, ch)| !is_local_char(*ch))
            .map_or(tail.len(), |(index, _)| index);
        if local_end > 0 && !tail.starts_with("//") {
            return Some((&head[prefix_start..], &tail[..local_end]));
        }
    }
    None
}

fn obo_style_prefix(prefix: &str) -> bool {
    prefix.starts_with(|ch: char| ch.is_ascii_uppercase())
        && prefix
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
}
