use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{DashError, Result};
use crate::models::{CheckStatus, LevelCounts};

const HEADER: [&str; 5] = ["Level", "Rule Name", "Subject", "Property", "Value"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintRow {
    pub level: CheckStatus,
    pub rule_name: String,
    pub subject: String,
    pub property: String,
    pub value: String,
}

/// Parsed lint report (ROBOT `report` TSV).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    rows: Vec<LintRow>,
}

impl LintReport {
    #[must_use]
    pub const fn new(rows: Vec<LintRow>) -> Self {
        Self { rows }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse_tsv(&fs::read_to_string(path)?)
    }

    pub fn parse_tsv(raw: &str) -> Result<Self> {
        let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
        let Some(header) = lines.next() else {
            return Ok(Self::default());
        };
        let columns = header.split('\t').map(str::trim).collect::<Vec<_>>();
        if columns.len() < 2 || columns[0] != HEADER[0] || columns[1] != HEADER[1] {
            return Err(DashError::Validation(format!(
                "lint report header must start with '{}\\t{}', got '{header}'",
                HEADER[0], HEADER[1]
            )));
        }

        let mut rows = Vec::new();
        for (index, line) in lines.enumerate() {
            let mut cells = line.split('\t');
            let level_raw = cells.next().unwrap_or_default();
            let level = level_raw.parse::<CheckStatus>().map_err(|err| {
                DashError::Validation(format!("lint report row {}: {err}", index + 2))
            })?;
            let mut next = || cells.next().unwrap_or_default().trim().to_string();
            rows.push(LintRow {
                level,
                rule_name: next(),
                subject: next(),
                property: next(),
                value: next(),
            });
        }
        Ok(Self { rows })
    }

    #[must_use]
    pub fn rows(&self) -> &[LintRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Violations of one rule, matching either the bare rule name or a path/IRI ending in it.
    #[must_use]
    pub fn violation_count(&self, rule: &str) -> u64 {
        self.rows
            .iter()
            .filter(|row| rule_matches(&row.rule_name, rule))
            .count() as u64
    }

    #[must_use]
    pub fn total_violations(&self, level: CheckStatus) -> u64 {
        self.rows.iter().filter(|row| row.level == level).count() as u64
    }

    #[must_use]
    pub fn level_counts(&self) -> LevelCounts {
        LevelCounts::new(
            self.total_violations(CheckStatus::Error),
            self.total_violations(CheckStatus::Warn),
            self.total_violations(CheckStatus::Info),
        )
    }

    #[must_use]
    pub fn rule_counts(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.rule_name.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[must_use]
    pub fn to_tsv(&self) -> String {
        let mut out = HEADER.join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                row.level, row.rule_name, row.subject, row.property, row.value
            ));
        }
        out
    }
}

fn rule_matches(rule_name: &str, rule: &str) -> bool {
    rule_name == rule
        || rule_name
            .rsplit(['/', '#'])
            .next()
            .is_some_and(|tail| tail.trim_end_matches(".rq") == rule)
}

/// Keeps every ERROR row, then fills the remaining budget with the first rows of each
/// other level. Reports with at least `limit` errors keep their first `limit` rows.
#[must_use]
pub fn truncate_report_rows(report: &LintReport, limit: usize) -> LintReport {
    if limit == 0 || report.rows.len() <= limit {
        return report.clone();
    }
    let errors = report.total_violations(CheckStatus::Error) as usize;
    if errors >= limit {
        return LintReport::new(report.rows.iter().take(limit).cloned().collect());
    }

    let rest = limit - errors;
    let mut kept = report
        .rows
        .iter()
        .filter(|row| row.level == CheckStatus::Error)
        .cloned()
        .collect::<Vec<_>>();
    for level in [CheckStatus::Warn, CheckStatus::Info] {
        kept.extend(
            report
                .rows
                .iter()
                .filter(|row| row.level == level)
                .take(rest)
                .cloned(),
        );
    }
    LintReport::new(kept)
}
