use super::{CheckInputs, CheckOutcome, violation_comment};
use crate::models::{CheckResult, CheckStatus};
use crate::store::REPORT_TSV_FILE;

/// FP06: no duplicate or multiple definitions; missing definitions only warn.
pub(super) fn has_valid_definitions(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let Some(report) = inputs.report else {
        return Ok(CheckResult::info("Report could not be generated"));
    };
    let duplicates = report.violation_count("duplicate_definition");
    let multiples = report.violation_count("multiple_definitions");
    let missing = report.violation_count("missing_definition");

    let comment = || {
        violation_comment(
            "definitions",
            &[
                ("duplicate", duplicates),
                ("multiple", multiples),
                ("missing", missing),
            ],
        )
    };
    Ok(if duplicates > 0 || multiples > 0 {
        CheckResult::error(comment())
    } else if missing > 0 {
        CheckResult::warn(comment())
    } else {
        CheckResult::pass()
    })
}

/// FP12: every term has exactly one unique label.
pub(super) fn has_valid_labels(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let Some(report) = inputs.report else {
        return Ok(CheckResult::info("ROBOT Report could not be generated"));
    };
    let duplicates = report.violation_count("duplicate_label");
    let multiples = report.violation_count("multiple_labels");
    let missing = report.violation_count("missing_label");
    if duplicates + multiples + missing == 0 {
        return Ok(CheckResult::pass());
    }
    Ok(CheckResult::error(violation_comment(
        "labels",
        &[
            ("duplicate", duplicates),
            ("multiple", multiples),
            ("missing", missing),
        ],
    )))
}

/// Lint report summary: highest non-empty level with per-level counts.
pub(super) fn report_summary(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let Some(report) = inputs.report else {
        return Ok(CheckResult::info("ROBOT Report could not be generated."));
    };
    let counts = report.level_counts();
    let status = if counts.error > 0 {
        CheckStatus::Error
    } else if counts.warn > 0 {
        CheckStatus::Warn
    } else if counts.info > 0 {
        CheckStatus::Info
    } else {
        CheckStatus::Pass
    };

    let mut parts = Vec::new();
    if counts.error > 0 {
        parts.push(format!("{} errors", counts.error));
    }
    if counts.warn > 0 {
        parts.push(format!("{} warnings", counts.warn));
    }
    if counts.info > 0 {
        parts.push(format!("{} info messages", counts.info));
    }
    let comment = if parts.is_empty() {
        String::new()
    } else {
        format!("{}.", parts.join(", "))
    };

    Ok(CheckResult::new(status)
        .with_comment(comment)
        .with_file(REPORT_TSV_FILE.trim_end_matches(".tsv"))
        .with_counts(counts))
}
