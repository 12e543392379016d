use chrono::NaiveDate;
use semver::Version;

use super::{CheckError, CheckInputs, CheckOutcome, UrlStatus};
use crate::models::CheckResult;

const OBO_PURL: &str = "http://purl.obolibrary.org/obo/";

/// FP04: a resolvable version IRI carrying exactly one of a date or a semantic version.
pub(super) fn has_versioning(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let facts = inputs.ontology()?;
    let Some(version_iri) = facts
        .version_iri
        .as_deref()
        .filter(|iri| !iri.trim().is_empty())
    else {
        return Ok(CheckResult::error("Missing version IRI"));
    };

    match inputs.probes.version_iri {
        Some(UrlStatus::Reached(code)) if (200..300).contains(&code) => {}
        Some(_) => return Ok(CheckResult::error("Version IRI does not resolve")),
        None => {}
    }

    let segments = path_segments(version_iri);
    let mut has_date = false;
    for segment in &segments {
        has_date |= parse_date(segment)?.is_some();
    }
    let has_semver = segments.iter().any(|segment| parse_semver(segment).is_some());
    match (has_date, has_semver) {
        (true, true) => {
            return Ok(CheckResult::error(
                "Version IRI should not contain both a semantic version and date",
            ));
        }
        (false, false) => {
            return Ok(CheckResult::error(
                "Version IRI has neither a semantic version nor a date",
            ));
        }
        _ => {}
    }

    if release_date(version_iri)?.is_none() {
        return Ok(CheckResult::warn(format!(
            "Version IRI '{version_iri}' is not in recommended format"
        )));
    }
    Ok(CheckResult::pass())
}

/// Release date of a dated OBO version IRI: `http://purl.obolibrary.org/obo/<ns>/YYYY-MM-DD/<file>`.
pub(super) fn release_date(version_iri: &str) -> Result<Option<NaiveDate>, CheckError> {
    let Some(rest) = version_iri.strip_prefix(OBO_PURL) else {
        return Ok(None);
    };
    let segments = rest.split('/').collect::<Vec<_>>();
    // The date needs at least one segment before it and a file name after it.
    if segments.len() < 3 {
        return Ok(None);
    }
    for segment in &segments[1..segments.len() - 1] {
        if let Some(date) = parse_date(segment)? {
            return Ok(Some(date));
        }
    }
    Ok(None)
}

fn path_segments(iri: &str) -> Vec<&str> {
    let path = iri.split_once("://").map_or(iri, |(_, rest)| rest);
    path.split('/').skip(1).filter(|segment| !segment.is_empty()).collect()
}

/// `Ok(None)` unless the segment is shaped `YYYY-MM-DD`; a shaped segment that is no
/// calendar date is malformed.
fn parse_date(segment: &str) -> Result<Option<NaiveDate>, CheckError> {
    let bytes = segment.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return Ok(None);
    }
    NaiveDate::parse_from_str(segment, "%Y-%m-%d")
        .map(Some)
        .map_err(|err| CheckError::Malformed(format!("version IRI date '{segment}': {err}")))
}

fn parse_semver(segment: &str) -> Option<Version> {
    let candidate = segment.strip_prefix('v').unwrap_or(segment);
    Version::parse(candidate).ok()
}
