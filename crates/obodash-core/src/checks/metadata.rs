use super::{CheckInputs, CheckOutcome, UrlStatus};
use crate::models::CheckResult;

const OPEN_LICENSES: [&str; 2] = [
    "creativecommons.org/publicdomain/zero/",
    "creativecommons.org/licenses/by/",
];

/// FP01: the registry declares an open license and the ontology carries it.
pub(super) fn is_open(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let metadata = inputs.metadata()?;
    let Some(url) = metadata
        .license
        .as_ref()
        .and_then(|license| license.url.as_deref())
        .filter(|url| !url.trim().is_empty())
    else {
        return Ok(CheckResult::error("Missing license"));
    };

    if let Some(report) = inputs.report {
        if report.violation_count("missing_ontology_license") > 0 {
            return Ok(CheckResult::error("Missing license in ontology header"));
        }
    }

    if !OPEN_LICENSES.iter().any(|open| url.contains(open)) {
        return Ok(CheckResult::warn(format!(
            "License '{url}' is not CC0 or CC-BY"
        )));
    }
    Ok(CheckResult::pass())
}

/// FP05: the registry declares a domain.
pub(super) fn has_scope(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let metadata = inputs.metadata()?;
    if is_blank(metadata.domain.as_deref()) {
        return Ok(CheckResult::error("Missing domain (scope)"));
    }
    Ok(CheckResult::pass())
}

/// FP08: homepage and description are present and the homepage resolves.
pub(super) fn has_documentation(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let metadata = inputs.metadata()?;
    let homepage = metadata.homepage.as_deref().filter(|url| !url.trim().is_empty());
    let has_description = !is_blank(metadata.description.as_deref());

    let Some(homepage) = homepage else {
        return Ok(CheckResult::error(if has_description {
            "Missing homepage"
        } else {
            "Missing homepage and description"
        }));
    };
    if !has_description {
        return Ok(CheckResult::error("Missing description"));
    }

    match inputs.probes.homepage {
        Some(UrlStatus::Unreachable) => Ok(unresolved_homepage(homepage)),
        Some(UrlStatus::Reached(code)) if code > 400 => Ok(unresolved_homepage(homepage)),
        _ => Ok(CheckResult::pass()),
    }
}

fn unresolved_homepage(homepage: &str) -> CheckResult {
    CheckResult::error(format!("homepage URL ({homepage}) does not resolve"))
}

/// FP09: an issue tracker and documented usages.
pub(super) fn has_users(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let metadata = inputs.metadata()?;
    let has_tracker = !is_blank(metadata.tracker.as_deref());
    let has_usages = !metadata.usages.is_empty();
    Ok(match (has_tracker, has_usages) {
        (false, false) => CheckResult::error("Missing tracker and usages"),
        (false, true) => CheckResult::error("Missing tracker"),
        (true, false) => CheckResult::error("Missing usages"),
        (true, true) => CheckResult::pass(),
    })
}

/// FP11: a contact with a label and a plausible email address.
pub(super) fn has_contact(inputs: &CheckInputs<'_>) -> CheckOutcome {
    let metadata = inputs.metadata()?;
    let Some(contact) = metadata.contact.as_ref() else {
        return Ok(CheckResult::error("Missing contact information"));
    };
    let valid = !is_blank(contact.label.as_deref())
        && contact.email.as_deref().is_some_and(is_plausible_email);
    if valid {
        Ok(CheckResult::pass())
    } else {
        Ok(CheckResult::error("Invalid contact information"))
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

fn is_plausible_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && domain.contains('.')
        && !domain.ends_with('.')
        && !raw.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckInputs, ProbeFacts};
    use crate::models::{CheckStatus, Contact, License, RegistryEntry, Usage};
    use chrono::NaiveDate;

    fn inputs<'a>(entry: &'a RegistryEntry, probes: ProbeFacts) -> CheckInputs<'a> {
        CheckInputs {
            namespace: "foo",
            metadata: Some(entry),
            ontology: None,
            report: None,
            probes,
            today: NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"),
        }
    }

    fn complete_entry() -> RegistryEntry {
        RegistryEntry {
            id: "foo".to_string(),
            domain: Some("anatomy".to_string()),
            homepage: Some("https://example.org/foo".to_string()),
            description: Some("An ontology of foo.".to_string()),
            tracker: Some("https://example.org/foo/issues".to_string()),
            usages: vec![Usage::default()],
            contact: Some(Contact {
                email: Some("curator@example.org".to_string()),
                label: Some("Foo Curator".to_string()),
                ..Contact::default()
            }),
            license: Some(License {
                url: Some("https://creativecommons.org/licenses/by/4.0/".to_string()),
                label: Some("CC BY 4.0".to_string()),
            }),
            ..RegistryEntry::default()
        }
    }

    #[test]
    fn complete_metadata_passes_every_metadata_check() {
        let entry = complete_entry();
        let probes = ProbeFacts {
            homepage: Some(UrlStatus::Reached(200)),
            version_iri: None,
        };
        let inputs = inputs(&entry, probes);
        for check in [is_open, has_scope, has_documentation, has_users, has_contact] {
            assert_eq!(check(&inputs).expect("check").status, CheckStatus::Pass);
        }
    }

    #[test]
    fn documentation_reports_missing_fields_and_dead_homepage() {
        let mut entry = complete_entry();
        entry.description = None;
        let result = has_documentation(&inputs(&entry, ProbeFacts::default())).expect("check");
        assert_eq!(result.comment.as_deref(), Some("Missing description"));

        entry.homepage = None;
        let result = has_documentation(&inputs(&entry, ProbeFacts::default())).expect("check");
        assert_eq!(result.comment.as_deref(), Some("Missing homepage and description"));

        let entry = complete_entry();
        let dead = ProbeFacts {
            homepage: Some(UrlStatus::Reached(404)),
            version_iri: None,
        };
        let result = has_documentation(&inputs(&entry, dead)).expect("check");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(
            result.comment.as_deref(),
            Some("homepage URL (https://example.org/foo) does not resolve")
        );
    }

    #[test]
    fn users_and_contact_distinguish_missing_from_invalid() {
        let mut entry = complete_entry();
        entry.tracker = None;
        entry.usages.clear();
        let result = has_users(&inputs(&entry, ProbeFacts::default())).expect("check");
        assert_eq!(result.comment.as_deref(), Some("Missing tracker and usages"));

        entry.contact = Some(Contact {
            email: Some("not-an-email".to_string()),
            label: Some("X".to_string()),
            ..Contact::default()
        });
        let result = has_contact(&inputs(&entry, ProbeFacts::default())).expect("check");
        assert_eq!(result.comment.as_deref(), Some("Invalid contact information"));

        entry.contact = None;
        let result = has_contact(&inputs(&entry, ProbeFacts::default())).expect("check");
        assert_eq!(result.comment.as_deref(), Some("Missing contact information"));
    }

    #[test]
    fn restrictive_license_warns() {
        let mut entry = complete_entry();
        entry.license = Some(License {
            url: Some("https://example.org/proprietary".to_string()),
            label: None,
        });
        let result = is_open(&inputs(&entry, ProbeFacts::default())).expect("check");
        assert_eq!(result.status, CheckStatus::Warn);

        entry.license = None;
        let result = is_open(&inputs(&entry, ProbeFacts::default())).expect("check");
        assert_eq!(result.status, CheckStatus::Error);
    }
}
