use crate::models::{Badge, BadgeColor, OntologyRecord};

pub const QC_LABEL: &str = "QC";
pub const SCORE_LABEL: &str = "OBO Dashboard Score";

/// Summary status badge; a failed namespace shows its failure in red.
#[must_use]
pub fn qc_badge(record: &OntologyRecord) -> Badge {
    if let Some(failure) = record.failure {
        return Badge::new(QC_LABEL, failure.label(), BadgeColor::Red);
    }
    match record.summary_status() {
        Some(status) => Badge::new(QC_LABEL, status.as_str(), BadgeColor::for_status(status)),
        None => Badge::new(QC_LABEL, "NA", BadgeColor::Lightgrey),
    }
}

#[must_use]
pub fn score_badge(record: &OntologyRecord) -> Badge {
    match record.score {
        Some(score) if record.failure.is_none() => Badge::new(
            SCORE_LABEL,
            format!("{score:.2}"),
            BadgeColor::for_score(score),
        ),
        _ => Badge::new(SCORE_LABEL, "NA", BadgeColor::Lightgrey),
    }
}
