mod badge;
mod metrics;
mod record;
mod registry;
mod status;

pub use badge::{Badge, BadgeColor, ODK_LOGO_SVG};
pub use metrics::{MetricName, MetricsBundle, OboScoreMetric};
pub use record::{ChangeState, FailureKind, OntologyRecord, Summary};
pub use registry::{Contact, License, OntologyTarget, RegistryEntry, Usage};
pub use status::{CheckResult, CheckStatus, LevelCounts, RecordedResult, RecordedStatus};
