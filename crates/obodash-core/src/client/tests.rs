use std::cell::RefCell;

use chrono::TimeZone;
use tempfile::tempdir;

use super::*;
use crate::config::ProfileConfig;
use crate::error::DashError;

struct TextSource {
    requested: RefCell<Vec<String>>,
}

impl ArtifactSource for TextSource {
    fn fetch_to(&self, location: &str, _dest: &Path) -> Result<()> {
        Err(DashError::Download(format!("unexpected download of {location}")))
    }

    fn fetch_text(&self, location: &str) -> Result<String> {
        self.requested.borrow_mut().push(location.to_string());
        Ok("ERROR\tduplicate_label\nWARN\tmissing_definition\n".to_string())
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .single()
        .expect("valid time")
}

#[test]
fn new_creates_dashboard_directory() {
    let temp = tempdir().expect("tempdir");
    let dashboard = Dashboard::new(temp.path()).expect("dashboard");
    assert!(temp.path().join(DASHBOARD_DIR).is_dir());
    assert_eq!(dashboard.store().root(), temp.path().join(DASHBOARD_DIR));
    assert_eq!(dashboard.build_dir(), temp.path().join("build/ontologies"));
}

#[test]
fn prepare_profile_adds_mandatory_rules() {
    let temp = tempdir().expect("tempdir");
    let dashboard = Dashboard::new(temp.path()).expect("dashboard");
    let config = DashboardConfig {
        profile: ProfileConfig {
            baseprofile: Some("https://example.org/profile.txt".to_string()),
            custom: vec!["INFO\tlowercase_definition".to_string()],
        },
        ..DashboardConfig::default()
    };
    let source = TextSource {
        requested: RefCell::new(Vec::new()),
    };

    let path = dashboard.prepare_profile(&config, &source).expect("profile");
    let profile = fs::read_to_string(path).expect("read");
    assert!(profile.starts_with("ERROR\tduplicate_label\n"));
    assert!(profile.contains("INFO\tlowercase_definition\n"));
    assert!(profile.contains("WARN\tmultiple_labels\n"));
    assert_eq!(
        source.requested.borrow().as_slice(),
        ["https://example.org/profile.txt".to_string()]
    );
}

#[test]
fn gate_command_tracks_artifact_hash() {
    let temp = tempdir().expect("tempdir");
    let dashboard = Dashboard::new(temp.path()).expect("dashboard");
    let artifact = temp.path().join("foo.owl");
    fs::write(&artifact, "<rdf:RDF/>").expect("write");
    let config = DashboardConfig::default();

    let first = dashboard.gate("foo", &artifact, &config, at(1)).expect("gate");
    assert_eq!(first, ChangeState::Changed);
    let second = dashboard.gate("foo", &artifact, &config, at(2)).expect("gate");
    assert_eq!(second, ChangeState::Unchanged);

    fs::write(&artifact, "<rdf:RDF></rdf:RDF>").expect("write");
    let third = dashboard.gate("foo", &artifact, &config, at(3)).expect("gate");
    assert_eq!(third, ChangeState::Changed);

    let record = dashboard.store().load("foo").expect("load").expect("record");
    assert!(record.changed);
    assert_eq!(record.change_state, Some(ChangeState::Changed));
}
