use std::time::Duration;

pub const ROBOT_BIN_ENV: &str = "OBODASH_ROBOT_BIN";
pub const HTTP_TIMEOUT_SECS_ENV: &str = "OBODASH_HTTP_TIMEOUT_SECS";
pub const DOWNLOAD_RETRIES_ENV: &str = "OBODASH_DOWNLOAD_RETRIES";

const DEFAULT_ROBOT_BIN: &str = "robot";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
const DEFAULT_DOWNLOAD_RETRIES: u32 = 3;

#[must_use]
pub(super) fn read_non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub(super) fn read_env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
}

#[must_use]
pub(super) fn read_env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
}

/// Process-level settings that never land in the persisted config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub robot_bin: String,
    pub http_timeout: Duration,
    pub download_retries: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            robot_bin: DEFAULT_ROBOT_BIN.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            download_retries: DEFAULT_DOWNLOAD_RETRIES,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            read_non_empty_env(ROBOT_BIN_ENV),
            read_env_u64(HTTP_TIMEOUT_SECS_ENV),
            read_env_u32(DOWNLOAD_RETRIES_ENV),
        )
    }

    #[must_use]
    fn from_values(robot_bin: Option<String>, timeout_secs: Option<u64>, retries: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            robot_bin: robot_bin.unwrap_or(defaults.robot_bin),
            http_timeout: timeout_secs
                .filter(|secs| *secs > 0)
                .map_or(defaults.http_timeout, Duration::from_secs),
            download_retries: retries.map_or(defaults.download_retries, |value| value.max(1)),
        }
    }
}
