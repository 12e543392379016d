use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
#[cfg(feature = "host-tools")]
use std::{
    io::Read,
    process::{Child, Command, Stdio},
    thread,
    time::Instant,
};

pub const OBODASH_HOST_TOOLS_ENV: &str = "OBODASH_HOST_TOOLS";

#[cfg(feature = "host-tools")]
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostToolsMode {
    Enabled,
    Disabled,
}

impl HostToolsMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostToolsPolicySource {
    Environment,
    Default,
}

impl HostToolsPolicySource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "env",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostToolsPolicy {
    pub mode: HostToolsMode,
    pub source: HostToolsPolicySource,
}

#[derive(Debug, Clone, Copy)]
pub struct HostCommandSpec<'a> {
    pub operation: &'a str,
    pub program: &'a str,
    pub args: &'a [String],
    pub current_dir: Option<&'a Path>,
    pub envs: Option<&'a BTreeMap<String, String>>,
    pub timeout: Option<Duration>,
}

impl<'a> HostCommandSpec<'a> {
    #[must_use]
    pub const fn new(operation: &'a str, program: &'a str, args: &'a [String]) -> Self {
        Self {
            operation,
            program,
            args,
            current_dir: None,
            envs: None,
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_current_dir(mut self, current_dir: &'a Path) -> Self {
        self.current_dir = Some(current_dir);
        self
    }

    #[must_use]
    pub const fn with_envs(mut self, envs: &'a BTreeMap<String, String>) -> Self {
        self.envs = Some(envs);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg_attr(
    not(feature = "host-tools"),
    allow(
        dead_code,
        reason = "result shape stays stable across feature profiles"
    )
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommandResult {
    Blocked {
        reason: String,
    },
    SpawnError {
        error: String,
    },
    TimedOut {
        after: Duration,
    },
    Completed {
        success: bool,
        stdout: String,
        stderr: String,
    },
}

#[must_use]
pub fn resolve_host_tools_policy() -> HostToolsPolicy {
    let env_raw = std::env::var(OBODASH_HOST_TOOLS_ENV).ok();
    resolve_host_tools_policy_with(env_raw.as_deref())
}

#[must_use]
pub fn run_host_command(spec: HostCommandSpec<'_>) -> HostCommandResult {
    run_host_command_with_policy(spec, resolve_host_tools_policy())
}

#[must_use]
fn run_host_command_with_policy(
    spec: HostCommandSpec<'_>,
    policy: HostToolsPolicy,
) -> HostCommandResult {
    if policy.mode == HostToolsMode::Disabled {
        return HostCommandResult::Blocked {
            reason: format_host_tools_block_reason(spec.operation, policy),
        };
    }

    #[cfg(feature = "host-tools")]
    {
        let mut command = Command::new(spec.program);
        command
            .args(spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(current_dir) = spec.current_dir {
            command.current_dir(current_dir);
        }
        if let Some(envs) = spec.envs {
            command.envs(envs);
        }
        // Own process group, so a timeout also reaches whatever a launcher script spawned.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt as _;
            command.process_group(0);
        }
        tracing::debug!(
            operation = spec.operation,
            program = spec.program,
            args = ?spec.args,
            "spawning host command"
        );

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                return HostCommandResult::SpawnError {
                    error: err.to_string(),
                };
            }
        };

        // Drain both pipes on their own threads so a chatty child cannot block on a full pipe.
        let stdout_reader = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if let Some(limit) = spec.timeout {
                        if started.elapsed() >= limit {
                            kill_process_tree(&mut child);
                            let _ = child.wait();
                            let _ = collect_output(stdout_reader);
                            let _ = collect_output(stderr_reader);
                            tracing::warn!(
                                operation = spec.operation,
                                timeout_secs = limit.as_secs(),
                                "host command killed after timeout"
                            );
                            return HostCommandResult::TimedOut { after: limit };
                        }
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    kill_process_tree(&mut child);
                    let _ = child.wait();
                    let _ = collect_output(stdout_reader);
                    let _ = collect_output(stderr_reader);
                    return HostCommandResult::SpawnError {
                        error: err.to_string(),
                    };
                }
            }
        };

        HostCommandResult::Completed {
            success: status.success(),
            stdout: collect_output(stdout_reader),
            stderr: collect_output(stderr_reader),
        }
    }

    #[cfg(not(feature = "host-tools"))]
    {
        let _ = policy;
        HostCommandResult::Blocked {
            reason: format_host_tools_feature_disabled_reason(spec.operation),
        }
    }
}

#[cfg(feature = "host-tools")]
fn collect_output(reader: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
        .unwrap_or_default()
}

/// Kills the child's whole process group; the child leads it (see `process_group(0)`).
#[cfg(feature = "host-tools")]
fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success());
        if killed {
            return;
        }
        tracing::debug!(pid = child.id(), "process group kill failed, killing child only");
    }
    let _ = child.kill();
}

fn format_host_tools_block_reason(operation: &str, policy: HostToolsPolicy) -> String {
    format!(
        "host_tools_disabled operation={operation} mode={} source={} env={} (set env to on/1/true to enable external tools)",
        policy.mode.as_str(),
        policy.source.as_str(),
        OBODASH_HOST_TOOLS_ENV
    )
}

#[cfg(not(feature = "host-tools"))]
fn format_host_tools_feature_disabled_reason(operation: &str) -> String {
    format!(
        "host_tools_unavailable operation={operation} feature=host-tools (compile obodash-core with feature `host-tools` to run external tools)"
    )
}

#[must_use]
fn resolve_host_tools_policy_with(env_raw: Option<&str>) -> HostToolsPolicy {
    if let Some(mode) = env_raw.and_then(parse_host_tools_mode) {
        return HostToolsPolicy {
            mode,
            source: HostToolsPolicySource::Environment,
        };
    }
    HostToolsPolicy {
        mode: HostToolsMode::Enabled,
        source: HostToolsPolicySource::Default,
    }
}

#[must_use]
fn parse_host_tools_mode(raw: &str) -> Option<HostToolsMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(HostToolsMode::Enabled),
        "0" | "false" | "no" | "off" | "disabled" | "none" => Some(HostToolsMode::Disabled),
        _ => None,
    }
}
