use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use obodash_core::config::DashboardConfig;

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Loads the config; relative paths resolve against the dashboard root.
pub(super) fn load_config(root: &Path, path: &Path) -> Result<DashboardConfig> {
    let path = root.join(path);
    DashboardConfig::load(&path).with_context(|| format!("invalid config {}", path.display()))
}

/// `--only` filter; no patterns selects every namespace.
#[derive(Debug)]
pub(super) struct NamespaceSelector {
    globs: Option<GlobSet>,
}

impl NamespaceSelector {
    pub(super) fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self { globs: None });
        }
        let mut builder = GlobSetBuilder::new();
        for raw in patterns {
            let glob = Glob::new(raw.trim())
                .map_err(|e| anyhow::anyhow!("invalid --only pattern '{raw}': {e}"))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|e| anyhow::anyhow!("invalid --only patterns: {e}"))?;
        Ok(Self { globs: Some(globs) })
    }

    pub(super) fn matches(&self, namespace: &str) -> bool {
        self.globs
            .as_ref()
            .is_none_or(|globs| globs.is_match(namespace))
    }
}
