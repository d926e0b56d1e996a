// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SITEGRID_LOG";

/// `SITEGRID_LOG` wins over the configured level.
pub fn env_filter(configured_level: &str) -> Result<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_ENV} directives {directives:?}")),
        _ => EnvFilter::try_new(configured_level)
            .with_context(|| format!("invalid log level {configured_level:?}")),
    }
}

/// Routes tracing output to `path`. The terminal belongs to the TUI, so
/// nothing is written to stdout or stderr.
pub fn init(path: &Path, configured_level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured_level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::env_filter;
    use anyhow::Result;

    #[test]
    fn configured_level_builds_a_filter() -> Result<()> {
        let filter = env_filter("debug")?;
        assert!(filter.to_string().contains("debug"));
        Ok(())
    }

    #[test]
    fn garbage_level_is_rejected() {
        assert!(env_filter("debug=[[").is_err());
    }
}
