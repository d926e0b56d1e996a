// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use sitegrid_app::PageKind;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "sitegrid";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_STATUS_TIMEOUT: &str = "4s";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            export: Export::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub start_page: Option<String>,
    pub status_timeout: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            start_page: Some(PageKind::PurchaseOrders.slug().to_owned()),
            status_timeout: Some(DEFAULT_STATUS_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Export {
    pub dir: Option<String>,
    pub format: Option<ExportFormat>,
}

impl Default for Export {
    fn default() -> Self {
        Self {
            dir: None,
            format: Some(ExportFormat::Csv),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("SITEGRID_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set SITEGRID_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [ui], [export], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(page) = &self.ui.start_page
            && PageKind::parse(page).is_none()
        {
            let pages = PageKind::ALL
                .iter()
                .map(|page| page.slug())
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "ui.start_page in {} must be one of: {pages}; got {page:?}",
                path.display()
            );
        }

        if let Some(timeout) = &self.ui.status_timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.status_timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(dir) = &self.export.dir
            && dir.trim().is_empty()
        {
            bail!(
                "export.dir in {} must not be empty; remove it to use the download directory",
                path.display()
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} must be one of: {}; got {level:?}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    pub fn start_page(&self) -> PageKind {
        self.ui
            .start_page
            .as_deref()
            .and_then(PageKind::parse)
            .unwrap_or(PageKind::PurchaseOrders)
    }

    pub fn status_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .status_timeout
                .as_deref()
                .unwrap_or(DEFAULT_STATUS_TIMEOUT),
        )
    }

    pub fn export_format(&self) -> ExportFormat {
        self.export.format.unwrap_or(ExportFormat::Csv)
    }

    pub fn export_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.export.dir {
            return Ok(PathBuf::from(dir));
        }
        match dirs::download_dir() {
            Some(dir) => Ok(dir),
            None => env::current_dir().context("resolve current directory for exports"),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("sitegrid.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# sitegrid config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\n# One of: purchase-orders, material-requests, inventory-items, material-transfers, site-issues,\n# site-tasks, equipment, maintenance-log\nstart_page = \"{}\"\nstatus_timeout = \"{}\"\n\n[export]\n# Optional. Default is the platform download dir, then the working directory\n# dir = \"/absolute/path/to/exports\"\nformat = \"csv\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/sitegrid/sitegrid.log)\n# file = \"/absolute/path/to/sitegrid.log\"\n",
            path.display(),
            PageKind::PurchaseOrders.slug(),
            DEFAULT_STATUS_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid status duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid status duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid status duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins.saturating_mul(60)));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 4s)")
}
