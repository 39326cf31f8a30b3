// src/config.rs

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::analysis::DEFAULT_LEAD_BUCKETS;
use crate::report::{ExtractOptions, DEFAULT_ROW_COUNT};

pub const CONFIG_FILE: &str = "nevareport.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow!("unknown output format `{}` (expected text or json)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the `*.csv` reports.
    pub data_dir: PathBuf,
    /// Data rows per error table.
    pub rows: usize,
    /// Leading buckets summed into each headline metric.
    pub lead_buckets: usize,
    pub format: OutputFormat,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            rows: DEFAULT_ROW_COUNT,
            lead_buckets: DEFAULT_LEAD_BUCKETS,
            format: OutputFormat::Text,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (if any), then environment overrides.
    pub fn load() -> Result<Self> {
        let file = env::var_os("NEVAREPORT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let explicit = env::var_os("NEVAREPORT_CONFIG").is_some();

        let mut cfg = if file.exists() {
            Self::from_yaml_file(&file)?
        } else if explicit {
            bail!("config file {} does not exist", file.display());
        } else {
            Self::default()
        };
        cfg.apply_env(|key| env::var(key).ok())?;
        cfg.validate()?;
        debug!(?cfg, "resolved config");
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Overlay environment variables; `lookup` is `env::var` outside tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("NEVAREPORT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(rows) = lookup("NEVAREPORT_ROWS") {
            self.rows = rows
                .trim()
                .parse()
                .with_context(|| format!("NEVAREPORT_ROWS=`{}` is not a count", rows))?;
        }
        if let Some(lead) = lookup("NEVAREPORT_LEAD_BUCKETS") {
            self.lead_buckets = lead
                .trim()
                .parse()
                .with_context(|| format!("NEVAREPORT_LEAD_BUCKETS=`{}` is not a count", lead))?;
        }
        if let Some(format) = lookup("NEVAREPORT_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            bail!("rows must be at least 1");
        }
        if self.lead_buckets == 0 {
            bail!("lead_buckets must be at least 1");
        }
        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            row_count: self.rows,
        }
    }
}
