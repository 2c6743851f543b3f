//! FILENAME: app/src/config.rs
// PURPOSE: Settings of a matrix view and of the remote store connection.
// CONTEXT: Loaded from an optional JSON file, then overridden by environment
// variables. Every field has a default so a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{AggregateKind, ColumnOptions};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_API_URL: &str = "MATRIX_API_URL";
pub const ENV_API_TOKEN: &str = "MATRIX_API_TOKEN";
pub const ENV_READ_ONLY: &str = "MATRIX_READ_ONLY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// How the date column renders time index entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// `2024-01-01T00:00:00.000Z`
    #[default]
    Iso,
    /// Frequency-aware label such as `Mon 1 Jan` or `W. 01`
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// Base URL of the study server API
    pub api_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Disables every edit in the view
    pub read_only: bool,
    pub show_row_headers: bool,
    pub show_dates: bool,
    pub date_format: DateFormat,
    /// Aggregate columns appended after the data columns
    pub aggregates: Vec<AggregateKind>,
    /// Custom titles for data columns
    pub column_titles: Vec<String>,
    pub history_size: usize,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    /// Echo log lines to stderr
    pub log_to_stderr: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            api_url: "http://localhost:8080/api".to_string(),
            token: None,
            timeout_secs: 30,
            read_only: false,
            show_row_headers: false,
            show_dates: true,
            date_format: DateFormat::Iso,
            aggregates: Vec::new(),
            column_titles: Vec::new(),
            history_size: engine::MAX_HISTORY_SIZE,
            log_file: None,
            log_level: "info".to_string(),
            log_to_stderr: true,
        }
    }
}

impl ViewConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Applies `MATRIX_*` environment overrides.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key lookup (environment, tests).
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(raw) = lookup(ENV_READ_ONLY) {
            self.read_only = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_READ_ONLY.to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Column layout options for a matrix with a time index (or without).
    pub fn column_options(&self, has_time_index: bool) -> ColumnOptions {
        ColumnOptions {
            row_headers: self.show_row_headers,
            date_time: self.show_dates && has_time_index,
            titles: self.column_titles.clone(),
            aggregates: self.aggregates.clone(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
