//! Run configuration.
//!
//! Every process-wide default (thresholds, recognised date keys, output
//! file names) lives in [`PipelineConfig`] and is handed to the cleaner,
//! validator and runner at construction. Values come from, in increasing
//! priority: built-in defaults, an optional YAML file, and CLI flags.
//!
//! ```yaml
//! min_content_length: 25
//! top_failures: 10
//! date_key_markers: [date, published, created, updated]
//! output_dir: ./out
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Settings for one pipeline run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum character count for a non-empty `content` field.
    pub min_content_length: usize,
    /// Fields that must be present and non-empty, in reporting order.
    pub required_fields: Vec<String>,
    /// Field names treated as dates when they match exactly (case-insensitive).
    pub date_keys: Vec<String>,
    /// Field names treated as dates when they contain one of these (case-insensitive).
    pub date_key_markers: Vec<String>,
    /// Number of failure reasons listed in the report.
    pub top_failures: usize,
    /// JSON array read when no other source is selected.
    pub input_path: PathBuf,
    /// Directory receiving both output files.
    pub output_dir: PathBuf,
    /// File name of the cleaned, valid-only JSON output.
    pub cleaned_output_file: String,
    /// File name of the plain-text quality report.
    pub report_file: String,
    /// Upper bound for the single remote fetch.
    pub fetch_timeout_secs: u64,
    /// User-Agent sent with the remote fetch.
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_content_length: 10,
            required_fields: ["title", "content", "url"].map(String::from).to_vec(),
            date_keys: ["date", "time", "timestamp"].map(String::from).to_vec(),
            date_key_markers: ["date", "published", "created", "updated"]
                .map(String::from)
                .to_vec(),
            top_failures: 5,
            input_path: PathBuf::from("sample_data.json"),
            output_dir: PathBuf::from("."),
            cleaned_output_file: "cleaned_output.json".to_string(),
            report_file: "quality_report.txt".to_string(),
            fetch_timeout_secs: 20,
            user_agent: concat!("scrape_quality/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML config file. Missing keys keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration file");
        Ok(config)
    }

    fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Resolve the effective configuration for a CLI invocation.
    ///
    /// Starts from the YAML file named by `--config` (or the defaults when
    /// none is given), then applies any CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(path) = &cli.input {
            self.input_path = path.clone();
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(min) = cli.min_content_length {
            self.min_content_length = min;
        }
        if let Some(top) = cli.top_failures {
            self.top_failures = top;
        }
    }

    pub fn cleaned_output_path(&self) -> PathBuf {
        self.output_dir.join(&self.cleaned_output_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }
}
