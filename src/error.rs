//! Error types for run-level failures.
//!
//! Only conditions that abort a whole run live here. Problems with a single
//! record are never errors: they surface as validation reasons and
//! statistics (see [`crate::validation::FailureReason`]).

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain the raw records from a [`crate::sources::RecordSource`].
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read input file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("input JSON must be an array of records, found {found}")]
    NotAnArray { found: &'static str },

    #[error("unsupported article URL {url}: {reason}")]
    UnsupportedUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed summary response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to load the YAML configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid YAML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A fatal run error, tagged with the stage that failed.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("input acquisition failed ({origin}): {source}")]
    Acquisition {
        origin: String,
        #[source]
        source: SourceError,
    },

    #[error("output directory {path} is not writable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize cleaned records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
