//! Local JSON file source.
//!
//! The file must hold a JSON array. Object items become records as-is;
//! any other item is wrapped as `{"_raw": item, "_error": "..."}` so it is
//! still counted (and rejected) instead of vanishing from the totals.

use super::RecordSource;
use crate::error::SourceError;
use crate::models::RawRecord;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Reads raw records from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError> {
        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Read {
                path: self.path.clone(),
                source,
            })?;
        let records = parse_records(&raw, &self.path)?;
        info!(count = records.len(), "Loaded input records");
        Ok(records)
    }
}

fn parse_records(raw: &str, path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    records_from_value(value)
}

/// Split a top-level JSON array into records.
pub fn records_from_value(value: Value) -> Result<Vec<RawRecord>, SourceError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SourceError::NotAnArray {
                found: json_type_name(&other),
            });
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => map,
            other => {
                warn!(index, kind = json_type_name(&other), "Non-object record in input");
                let mut wrapped = RawRecord::new();
                wrapped.insert("_raw".to_string(), other);
                wrapped.insert(
                    "_error".to_string(),
                    Value::String(format!("non_object_record_at_index_{index}")),
                );
                wrapped
            }
        })
        .collect())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
