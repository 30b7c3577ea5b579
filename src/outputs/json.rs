//! JSON output of cleaned, valid records.
//!
//! Records are written as one pretty-printed array in processing order,
//! with keys in their input order and non-ASCII text left unescaped.

use crate::error::RunError;
use crate::models::CleanedRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize records to the output JSON text.
pub fn render_records(records: &[CleanedRecord]) -> Result<String, RunError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write already-rendered JSON to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_records(json: &str, path: &Path) -> Result<(), RunError> {
    fs::write(path, json).await.map_err(|source| RunError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!(bytes = json.len(), "Wrote cleaned records");
    Ok(())
}
