//! Output files for one run.
//!
//! # Submodules
//!
//! - [`json`]: cleaned, valid-only records as a pretty-printed JSON array
//! - [`text`]: the rendered quality report
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── cleaned_output.json
//! └── quality_report.txt
//! ```
//!
//! Both files are overwritten on every run. Everything is serialized in
//! memory before the first byte is written. Each file is then written to a
//! `.tmp` sibling, and both are renamed into place only after both writes
//! succeed, so a failed write never leaves one output without the other.

pub mod json;
pub mod text;

use crate::config::PipelineConfig;
use crate::error::RunError;
use crate::models::CleanedRecord;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{instrument, warn};

/// Paths written by [`write_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenOutputs {
    pub cleaned_records: PathBuf,
    pub report: PathBuf,
}

/// Write the cleaned records and the report under the configured directory.
///
/// # Arguments
///
/// * `valid_records` - Cleaned records that passed validation, in input order
/// * `report_text` - The already rendered quality report
/// * `config` - Supplies the output directory and file names
///
/// # Returns
///
/// The paths of both written files.
///
/// # Errors
///
/// Returns [`RunError::Serialize`] if the records cannot be serialized, or
/// [`RunError::Output`] if either file cannot be written or moved into
/// place. Staged files from a failed attempt are removed.
#[instrument(level = "info", skip_all, fields(output_dir = %config.output_dir.display()))]
pub async fn write_all(
    valid_records: &[CleanedRecord],
    report_text: &str,
    config: &PipelineConfig,
) -> Result<WrittenOutputs, RunError> {
    let cleaned_json = json::render_records(valid_records)?;
    let cleaned_records = config.cleaned_output_path();
    let report = config.report_path();
    let staged_records = staging_path(&cleaned_records);
    let staged_report = staging_path(&report);

    let staged = async {
        json::write_records(&cleaned_json, &staged_records).await?;
        text::write_report(report_text, &staged_report).await
    }
    .await;
    if let Err(e) = staged {
        discard(&staged_records).await;
        discard(&staged_report).await;
        return Err(e);
    }

    promote(&staged_records, &cleaned_records).await?;
    promote(&staged_report, &report).await?;

    Ok(WrittenOutputs {
        cleaned_records,
        report,
    })
}

/// `cleaned_output.json` -> `cleaned_output.json.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn promote(staged: &Path, target: &Path) -> Result<(), RunError> {
    fs::rename(staged, target)
        .await
        .map_err(|source| RunError::Output {
            path: target.to_path_buf(),
            source,
        })
}

async fn discard(staged: &Path) {
    if let Err(e) = fs::remove_file(staged).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %staged.display(), error = %e, "Could not remove staged output");
        }
    }
}
