//! Plain-text quality report output.

use crate::error::RunError;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write the rendered report to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report_text: &str, path: &Path) -> Result<(), RunError> {
    fs::write(path, report_text)
        .await
        .map_err(|source| RunError::Output {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Wrote quality report");
    Ok(())
}
