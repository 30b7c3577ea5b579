//! # scrape_quality
//!
//! A batch pipeline that cleans loosely structured scraped records (title,
//! content, source URL and whatever else came along), validates them
//! against a fixed rule set, and writes the valid records plus a data
//! quality report.
//!
//! ## Usage
//!
//! ```sh
//! scrape_quality --input sample_data.json
//! scrape_quality --scrape-url https://en.wikipedia.org/wiki/Web_scraping -o ./out
//! ```
//!
//! ## Architecture
//!
//! 1. **Acquisition**: a [`sources::RecordSource`] yields every raw record
//!    up front (local JSON file or one Wikipedia article)
//! 2. **Cleaning**: text and date normalization per field
//! 3. **Validation**: required fields, URL format, minimum content length
//! 4. **Aggregation**: completeness and failure-reason statistics
//! 5. **Output**: `cleaned_output.json` and `quality_report.txt`
//!
//! A failure in step 1 aborts the run before anything is written. Problems
//! with individual records never abort the run.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cleaning;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod report;
mod sources;
mod utils;
mod validation;

use cli::Cli;
use config::PipelineConfig;
use error::RunError;
use models::RawRecord;
use outputs::WrittenOutputs;
use pipeline::Pipeline;
use sources::{FileSource, RecordSource, WikipediaSource};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(args).await {
        Ok(written) => {
            println!("Pipeline complete.");
            println!(
                "Saved: {}, {}",
                written.cleaned_records.display(),
                written.report.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Pipeline run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[instrument(level = "info", skip_all)]
async fn run(args: Cli) -> Result<WrittenOutputs, RunError> {
    let start_time = std::time::Instant::now();
    info!("scrape_quality starting up");

    let config = PipelineConfig::resolve(&args)?;
    debug!(?config, "Resolved configuration");

    let written = match &args.scrape_url {
        Some(url) => {
            let source = WikipediaSource::new(url, &config).map_err(|source| RunError::Acquisition {
                origin: format!("wikipedia {url}"),
                source,
            })?;
            execute(&source, &config, Utc::now()).await?
        }
        None => execute(&FileSource::new(&config.input_path), &config, Utc::now()).await?,
    };

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(written)
}

/// Run the whole pipeline over one record source.
///
/// # Arguments
///
/// * `source` - Where the raw records come from
/// * `config` - Thresholds, date keys and output locations
/// * `generated_at` - Timestamp printed in the report header
///
/// # Returns
///
/// The paths of the cleaned records file and the quality report.
///
/// # Errors
///
/// Fails before anything is written if the output directory is unusable or
/// the records cannot be acquired. Per-record problems never fail the run.
async fn execute<S: RecordSource>(
    source: &S,
    config: &PipelineConfig,
    generated_at: DateTime<Utc>,
) -> Result<WrittenOutputs, RunError> {
    // Early check: fail before fetching anything if results can't be saved
    ensure_writable_dir(&config.output_dir)
        .await
        .map_err(|source| RunError::OutputDir {
            path: config.output_dir.clone(),
            source,
        })?;

    // ---- Acquire every record up front ----
    let records = acquire(source).await?;

    // ---- Clean, validate, aggregate ----
    let outcome = Pipeline::new(config).run(records);
    for rejected in &outcome.rejected {
        debug!(
            index = rejected.index,
            reasons = ?rejected.reasons.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Rejected record"
        );
    }

    // ---- Render, then write ----
    let report_text = report::render(&outcome.stats, config.top_failures, generated_at);
    let written = outputs::write_all(&outcome.valid_records, &report_text, config).await?;
    info!(
        total = outcome.stats.total,
        valid = outcome.stats.valid,
        invalid = outcome.stats.invalid,
        "Outputs written"
    );
    Ok(written)
}

/// Pull every record from `source`, tagging failures with its origin.
async fn acquire<S: RecordSource>(source: &S) -> Result<Vec<RawRecord>, RunError> {
    let origin = source.describe();
    info!(%origin, "Acquiring input records");
    source
        .fetch_records()
        .await
        .map_err(|source| RunError::Acquisition { origin, source })
}
