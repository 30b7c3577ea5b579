//! Command-line interface definitions for scrape_quality.
//!
//! Two run modes are mutually exclusive: read a local JSON array with
//! `--input`, or fetch one Wikipedia article with `--scrape-url`. With
//! neither flag the configured default input file is read.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the scrape_quality pipeline.
///
/// # Examples
///
/// ```sh
/// # Clean and validate a local file
/// scrape_quality --input sample_data.json
///
/// # Fetch a single article instead
/// scrape_quality --scrape-url https://en.wikipedia.org/wiki/Rust_(programming_language)
///
/// # Stricter content threshold, outputs under ./out
/// scrape_quality -i data.json -o ./out --min-content-length 40
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to raw scraped JSON (an array of objects)
    #[arg(short, long, conflicts_with = "scrape_url")]
    pub input: Option<PathBuf>,

    /// Fetch a single en.wikipedia.org article instead of reading a file
    #[arg(short, long)]
    pub scrape_url: Option<String>,

    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "SCRAPE_QUALITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for cleaned_output.json and quality_report.txt
    #[arg(short, long, env = "SCRAPE_QUALITY_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Minimum number of characters required in `content`
    #[arg(long)]
    pub min_content_length: Option<usize>,

    /// Number of failure reasons listed in the report
    #[arg(long)]
    pub top_failures: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "scrape_quality",
            "--input",
            "./data.json",
            "--output-dir",
            "./out",
        ]);

        assert_eq!(cli.input, Some(PathBuf::from("./data.json")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("./out")));
        assert!(cli.scrape_url.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "scrape_quality",
            "-s",
            "https://en.wikipedia.org/wiki/Rust",
            "-o",
            "/tmp/out",
        ]);

        assert_eq!(cli.scrape_url.as_deref(), Some("https://en.wikipedia.org/wiki/Rust"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_cli_modes_conflict() {
        let res = Cli::try_parse_from([
            "scrape_quality",
            "--input",
            "data.json",
            "--scrape-url",
            "https://en.wikipedia.org/wiki/Rust",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_rejects_non_numeric_threshold() {
        let res = Cli::try_parse_from(["scrape_quality", "--min-content-length", "ten"]);
        assert!(res.is_err());
    }
}
