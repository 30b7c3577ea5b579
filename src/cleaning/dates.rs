//! Best-effort date normalization for date-like fields.
//!
//! Parsers are tried in a fixed priority order and the first success wins.
//! Every parser returns `Option`; a value nothing recognises falls back to
//! its text-normalized form, so a bad date never fails a record.

use super::text::normalize_text;
use crate::config::PipelineConfig;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

type DateParser = fn(&str) -> Option<String>;

/// Parsers in priority order, named for trace logging.
const PARSERS: &[(&str, DateParser)] = &[
    ("rfc3339", parse_rfc3339),
    ("zoned date-time", parse_zoned),
    ("rfc2822", parse_rfc2822),
    ("naive date-time", parse_naive_datetime),
    ("date", parse_date),
    ("unix timestamp", parse_timestamp_text),
];

const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

// Day-first is tried before month-first for slash dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const CANONICAL_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]{9,13}(\.[0-9]+)?$").expect("timestamp pattern is valid"));

/// Values above this are read as milliseconds rather than seconds.
const MILLIS_THRESHOLD: f64 = 1e11;

/// Recognises date-like field names and rewrites their values.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    exact_keys: Vec<String>,
    key_markers: Vec<String>,
}

impl DateNormalizer {
    pub fn new(exact_keys: &[String], key_markers: &[String]) -> Self {
        Self {
            exact_keys: exact_keys.iter().map(|k| k.to_lowercase()).collect(),
            key_markers: key_markers.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.date_keys, &config.date_key_markers)
    }

    /// Whether `key` names a date field.
    pub fn is_date_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.exact_keys.iter().any(|k| *k == key)
            || self.key_markers.iter().any(|m| key.contains(m.as_str()))
    }

    /// Canonicalize a date field value.
    ///
    /// Strings are text-normalized, then parsed; numbers are Unix
    /// timestamps. Anything else, or a number out of range, is returned
    /// unchanged.
    pub fn normalize(&self, value: &Value) -> Value {
        match value {
            Value::String(raw) => {
                let cleaned = normalize_text(raw);
                Value::String(parse_date_text(&cleaned).unwrap_or(cleaned))
            }
            Value::Number(n) => n
                .as_f64()
                .and_then(parse_unix_timestamp)
                .map(Value::String)
                .unwrap_or_else(|| value.clone()),
            other => other.clone(),
        }
    }
}

/// Parse already-cleaned text into its canonical ISO 8601 form.
pub fn parse_date_text(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    PARSERS.iter().find_map(|(name, parse)| {
        let parsed = parse(text)?;
        trace!(parser = name, input = text, output = %parsed, "Parsed date value");
        Some(parsed)
    })
}

/// Unix seconds (or milliseconds, for large magnitudes) as UTC RFC 3339.
pub fn parse_unix_timestamp(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let secs = if value.abs() > MILLIS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::<Utc>::from_timestamp(whole as i64, nanos).map(|dt| dt.to_rfc3339())
}

fn to_utc_string(dt: DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Utc).to_rfc3339()
}

fn parse_rfc3339(text: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(text).ok().map(to_utc_string)
}

fn parse_zoned(text: &str) -> Option<String> {
    ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(to_utc_string)
}

fn parse_rfc2822(text: &str) -> Option<String> {
    DateTime::parse_from_rfc2822(text).ok().map(to_utc_string)
}

fn parse_naive_datetime(text: &str) -> Option<String> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.format(CANONICAL_DATETIME).to_string())
}

fn parse_date(text: &str) -> Option<String> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn parse_timestamp_text(text: &str) -> Option<String> {
    if !TIMESTAMP_RE.is_match(text) {
        return None;
    }
    text.parse::<f64>().ok().and_then(parse_unix_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> DateNormalizer {
        DateNormalizer::from_config(&PipelineConfig::default())
    }

    #[test]
    fn test_date_key_matching() {
        let dates = normalizer();
        for key in ["date", "published_date", "Published_At", "created_at", "updated", "timestamp", "time"] {
            assert!(dates.is_date_key(key), "{key} should be a date key");
        }
        for key in ["title", "content", "url", "runtime", "source"] {
            assert!(!dates.is_date_key(key), "{key} should not be a date key");
        }
    }

    #[test]
    fn test_slash_date() {
        assert_eq!(parse_date_text("2024/03/15").as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_common_date_forms() {
        assert_eq!(parse_date_text("2024-03-15").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date_text("2024.03.15").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date_text("Mar 15, 2024").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date_text("March 15, 2024").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date_text("15 March 2024").as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_day_first_wins_for_ambiguous_slash_dates() {
        assert_eq!(parse_date_text("03/04/2024").as_deref(), Some("2024-04-03"));
        // Only month-first is valid here.
        assert_eq!(parse_date_text("12/31/2024").as_deref(), Some("2024-12-31"));
    }

    #[test]
    fn test_datetimes() {
        assert_eq!(
            parse_date_text("2024-03-15T10:30:00Z").as_deref(),
            Some("2024-03-15T10:30:00+00:00")
        );
        assert_eq!(
            parse_date_text("2024-03-15T12:30:00+02:00").as_deref(),
            Some("2024-03-15T10:30:00+00:00")
        );
        assert_eq!(
            parse_date_text("2024-03-15 10:30").as_deref(),
            Some("2024-03-15T10:30:00")
        );
        assert_eq!(
            parse_date_text("2024/03/15 10:30:05").as_deref(),
            Some("2024-03-15T10:30:05")
        );
        assert_eq!(
            parse_date_text("Fri, 15 Mar 2024 10:30:00 +0000").as_deref(),
            Some("2024-03-15T10:30:00+00:00")
        );
    }

    #[test]
    fn test_unix_timestamps() {
        assert_eq!(parse_date_text("1710460800").as_deref(), Some("2024-03-15T00:00:00+00:00"));
        assert_eq!(parse_unix_timestamp(1710460800.0).as_deref(), Some("2024-03-15T00:00:00+00:00"));
        assert_eq!(parse_unix_timestamp(1710460800000.0).as_deref(), Some("2024-03-15T00:00:00+00:00"));
        assert_eq!(parse_unix_timestamp(f64::NAN), None);
        // Too short to be taken for a timestamp.
        assert_eq!(parse_date_text("2024"), None);
    }

    #[test]
    fn test_unparseable_falls_back_to_cleaned_text() {
        let dates = normalizer();
        assert_eq!(dates.normalize(&json!("  sometime   soon ")), json!("sometime soon"));
        assert_eq!(dates.normalize(&json!("")), json!(""));
        assert_eq!(dates.normalize(&json!("2024-02-30")), json!("2024-02-30"));
    }

    #[test]
    fn test_non_text_values() {
        let dates = normalizer();
        assert_eq!(dates.normalize(&json!(1710460800)), json!("2024-03-15T00:00:00+00:00"));
        assert_eq!(dates.normalize(&Value::Null), Value::Null);
        assert_eq!(dates.normalize(&json!(true)), json!(true));
        assert_eq!(dates.normalize(&json!(["2024-03-15"])), json!(["2024-03-15"]));
    }

    #[test]
    fn test_canonical_output_reparses_to_itself() {
        for input in [
            "2024/03/15",
            "2024-03-15 10:30",
            "2024-03-15T12:30:00.250+02:00",
            "1710460800.5",
            "March 15, 2024",
        ] {
            let canonical = parse_date_text(input).unwrap();
            assert_eq!(parse_date_text(&canonical).as_deref(), Some(canonical.as_str()));
        }
    }
}
