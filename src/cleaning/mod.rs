//! Record cleaning: text and date normalization applied field by field.
//!
//! # Submodules
//!
//! - [`text`]: entity decoding, tag stripping, NFKC, invisible-character
//!   removal and whitespace collapsing for a single string
//! - [`dates`]: best-effort canonicalization of date-like fields
//!
//! The cleaner never adds or removes keys. String fields go through
//! [`normalize_text`], date-like fields through [`DateNormalizer`], and
//! every other value is copied unchanged.

pub mod dates;
pub mod text;

use crate::config::PipelineConfig;
use crate::models::{CleanedRecord, RawRecord};
use serde_json::Value;

pub use dates::DateNormalizer;
pub use text::normalize_text;

/// Produces a [`CleanedRecord`] from a [`RawRecord`].
#[derive(Debug, Clone)]
pub struct RecordCleaner {
    dates: DateNormalizer,
}

impl RecordCleaner {
    pub fn new(dates: DateNormalizer) -> Self {
        Self { dates }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(DateNormalizer::from_config(config))
    }

    /// Clean every field of `record`, keeping key order.
    pub fn clean(&self, record: &RawRecord) -> CleanedRecord {
        record
            .iter()
            .map(|(key, value)| (key.clone(), self.clean_value(key, value)))
            .collect()
    }

    fn clean_value(&self, key: &str, value: &Value) -> Value {
        if self.dates.is_date_key(key) {
            return self.dates.normalize(value);
        }
        match value {
            Value::String(s) => Value::String(normalize_text(s)),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cleaner() -> RecordCleaner {
        RecordCleaner::from_config(&PipelineConfig::default())
    }

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn samples() -> Vec<RawRecord> {
        vec![
            record(json!({"title": "  Hi  ", "content": "1234567890", "url": "https://x.com/a"})),
            record(json!({"title": "", "content": "short", "url": "not-a-url"})),
            record(json!({
                "title": "T",
                "content": "0123456789AB",
                "url": "http://a.com",
                "published_date": "2024/03/15"
            })),
            record(json!({"title": "T &amp; Co <b>Inc</b>", "content": "0123456789AB", "url": "http://a.com"})),
            record(json!({
                "title": "&amp;lt;b&amp;gt;Nested",
                "views": 12,
                "tags": ["  a  ", "b"],
                "meta": {"author": " x "},
                "created_at": 1710460800,
                "updated_at": null,
                "date": "not a date",
                "timestamp": "Mar 15, 2024"
            })),
        ]
    }

    #[test]
    fn test_cleans_title_whitespace() {
        let cleaned = cleaner().clean(&samples()[0]);
        assert_eq!(cleaned["title"], json!("Hi"));
        assert_eq!(cleaned["content"], json!("1234567890"));
        assert_eq!(cleaned["url"], json!("https://x.com/a"));
    }

    #[test]
    fn test_normalizes_published_date() {
        let cleaned = cleaner().clean(&samples()[2]);
        assert_eq!(cleaned["published_date"], json!("2024-03-15"));
    }

    #[test]
    fn test_decodes_entities_and_strips_tags() {
        let cleaned = cleaner().clean(&samples()[3]);
        assert_eq!(cleaned["title"], json!("T & Co Inc"));
    }

    #[test]
    fn test_non_string_fields_pass_through() {
        let cleaned = cleaner().clean(&samples()[4]);
        assert_eq!(cleaned["views"], json!(12));
        assert_eq!(cleaned["tags"], json!(["  a  ", "b"]));
        assert_eq!(cleaned["meta"], json!({"author": " x "}));
        assert_eq!(cleaned["updated_at"], Value::Null);
        assert_eq!(cleaned["created_at"], json!("2024-03-15T00:00:00+00:00"));
        assert_eq!(cleaned["date"], json!("not a date"));
        assert_eq!(cleaned["timestamp"], json!("2024-03-15"));
        assert_eq!(cleaned["title"], json!("Nested"));
    }

    #[test]
    fn test_field_set_and_order_preserved() {
        let cleaner = cleaner();
        for raw in samples() {
            let cleaned = cleaner.clean(&raw);
            let raw_keys: Vec<&String> = raw.keys().collect();
            let cleaned_keys: Vec<&String> = cleaned.keys().collect();
            assert_eq!(raw_keys, cleaned_keys);
        }
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let cleaner = cleaner();
        for raw in samples() {
            let once = cleaner.clean(&raw);
            assert_eq!(cleaner.clean(&once), once);
        }
    }

    #[test]
    fn test_deeply_escaped_fields_are_idempotent() {
        let mut title = "&lt;b&gt;x".to_string();
        for _ in 0..9 {
            title = title.replace('&', "&amp;");
        }
        let published = format!("&amp;amp;{title}");
        let raw = record(json!({"title": title, "published_date": published}));
        let cleaner = cleaner();
        let once = cleaner.clean(&raw);
        assert_eq!(once["title"], json!("x"));
        assert_eq!(cleaner.clean(&once), once);
    }
}
