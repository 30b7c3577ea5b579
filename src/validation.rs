//! Rule-based record validation.
//!
//! The validator holds an ordered list of independent rules. Every rule runs
//! on every record, so a record with several problems reports all of them,
//! always in the same order:
//!
//! 1. required fields present and non-empty (one reason per field)
//! 2. `url` is an absolute `http`/`https` URL with a host
//! 3. `content` meets the minimum length

use crate::config::PipelineConfig;
use crate::models::{CleanedRecord, has_field, scalar_text};
use std::fmt;
use url::Url;

/// Why a record was rejected. The `Display` form is the stable reason
/// string tallied by the quality report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    MissingField(String),
    InvalidUrl,
    ContentTooShort { min: usize },
    Processing(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::MissingField(field) => write!(f, "missing or empty field: {field}"),
            FailureReason::InvalidUrl => write!(f, "invalid URL format"),
            FailureReason::ContentTooShort { min } => {
                write!(f, "content too short: fewer than {min} characters")
            }
            FailureReason::Processing(msg) => write!(f, "processing error: {msg}"),
        }
    }
}

/// Verdict for one record. `reasons` is empty exactly when the record is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    pub reasons: Vec<FailureReason>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }
}

type Rule = fn(&Validator, &CleanedRecord, &mut Vec<FailureReason>);

/// Evaluation order of the rules.
const RULES: &[Rule] = &[check_required_fields, check_url_format, check_content_length];

/// Applies the fixed rule set to cleaned records.
#[derive(Debug, Clone)]
pub struct Validator {
    required_fields: Vec<String>,
    min_content_length: usize,
}

impl Validator {
    pub fn new(required_fields: Vec<String>, min_content_length: usize) -> Self {
        Self {
            required_fields,
            min_content_length,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.required_fields.clone(), config.min_content_length)
    }

    /// Run every rule against `record`.
    pub fn validate(&self, record: &CleanedRecord) -> ValidationOutcome {
        let mut reasons = Vec::new();
        for rule in RULES {
            rule(self, record, &mut reasons);
        }
        ValidationOutcome { reasons }
    }
}

fn check_required_fields(validator: &Validator, record: &CleanedRecord, reasons: &mut Vec<FailureReason>) {
    for field in &validator.required_fields {
        if !has_field(record, field) {
            reasons.push(FailureReason::MissingField(field.clone()));
        }
    }
}

fn check_url_format(_: &Validator, record: &CleanedRecord, reasons: &mut Vec<FailureReason>) {
    if !has_field(record, "url") {
        return;
    }
    let valid = record
        .get("url")
        .and_then(|v| v.as_str())
        .is_some_and(is_valid_url);
    if !valid {
        reasons.push(FailureReason::InvalidUrl);
    }
}

fn check_content_length(validator: &Validator, record: &CleanedRecord, reasons: &mut Vec<FailureReason>) {
    // Empty content is already reported as a missing field.
    if !has_field(record, "content") {
        return;
    }
    let length = record
        .get("content")
        .and_then(scalar_text)
        .map_or(0, |text| text.chars().count());
    if length < validator.min_content_length {
        reasons.push(FailureReason::ContentTooShort {
            min: validator.min_content_length,
        });
    }
}

/// Absolute `http`/`https` URL with a non-empty host.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}
