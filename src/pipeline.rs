//! Pipeline runner and quality statistics.
//!
//! The runner cleans and validates each record in input order, routes it to
//! the valid output or the rejected list, and feeds a single
//! [`QualityAccumulator`]. The accumulator is consumed by
//! [`QualityAccumulator::finalize`], so percentages and rankings only exist
//! once every record has been seen.

use crate::cleaning::RecordCleaner;
use crate::config::PipelineConfig;
use crate::models::{CleanedRecord, RawRecord, is_filled};
use crate::utils::truncate_for_log;
use crate::validation::{FailureReason, ValidationOutcome, Validator};
use itertools::Itertools;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, instrument, warn};

/// A record that failed validation, by input position.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub index: usize,
    pub reasons: Vec<FailureReason>,
}

/// Result of one run.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Cleaned records that passed validation, in input order.
    pub valid_records: Vec<CleanedRecord>,
    pub rejected: Vec<RejectedRecord>,
    pub stats: QualityStats,
}

/// Finalized statistics for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityStats {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Field name and completeness percentage in `[0, 100]`.
    pub completeness: Vec<(String, f64)>,
    /// Reason and count, most frequent first; ties keep first-seen order.
    pub failure_counts: Vec<(String, usize)>,
}

impl QualityStats {
    /// Share of valid records as a percentage; 0 for an empty run.
    pub fn valid_rate(&self) -> f64 {
        percentage(self.valid, self.total)
    }

    /// Number of individual reasons emitted across the run.
    pub fn total_reasons(&self) -> usize {
        self.failure_counts.iter().map(|(_, count)| count).sum()
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Running counters, updated once per record.
#[derive(Debug, Default)]
pub struct QualityAccumulator {
    total: usize,
    valid: usize,
    invalid: usize,
    field_order: Vec<String>,
    field_presence: HashMap<String, usize>,
    reason_order: Vec<String>,
    reason_counts: HashMap<String, usize>,
}

impl QualityAccumulator {
    /// Start with `required_fields` listed first, even if never seen.
    pub fn new(required_fields: &[String]) -> Self {
        let mut acc = Self::default();
        for field in required_fields {
            acc.see_field(field);
        }
        acc
    }

    fn see_field(&mut self, field: &str) -> &mut usize {
        if !self.field_presence.contains_key(field) {
            self.field_order.push(field.to_string());
        }
        self.field_presence.entry(field.to_string()).or_insert(0)
    }

    /// Count one processed record.
    pub fn record(&mut self, record: &CleanedRecord, outcome: &ValidationOutcome) {
        self.total += 1;
        if outcome.is_valid() {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }

        for (field, value) in record {
            let present = self.see_field(field);
            if is_filled(value) {
                *present += 1;
            }
        }

        for reason in &outcome.reasons {
            let reason = reason.to_string();
            match self.reason_counts.get_mut(&reason) {
                Some(count) => *count += 1,
                None => {
                    self.reason_order.push(reason.clone());
                    self.reason_counts.insert(reason, 1);
                }
            }
        }
    }

    /// Compute percentages and the failure ranking.
    pub fn finalize(self) -> QualityStats {
        let total = self.total;
        let completeness = self
            .field_order
            .iter()
            .map(|field| {
                let present = self.field_presence.get(field).copied().unwrap_or(0);
                (field.clone(), percentage(present, total))
            })
            .collect();

        // Stable sort: equal counts stay in first-seen order.
        let failure_counts = self
            .reason_order
            .into_iter()
            .map(|reason| {
                let count = self.reason_counts.get(&reason).copied().unwrap_or(0);
                (reason, count)
            })
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .collect();

        QualityStats {
            total,
            valid: self.valid,
            invalid: self.invalid,
            completeness,
            failure_counts,
        }
    }
}

/// Cleans, validates and tallies a batch of records.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cleaner: RecordCleaner,
    validator: Validator,
    required_fields: Vec<String>,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            cleaner: RecordCleaner::from_config(config),
            validator: Validator::from_config(config),
            required_fields: config.required_fields.clone(),
        }
    }

    /// Process every record. A failure inside one record never stops the run.
    ///
    /// # Arguments
    ///
    /// * `records` - Raw records in input order
    ///
    /// # Returns
    ///
    /// The valid cleaned records, the rejected record indices with their
    /// reasons, and the finalized [`QualityStats`]. `valid + invalid` always
    /// equals the number of input records.
    #[instrument(level = "info", skip_all, fields(records = records.len()))]
    pub fn run(&self, records: Vec<RawRecord>) -> PipelineOutcome {
        let mut acc = QualityAccumulator::new(&self.required_fields);
        let mut valid_records = Vec::new();
        let mut rejected = Vec::new();

        for (index, raw) in records.into_iter().enumerate() {
            let (cleaned, outcome) = self.process(index, raw);
            acc.record(&cleaned, &outcome);

            if outcome.is_valid() {
                debug!(index, "Record valid");
                valid_records.push(cleaned);
            } else {
                let title = cleaned
                    .get("title")
                    .and_then(|v| v.as_str())
                    .map(|t| truncate_for_log(t, 60))
                    .unwrap_or_default();
                debug!(index, %title, reasons = outcome.reasons.len(), "Record rejected");
                rejected.push(RejectedRecord {
                    index,
                    reasons: outcome.reasons,
                });
            }
        }

        let stats = acc.finalize();
        info!(
            total = stats.total,
            valid = stats.valid,
            invalid = stats.invalid,
            "Pipeline run finished"
        );
        PipelineOutcome {
            valid_records,
            rejected,
            stats,
        }
    }

    /// Clean and validate one record, turning a panic into a rejection.
    fn process(&self, index: usize, raw: RawRecord) -> (CleanedRecord, ValidationOutcome) {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            let cleaned = self.cleaner.clean(&raw);
            let outcome = self.validator.validate(&cleaned);
            (cleaned, outcome)
        }));

        match attempt {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unexpected failure".to_string());
                warn!(index, error = %message, "Record processing failed; counting as invalid");
                let outcome = ValidationOutcome {
                    reasons: vec![FailureReason::Processing(message)],
                };
                (raw, outcome)
            }
        }
    }
}
