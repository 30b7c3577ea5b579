//! Record sources: where a run's raw records come from.
//!
//! The runner only ever sees a `Vec<RawRecord>`. Each source implements
//! [`RecordSource`], so reading a local file and fetching one remote
//! article look the same to the caller.
//!
//! # Supported Sources
//!
//! | Source | Module | Yields |
//! |--------|--------|--------|
//! | Local JSON array | [`file`] | one record per array item |
//! | Wikipedia article | [`wikipedia`] | exactly one record from the REST summary API |
//!
//! Any failure to obtain records is a [`SourceError`] and aborts the run
//! before per-record processing begins.

pub mod file;
pub mod wikipedia;

use crate::error::SourceError;
use crate::models::RawRecord;

pub use file::FileSource;
pub use wikipedia::WikipediaSource;

/// Something that can produce the raw records for one run.
pub trait RecordSource {
    /// Short human-readable origin, used in logs and fatal error messages.
    fn describe(&self) -> String;

    /// Obtain every record, or fail as a whole.
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError>;
}
