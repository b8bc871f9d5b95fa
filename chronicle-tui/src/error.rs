//! Error types for the fallible edges of the viewer.
//!
//! Presentation logic never fails; only loading event data and resolving
//! command line configuration can.

use std::path::PathBuf;

use chrono::NaiveDate;

/// Errors raised while loading an event collection.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The events file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The events document is not valid timeline JSON.
    #[error("invalid timeline data in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The timeline bounds do not describe a forward span of time.
    #[error("timeline end {end} must be after start {start}")]
    InvalidBounds { start: NaiveDate, end: NaiveDate },

    /// The axis label years are reversed.
    #[error("final label year {final_year} is before lead year {lead_year}")]
    InvalidLabelYears { lead_year: i32, final_year: i32 },
}
