use chrono::NaiveDate;
use thiserror::Error;

/// Failure of the underlying key-value medium. These never escape [crate::storage::record_store]
/// and are only reported as a failed save.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage quota exceeded: {needed} bytes needed, capacity is {capacity}")]
    QuotaExceeded { needed: usize, capacity: usize },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeekStartError {
    #[error("{0} is not a Monday")]
    NotMonday(NaiveDate),

    /// Week keys hold a four digit year.
    #[error("{0} is outside of the years 0 to 9999")]
    OutOfRange(NaiveDate),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyDecodeError {
    /// The key belongs to something else in the store, like goals or the roster.
    #[error("key is not a week key")]
    NotAWeekKey,

    #[error("week key {key:?} is malformed: {reason}")]
    Malformed { key: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("representative name can't be empty")]
    Empty,

    #[error("representative {0:?} is already on the roster")]
    Duplicate(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{0:?} is not a non-negative whole number")]
    NotACount(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No activity data found. Make sure you have saved some data first!")]
    NothingToExport,
}
