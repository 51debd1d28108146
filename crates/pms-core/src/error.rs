//! # Error Types — Core Validation Errors
//!
//! Errors raised by the foundational types. Higher layers define their own
//! error enums and convert from these where a core constructor is on their
//! path.

use thiserror::Error;

/// Errors from constructing or parsing core domain primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A string identifier failed format validation.
    #[error("invalid {kind} {value:?}: {reason}")]
    InvalidIdentifier {
        /// What kind of identifier was being constructed.
        kind: &'static str,
        /// The offending input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp string could not be parsed or was not UTC.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The offending input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A monetary amount string could not be parsed as a decimal.
    #[error("invalid monetary amount: {0:?}")]
    InvalidAmount(String),
}
