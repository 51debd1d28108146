//! # Night-Audit Errors

use chrono::NaiveDate;
use pms_core::AuditRunId;
use pms_registry::RegistryError;
use thiserror::Error;

/// Errors from the night-audit processor and its run registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// A completed run already exists for the date.
    #[error("night audit for {date} has already been completed")]
    AlreadyAudited {
        /// The audit date.
        date: NaiveDate,
    },

    /// Another run for the date is currently in progress. The date
    /// reservation is atomic, so two concurrent schedulers cannot both
    /// get past this.
    #[error("a night audit for {date} is already in progress")]
    RunInProgress {
        /// The audit date.
        date: NaiveDate,
    },

    /// No run with the given id.
    #[error("audit run not found: {0}")]
    RunNotFound(AuditRunId),

    /// A store error surfaced mid-run.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
