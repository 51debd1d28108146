//! # Transition Validation Errors

use thiserror::Error;

use crate::room::RoomStatus;

/// The two ways the rule table can reject a (from, to) pair.
///
/// Same-status requests never produce either — they are always valid
/// regardless of the table's contents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The pair does not appear in the rule table at all.
    #[error("no transition defined from {from} to {to}")]
    Undefined {
        /// Current status.
        from: RoomStatus,
        /// Attempted target status.
        to: RoomStatus,
    },

    /// The pair is in the table but marked not allowed.
    #[error("transition from {from} to {to} is forbidden")]
    Forbidden {
        /// Current status.
        from: RoomStatus,
        /// Attempted target status.
        to: RoomStatus,
    },
}
