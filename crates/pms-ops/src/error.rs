//! # Operational Errors

use pms_core::{BookingId, RoomId};
use pms_registry::RegistryError;
use pms_state::{RoomStatus, TransitionError};
use thiserror::Error;

/// Errors raised by the state machine and the booking synchronizer.
///
/// A guard block is deliberately absent from this taxonomy: it is recorded
/// in the attempt log and swallowed, never surfaced to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// No room with the given id.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// No booking with the given id.
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The (from, to) pair does not appear in the rule table.
    #[error("no transition defined from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: RoomStatus,
        /// Requested target status.
        to: RoomStatus,
    },

    /// The (from, to) pair is in the rule table but disallowed.
    #[error("transition from {from} to {to} is forbidden")]
    TransitionForbidden {
        /// Current status.
        from: RoomStatus,
        /// Requested target status.
        to: RoomStatus,
    },

    /// The party is larger than the room sleeps.
    #[error("party of {requested} exceeds the room's maximum occupancy of {max}")]
    OccupancyExceeded {
        /// Adults plus children on the booking.
        requested: u32,
        /// The room's maximum occupancy.
        max: u32,
    },

    /// Check-in attempted against a room housekeeping or engineering still
    /// owns.
    #[error("room {room_number} is not ready for check-in (status {status})")]
    RoomNotReady {
        /// Door number of the room.
        room_number: String,
        /// The status blocking the check-in.
        status: RoomStatus,
    },

    /// A store error with no more specific mapping.
    #[error(transparent)]
    Registry(RegistryError),
}

impl From<RegistryError> for OpsError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::RoomNotFound(id) => OpsError::RoomNotFound(id),
            RegistryError::BookingNotFound(id) => OpsError::BookingNotFound(id),
            other => OpsError::Registry(other),
        }
    }
}

impl From<TransitionError> for OpsError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Undefined { from, to } => OpsError::InvalidTransition { from, to },
            TransitionError::Forbidden { from, to } => OpsError::TransitionForbidden { from, to },
        }
    }
}
