//! # Registry Errors

use pms_core::{BookingId, RoomId};
use thiserror::Error;

/// Errors from the in-memory stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No room with the given id.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// No room with the given door number.
    #[error("unknown room number: {0:?}")]
    UnknownRoomNumber(String),

    /// A room with the same door number already exists.
    #[error("duplicate room number: {0:?}")]
    DuplicateRoomNumber(String),

    /// No booking with the given id.
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    /// A booking with the same id already exists.
    #[error("duplicate booking: {0}")]
    DuplicateBooking(BookingId),
}
