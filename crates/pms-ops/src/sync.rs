//! # Booking Lifecycle Synchronizer
//!
//! Reacts to booking status writes and drives the matching room
//! transition, always as an `Auto` request. Rules, in priority order:
//!
//! 1. `checked_in`, room not `occupied` → room `occupied` (stay dates).
//! 2. `checked_out`, room `occupied` → room `dirty` (never skips the
//!    cleaning step; fires only from `occupied`).
//! 3. `confirmed`/`pending`, room `available`, check-in strictly in the
//!    future → room `reserved` (stay dates).
//! 4. `cancelled`/`no_show`, no other active booking on the room → room
//!    `available`. When housekeeping or engineering owns the room the
//!    request still goes through the machine so the guard records the
//!    blocked attempt; the room itself stays put.
//!
//! Occupancy validation (`adults + children ≤ max_occupancy`) runs ahead
//! of everything, and the room side effect runs ahead of the booking
//! write: a hard transition error aborts the booking write too, while a
//! guard block does not.

use std::sync::Arc;

use tracing::info;

use pms_core::{BookingId, RoomId, SharedClock};
use pms_registry::{Booking, BookingStore, DatePair, NewBooking, RoomStore};
use pms_state::{BookingStatus, RoomStatus, TransitionSource};

use crate::error::OpsError;
use crate::machine::{RoomStateMachine, TransitionRequest};

// ── Occupancy Seam ─────────────────────────────────────────────────────

/// Source of a room's maximum occupancy. The room store is the production
/// implementation; the seam exists so the check can be backed by a room-type
/// catalogue instead.
pub trait MaxOccupancyLookup: Send + Sync {
    /// Maximum occupants the room sleeps.
    ///
    /// # Errors
    ///
    /// [`OpsError::RoomNotFound`] for an unknown room.
    fn max_occupancy(&self, room_id: RoomId) -> Result<u32, OpsError>;
}

impl MaxOccupancyLookup for RoomStore {
    fn max_occupancy(&self, room_id: RoomId) -> Result<u32, OpsError> {
        Ok(self.snapshot(room_id)?.max_occupancy)
    }
}

// ── Synchronizer ───────────────────────────────────────────────────────

/// Applies booking writes together with their room side effects.
pub struct BookingLifecycleSynchronizer {
    bookings: Arc<BookingStore>,
    rooms: Arc<RoomStore>,
    occupancy: Arc<dyn MaxOccupancyLookup>,
    machine: Arc<RoomStateMachine>,
    clock: SharedClock,
}

impl BookingLifecycleSynchronizer {
    /// Build a synchronizer; the room store answers occupancy lookups.
    pub fn new(
        bookings: Arc<BookingStore>,
        rooms: Arc<RoomStore>,
        machine: Arc<RoomStateMachine>,
        clock: SharedClock,
    ) -> Self {
        let occupancy = Arc::clone(&rooms) as Arc<dyn MaxOccupancyLookup>;
        Self {
            bookings,
            rooms,
            occupancy,
            machine,
            clock,
        }
    }

    /// Swap in a different occupancy source.
    pub fn with_occupancy_lookup(mut self, occupancy: Arc<dyn MaxOccupancyLookup>) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Create a booking and run its room side effect as one unit.
    ///
    /// # Errors
    ///
    /// [`OpsError::OccupancyExceeded`] when the party does not fit;
    /// [`OpsError::RoomNotReady`] for a walk-in check-in against a room
    /// housekeeping or engineering owns; transition errors from the room
    /// side effect abort the insert.
    pub fn create_booking(&self, new: NewBooking) -> Result<Booking, OpsError> {
        self.validate_occupancy(new.room_id, new.adults + new.children)?;
        if new.status == BookingStatus::CheckedIn {
            self.ensure_ready_for_check_in(new.room_id)?;
        }

        let booking = new.into_booking(self.clock.now());
        self.apply_room_effect(&booking)?;
        self.bookings.insert(booking.clone())?;
        info!(booking = %booking.id, number = %booking.number, status = ?booking.status, "booking created");
        Ok(booking)
    }

    /// Write a booking status and run its room side effect as one unit.
    /// A same-status write is a no-op.
    ///
    /// # Errors
    ///
    /// [`OpsError::BookingNotFound`] for an unknown booking;
    /// [`OpsError::RoomNotReady`] for a check-in against an unready room;
    /// transition errors from the room side effect abort the status write.
    pub fn update_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, OpsError> {
        let mut booking = self.bookings.get(id)?;
        if booking.status == status {
            return Ok(booking);
        }
        if status == BookingStatus::CheckedIn {
            self.ensure_ready_for_check_in(booking.room_id)?;
        }

        let previous = booking.status;
        booking.status = status;
        self.apply_room_effect(&booking)?;
        let updated = self.bookings.update(id, self.clock.now(), |b| {
            b.status = status;
            b.clone()
        })?;
        info!(booking = %id, from = ?previous, to = ?status, "booking status changed");
        Ok(updated)
    }

    fn validate_occupancy(&self, room_id: RoomId, requested: u32) -> Result<(), OpsError> {
        let max = self.occupancy.max_occupancy(room_id)?;
        if requested > max {
            return Err(OpsError::OccupancyExceeded { requested, max });
        }
        Ok(())
    }

    fn ensure_ready_for_check_in(&self, room_id: RoomId) -> Result<(), OpsError> {
        let room = self.rooms.snapshot(room_id)?;
        if room.status.is_manually_owned() {
            return Err(OpsError::RoomNotReady {
                room_number: room.number.as_str().to_string(),
                status: room.status,
            });
        }
        Ok(())
    }

    /// Evaluate the rules against the booking's (new) status and push the
    /// resulting request through the machine. Guard blocks come back as
    /// `Ok`; hard errors propagate.
    fn apply_room_effect(&self, booking: &Booking) -> Result<(), OpsError> {
        let Some(request) = self.room_effect(booking)? else {
            return Ok(());
        };
        self.machine.apply(request)?;
        Ok(())
    }

    fn room_effect(&self, booking: &Booking) -> Result<Option<TransitionRequest>, OpsError> {
        let today = self.clock.today();
        let room_status = self.rooms.status(booking.room_id)?;
        let stay = DatePair::new(booking.check_in, booking.check_out);

        let request = match booking.status {
            BookingStatus::CheckedIn if room_status != RoomStatus::Occupied => Some(
                TransitionRequest::new(booking.room_id, RoomStatus::Occupied, TransitionSource::Auto)
                    .with_note(format!("checked in: {}", booking.number))
                    .with_dates(stay),
            ),
            BookingStatus::CheckedOut if room_status == RoomStatus::Occupied => Some(
                TransitionRequest::new(booking.room_id, RoomStatus::Dirty, TransitionSource::Auto)
                    .with_note(format!("checked out: {}", booking.number))
                    .with_dates(DatePair {
                        start: Some(today),
                        end: None,
                    }),
            ),
            BookingStatus::Confirmed | BookingStatus::Pending
                if room_status == RoomStatus::Available && booking.check_in > today =>
            {
                Some(
                    TransitionRequest::new(
                        booking.room_id,
                        RoomStatus::Reserved,
                        TransitionSource::Auto,
                    )
                    .with_note(format!("reserved: {}", booking.number))
                    .with_dates(stay),
                )
            }
            BookingStatus::Cancelled | BookingStatus::NoShow
                if room_status != RoomStatus::Available
                    && !self
                        .bookings
                        .has_other_active(booking.room_id, booking.id, today) =>
            {
                Some(
                    TransitionRequest::new(
                        booking.room_id,
                        RoomStatus::Available,
                        TransitionSource::Auto,
                    )
                    .with_note(format!("released: {}", booking.number)),
                )
            }
            _ => None,
        };
        Ok(request)
    }
}
