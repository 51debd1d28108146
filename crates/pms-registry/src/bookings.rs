//! # Booking Records and the Booking Store
//!
//! Bookings are created by the reservation workflow and mutated by the
//! check-in/out/cancel actions; this store holds the records and answers
//! the date-scoped queries the synchronizer and the night audit run:
//! "does any *other* active booking still hold this room", "which unposted
//! bookings is date D responsible for", "which rooms had a guest in house
//! on date D".

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use pms_core::{BookingId, Money, RoomId, Timestamp};
use pms_state::{BookingStatus, ComplimentaryPeriod};

use crate::error::RegistryError;

// ── Booking ────────────────────────────────────────────────────────────

/// A reservation spanning a date range for a room and guest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Human-facing booking reference (e.g. `"BK-2026-0042"`).
    pub number: String,
    /// The room this booking claims.
    pub room_id: RoomId,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date (exclusive night boundary: the guest is in house on
    /// dates `check_in <= d < check_out`).
    pub check_out: NaiveDate,
    /// Adult occupants.
    pub adults: u32,
    /// Child occupants.
    pub children: u32,
    /// Total charge for the stay.
    pub total_amount: Money,
    /// Whether a completed night audit has posted this booking.
    pub is_posted: bool,
    /// The audit date that posted it.
    pub posted_date: Option<NaiveDate>,
    /// Complimentary stretch of the stay, if any. Orthogonal to `status`.
    pub complimentary: Option<ComplimentaryPeriod>,
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the record was last mutated.
    pub updated_at: Timestamp,
}

impl Booking {
    /// Total occupants the booking brings.
    pub fn occupants(&self) -> u32 {
        self.adults + self.children
    }

    /// Whether the stay spans the given date (`check_in <= date < check_out`).
    pub fn spans(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }
}

/// Input for creating a booking record. The store assigns the id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Human-facing booking reference.
    pub number: String,
    /// The room to claim.
    pub room_id: RoomId,
    /// Initial status (normally `pending` or `confirmed`; walk-ins arrive
    /// as `checked_in`).
    pub status: BookingStatus,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
    /// Adult occupants.
    pub adults: u32,
    /// Child occupants.
    pub children: u32,
    /// Total charge for the stay.
    pub total_amount: Money,
}

impl NewBooking {
    /// Materialize a full record with a fresh id and timestamps.
    pub fn into_booking(self, now: Timestamp) -> Booking {
        Booking {
            id: BookingId::new(),
            number: self.number,
            room_id: self.room_id,
            status: self.status,
            check_in: self.check_in,
            check_out: self.check_out,
            adults: self.adults,
            children: self.children,
            total_amount: self.total_amount,
            is_posted: false,
            posted_date: None,
            complimentary: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ── Booking Store ──────────────────────────────────────────────────────

/// Thread-safe booking store.
#[derive(Debug, Default)]
pub struct BookingStore {
    bookings: RwLock<HashMap<BookingId, Booking>>,
}

impl BookingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed booking record.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateBooking`] if the id is already present.
    pub fn insert(&self, booking: Booking) -> Result<BookingId, RegistryError> {
        let mut bookings = self.bookings.write();
        if bookings.contains_key(&booking.id) {
            return Err(RegistryError::DuplicateBooking(booking.id));
        }
        let id = booking.id;
        bookings.insert(id, booking);
        Ok(id)
    }

    /// A copy of the booking record.
    pub fn get(&self, id: BookingId) -> Result<Booking, RegistryError> {
        self.bookings
            .read()
            .get(&id)
            .cloned()
            .ok_or(RegistryError::BookingNotFound(id))
    }

    /// Run `f` with mutable access to the booking, stamping `updated_at`
    /// with the caller's `now`.
    pub fn update<T>(
        &self,
        id: BookingId,
        now: Timestamp,
        f: impl FnOnce(&mut Booking) -> T,
    ) -> Result<T, RegistryError> {
        let mut bookings = self.bookings.write();
        let booking = bookings
            .get_mut(&id)
            .ok_or(RegistryError::BookingNotFound(id))?;
        let out = f(booking);
        booking.updated_at = now;
        Ok(out)
    }

    /// Whether any booking *other than* `exclude` still actively holds the
    /// room: status in the active set and check-out on or after `today`.
    pub fn has_other_active(
        &self,
        room_id: RoomId,
        exclude: BookingId,
        today: NaiveDate,
    ) -> bool {
        self.bookings.read().values().any(|b| {
            b.id != exclude
                && b.room_id == room_id
                && b.status.is_active()
                && b.check_out >= today
        })
    }

    /// Unposted bookings the audit for `audit_date` is responsible for:
    /// active across the date, checked out exactly on it, or created or
    /// modified on it — excluding cancelled/no-show.
    pub fn unposted_eligible(&self, audit_date: NaiveDate) -> Vec<Booking> {
        let mut eligible: Vec<Booking> = self
            .bookings
            .read()
            .values()
            .filter(|b| !b.is_posted && !b.status.excluded_from_posting())
            .filter(|b| {
                b.spans(audit_date)
                    || (b.check_out == audit_date && b.status == BookingStatus::CheckedOut)
                    || b.created_at.date() == audit_date
                    || b.updated_at.date() == audit_date
            })
            .cloned()
            .collect();
        eligible.sort_by_key(|b| (b.check_in, b.id));
        eligible
    }

    /// Rooms with a `checked_in` booking spanning the date. This is the
    /// authoritative occupied census — the cached room status can
    /// transiently disagree with it.
    pub fn checked_in_rooms_on(&self, date: NaiveDate) -> HashSet<RoomId> {
        self.bookings
            .read()
            .values()
            .filter(|b| b.status == BookingStatus::CheckedIn && b.spans(date))
            .map(|b| b.room_id)
            .collect()
    }

    /// Copies of every booking record.
    pub fn snapshots(&self) -> Vec<Booking> {
        self.bookings.read().values().cloned().collect()
    }

    /// Number of bookings held.
    pub fn len(&self) -> usize {
        self.bookings.read().len()
    }

    /// Whether the store has no bookings.
    pub fn is_empty(&self) -> bool {
        self.bookings.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make(
        store: &BookingStore,
        room_id: RoomId,
        status: BookingStatus,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> BookingId {
        let booking = NewBooking {
            number: format!("BK-{}", store.len() + 1),
            room_id,
            status,
            check_in,
            check_out,
            adults: 2,
            children: 0,
            total_amount: Money::parse("200.00").unwrap(),
        }
        .into_booking(Timestamp::now());
        store.insert(booking).unwrap()
    }

    #[test]
    fn test_spans_is_half_open() {
        let store = BookingStore::new();
        let id = make(
            &store,
            RoomId::new(),
            BookingStatus::Confirmed,
            date(2026, 9, 1),
            date(2026, 9, 4),
        );
        let b = store.get(id).unwrap();
        assert!(b.spans(date(2026, 9, 1)));
        assert!(b.spans(date(2026, 9, 3)));
        assert!(!b.spans(date(2026, 9, 4)));
        assert!(!b.spans(date(2026, 8, 31)));
    }

    #[test]
    fn test_has_other_active_excludes_self_and_inactive() {
        let store = BookingStore::new();
        let room = RoomId::new();
        let cancelled = make(
            &store,
            room,
            BookingStatus::Cancelled,
            date(2026, 9, 1),
            date(2026, 9, 4),
        );
        // Only the cancelled booking exists: nothing else holds the room.
        assert!(!store.has_other_active(room, cancelled, date(2026, 9, 1)));

        let other = make(
            &store,
            room,
            BookingStatus::Confirmed,
            date(2026, 9, 2),
            date(2026, 9, 6),
        );
        assert!(store.has_other_active(room, cancelled, date(2026, 9, 1)));
        // A booking never counts against itself.
        assert!(!store.has_other_active(room, other, date(2026, 9, 1)));
        // Past check-out no longer holds the room.
        assert!(!store.has_other_active(room, cancelled, date(2026, 9, 7)));
    }

    #[test]
    fn test_unposted_eligible_selection() {
        let store = BookingStore::new();
        let room = RoomId::new();
        let audit = date(2026, 9, 2);

        let spanning = make(
            &store,
            room,
            BookingStatus::CheckedIn,
            date(2026, 9, 1),
            date(2026, 9, 4),
        );
        let departed = make(
            &store,
            room,
            BookingStatus::CheckedOut,
            date(2026, 8, 30),
            audit,
        );
        let cancelled = make(
            &store,
            room,
            BookingStatus::Cancelled,
            date(2026, 9, 1),
            date(2026, 9, 4),
        );

        let selected: Vec<BookingId> = store
            .unposted_eligible(audit)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert!(selected.contains(&spanning));
        assert!(selected.contains(&departed));
        assert!(!selected.contains(&cancelled));
    }

    #[test]
    fn test_unposted_eligible_includes_created_on_audit_date() {
        let store = BookingStore::new();
        let audit = Timestamp::now().date();
        // Stay entirely in the future, but the record was created on the
        // audit date, so the audit still picks it up.
        let id = make(
            &store,
            RoomId::new(),
            BookingStatus::Confirmed,
            audit + chrono::Duration::days(30),
            audit + chrono::Duration::days(32),
        );
        let selected: Vec<BookingId> = store
            .unposted_eligible(audit)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(selected, vec![id]);
    }

    #[test]
    fn test_unposted_eligible_skips_posted() {
        let store = BookingStore::new();
        let room = RoomId::new();
        let audit = date(2026, 9, 2);
        let id = make(
            &store,
            room,
            BookingStatus::CheckedIn,
            date(2026, 9, 1),
            date(2026, 9, 4),
        );
        store
            .update(id, Timestamp::now(), |b| {
                b.is_posted = true;
                b.posted_date = Some(audit);
            })
            .unwrap();
        assert!(store.unposted_eligible(audit).is_empty());
    }

    #[test]
    fn test_unposted_eligible_includes_modified_on_audit_date() {
        let store = BookingStore::new();
        let audit = date(2027, 1, 15);
        // Stay long over, but a correction landed on the audit date; the
        // audit owns anything touched that day.
        let id = make(
            &store,
            RoomId::new(),
            BookingStatus::CheckedIn,
            date(2027, 1, 1),
            date(2027, 1, 5),
        );
        assert!(store.unposted_eligible(audit).is_empty());

        let touched = Timestamp::parse("2027-01-15T02:00:00Z").unwrap();
        store
            .update(id, touched, |b| b.status = BookingStatus::CheckedOut)
            .unwrap();
        let selected: Vec<BookingId> = store
            .unposted_eligible(audit)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(selected, vec![id]);
    }

    #[test]
    fn test_checked_in_rooms_census() {
        let store = BookingStore::new();
        let room_a = RoomId::new();
        let room_b = RoomId::new();
        make(
            &store,
            room_a,
            BookingStatus::CheckedIn,
            date(2026, 9, 1),
            date(2026, 9, 4),
        );
        make(
            &store,
            room_b,
            BookingStatus::Confirmed,
            date(2026, 9, 1),
            date(2026, 9, 4),
        );
        let census = store.checked_in_rooms_on(date(2026, 9, 2));
        assert!(census.contains(&room_a));
        assert!(!census.contains(&room_b));
    }
}
