//! # Room Records and the Room Store
//!
//! A [`Room`] is a mutable row plus an append-only history (kept in
//! [`crate::trail`]): the current status is a fold over that history and
//! must stay rebuildable from it. The store therefore exposes exactly one
//! mutation path, [`RoomStore::with_room`], which holds the room's own
//! mutex for the duration of the closure — that closure is the atomic,
//! serializable unit a status transition executes in.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use pms_core::{Money, RoomId, RoomNumber, Timestamp};
use pms_state::{DateSlot, RoomStatus};

use crate::error::RegistryError;

// ── Date Pair ──────────────────────────────────────────────────────────

/// A start/end date pair attached to a room status (stay dates, a
/// maintenance window, a cleaning window). Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatePair {
    /// Window start.
    pub start: Option<NaiveDate>,
    /// Window end.
    pub end: Option<NaiveDate>,
}

impl DatePair {
    /// A pair with both sides set.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    /// Whether neither side is set.
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

// ── Room ───────────────────────────────────────────────────────────────

/// A physical bookable unit with one current operational status.
///
/// The three date-pair slots are mutually exclusive: entering a status
/// populates its slot (see [`RoomStatus::date_slot`]) and clears the other
/// two. `last_posted_*` is the night-audit snapshot of where the room
/// stood when its date was last closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Human-facing door number.
    pub number: RoomNumber,
    /// Room type code (external room-type catalog owns the details).
    pub room_type: String,
    /// Maximum occupants (adults + children) the type allows.
    pub max_occupancy: u32,
    /// Nightly rate.
    pub rate_per_night: Money,
    /// Current operational status.
    pub status: RoomStatus,
    /// Free-text note attached to the current status.
    pub status_note: Option<String>,
    /// Stay dates while reserved or occupied.
    pub reserved_dates: DatePair,
    /// Scheduled maintenance window.
    pub maintenance_dates: DatePair,
    /// Scheduled cleaning window.
    pub cleaning_dates: DatePair,
    /// Status snapshotted by the most recent completed night audit.
    pub last_posted_status: Option<RoomStatus>,
    /// Date of the most recent completed night audit covering this room.
    pub last_posted_date: Option<NaiveDate>,
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the record was last mutated.
    pub updated_at: Timestamp,
}

impl Room {
    /// Create a new room in `available` status.
    pub fn new(
        number: RoomNumber,
        room_type: impl Into<String>,
        max_occupancy: u32,
        rate_per_night: Money,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: RoomId::new(),
            number,
            room_type: room_type.into(),
            max_occupancy,
            rate_per_night,
            status: RoomStatus::Available,
            status_note: None,
            reserved_dates: DatePair::default(),
            maintenance_dates: DatePair::default(),
            cleaning_dates: DatePair::default(),
            last_posted_status: None,
            last_posted_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Populate the slot belonging to `slot` and clear the other two.
    /// `None` clears all three (the `available` case).
    pub fn set_date_slot(&mut self, slot: Option<DateSlot>, pair: DatePair) {
        self.reserved_dates = DatePair::default();
        self.maintenance_dates = DatePair::default();
        self.cleaning_dates = DatePair::default();
        match slot {
            Some(DateSlot::Reserved) => self.reserved_dates = pair,
            Some(DateSlot::Maintenance) => self.maintenance_dates = pair,
            Some(DateSlot::Cleaning) => self.cleaning_dates = pair,
            None => {}
        }
    }

    /// Record a mutation time. Callers that change the room through
    /// [`RoomStore::with_room`] call this; reads and no-ops do not.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    /// The populated date pair for the given slot.
    pub fn date_slot(&self, slot: DateSlot) -> DatePair {
        match slot {
            DateSlot::Reserved => self.reserved_dates,
            DateSlot::Maintenance => self.maintenance_dates,
            DateSlot::Cleaning => self.cleaning_dates,
        }
    }
}

// ── Room Store ─────────────────────────────────────────────────────────

/// Thread-safe room store with per-room locking.
///
/// The outer map lock is held only long enough to find the room's entry;
/// the per-room mutex is what serializes transitions. Two rooms never
/// contend with each other.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>,
    by_number: RwLock<HashMap<String, RoomId>>,
}

impl RoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a room.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRoomNumber`] if the door number is taken.
    pub fn insert(&self, room: Room) -> Result<RoomId, RegistryError> {
        let mut by_number = self.by_number.write();
        if by_number.contains_key(room.number.as_str()) {
            return Err(RegistryError::DuplicateRoomNumber(
                room.number.as_str().to_string(),
            ));
        }
        let id = room.id;
        by_number.insert(room.number.as_str().to_string(), id);
        self.rooms.write().insert(id, Arc::new(Mutex::new(room)));
        Ok(id)
    }

    /// Run `f` with exclusive access to the room. This is the serializable
    /// unit for a transition: nothing else can read-modify-write the room
    /// while the closure runs.
    ///
    /// # Errors
    ///
    /// [`RegistryError::RoomNotFound`] if the room is absent.
    pub fn with_room<T>(
        &self,
        id: RoomId,
        f: impl FnOnce(&mut Room) -> T,
    ) -> Result<T, RegistryError> {
        let entry = {
            let rooms = self.rooms.read();
            rooms.get(&id).cloned()
        }
        .ok_or(RegistryError::RoomNotFound(id))?;
        let mut room = entry.lock();
        Ok(f(&mut room))
    }

    /// Current status of a room without taking the write path.
    pub fn status(&self, id: RoomId) -> Result<RoomStatus, RegistryError> {
        self.snapshot(id).map(|room| room.status)
    }

    /// A point-in-time copy of the room record.
    pub fn snapshot(&self, id: RoomId) -> Result<Room, RegistryError> {
        let entry = {
            let rooms = self.rooms.read();
            rooms.get(&id).cloned()
        }
        .ok_or(RegistryError::RoomNotFound(id))?;
        let room = entry.lock();
        Ok(room.clone())
    }

    /// Resolve a door number to a room id.
    pub fn by_number(&self, number: &str) -> Result<RoomId, RegistryError> {
        self.by_number
            .read()
            .get(number)
            .copied()
            .ok_or_else(|| RegistryError::UnknownRoomNumber(number.to_string()))
    }

    /// Point-in-time copies of every room record.
    pub fn snapshots(&self) -> Vec<Room> {
        let entries: Vec<Arc<Mutex<Room>>> = self.rooms.read().values().cloned().collect();
        entries.iter().map(|entry| entry.lock().clone()).collect()
    }

    /// Number of registered rooms.
    pub fn len(&self) -> usize {
        self.rooms.read().len()
    }

    /// Whether the store has no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(number: &str) -> Room {
        Room::new(
            RoomNumber::new(number).unwrap(),
            "standard",
            2,
            Money::parse("100.00").unwrap(),
        )
    }

    #[test]
    fn test_insert_and_snapshot() {
        let store = RoomStore::new();
        let id = store.insert(room("101")).unwrap();
        let snap = store.snapshot(id).unwrap();
        assert_eq!(snap.status, RoomStatus::Available);
        assert_eq!(snap.number.as_str(), "101");
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let store = RoomStore::new();
        store.insert(room("101")).unwrap();
        assert_eq!(
            store.insert(room("101")),
            Err(RegistryError::DuplicateRoomNumber("101".to_string()))
        );
    }

    #[test]
    fn test_by_number_resolution() {
        let store = RoomStore::new();
        let id = store.insert(room("205")).unwrap();
        assert_eq!(store.by_number("205"), Ok(id));
        assert!(matches!(
            store.by_number("999"),
            Err(RegistryError::UnknownRoomNumber(_))
        ));
    }

    #[test]
    fn test_with_room_applies_mutation() {
        let store = RoomStore::new();
        let id = store.insert(room("101")).unwrap();
        store
            .with_room(id, |room| {
                room.status = RoomStatus::Dirty;
                room.status_note = Some("spill".to_string());
            })
            .unwrap();
        let snap = store.snapshot(id).unwrap();
        assert_eq!(snap.status, RoomStatus::Dirty);
        assert_eq!(snap.status_note.as_deref(), Some("spill"));
    }

    #[test]
    fn test_with_room_unknown_id() {
        let store = RoomStore::new();
        let missing = RoomId::new();
        assert_eq!(
            store.with_room(missing, |_| ()),
            Err(RegistryError::RoomNotFound(missing))
        );
    }

    #[test]
    fn test_date_slot_exclusivity() {
        let mut r = room("101");
        let pair = DatePair::new(
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        );
        r.set_date_slot(Some(DateSlot::Maintenance), pair);
        assert_eq!(r.maintenance_dates, pair);
        assert!(r.reserved_dates.is_empty());
        assert!(r.cleaning_dates.is_empty());

        r.set_date_slot(Some(DateSlot::Reserved), pair);
        assert_eq!(r.reserved_dates, pair);
        assert!(r.maintenance_dates.is_empty());

        r.set_date_slot(None, DatePair::default());
        assert!(r.reserved_dates.is_empty());
        assert!(r.maintenance_dates.is_empty());
        assert!(r.cleaning_dates.is_empty());
    }

    #[test]
    fn test_snapshots_cover_all_rooms() {
        let store = RoomStore::new();
        store.insert(room("101")).unwrap();
        store.insert(room("102")).unwrap();
        store.insert(room("103")).unwrap();
        assert_eq!(store.snapshots().len(), 3);
        assert_eq!(store.len(), 3);
    }
}
