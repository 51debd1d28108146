//! # Room Status Audit Trail
//!
//! Two append-only logs back every status movement:
//!
//! * **Attempt log** ([`StatusChangeRecord`]) — one row per *requested*
//!   transition, whether it landed or was blocked or whether it was a
//!   same-status no-op. This is the operational record the recent-changes
//!   feed reads.
//! * **History log** ([`RoomHistoryRecord`]) — one row per transition that
//!   actually changed the room, with the occupancy window it covers. A
//!   no-op or blocked attempt never writes here.

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use pms_core::{RoomId, StaffId, Timestamp};
use pms_state::{RoomStatus, TransitionSource};

// ── Records ────────────────────────────────────────────────────────────

/// One row in the history log: a transition that changed the room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomHistoryRecord {
    /// Room the transition applied to.
    pub room_id: RoomId,
    /// Room number at the time of the transition.
    pub room_number: String,
    /// Status before.
    pub from: RoomStatus,
    /// Status after.
    pub to: RoomStatus,
    /// Start of the window the outgoing status held, when known.
    pub start_date: Option<NaiveDate>,
    /// End of that window.
    pub end_date: Option<NaiveDate>,
    /// Staff member who drove the change; `None` for automatic changes.
    pub actor: Option<StaffId>,
    /// Free-text note attached to the change.
    pub note: Option<String>,
    /// When the row was written.
    pub recorded_at: Timestamp,
}

impl RoomHistoryRecord {
    /// Whether the system, not a person, drove the change.
    pub fn is_auto_generated(&self) -> bool {
        self.actor.is_none()
    }
}

/// One row in the attempt log: a requested transition and its fate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRecord {
    /// Room the request targeted.
    pub room_id: RoomId,
    /// Room number at the time of the request.
    pub room_number: String,
    /// Status the room held when the request arrived.
    pub from: RoomStatus,
    /// Status the request asked for.
    pub to: RoomStatus,
    /// Who asked.
    pub source: TransitionSource,
    /// Whether the guard refused to apply the change.
    pub blocked: bool,
    /// Why it was blocked, when it was.
    pub reason: Option<String>,
    /// When the row was written.
    pub recorded_at: Timestamp,
}

/// An entry in the recent-changes feed for a room.
#[derive(Debug, Clone, Serialize)]
pub struct RecentChange {
    /// Status before.
    pub from: RoomStatus,
    /// Status after (requested; equals the landed status unless blocked).
    pub to: RoomStatus,
    /// Who asked.
    pub source: TransitionSource,
    /// Whether the guard refused the change.
    pub blocked: bool,
    /// Why it was refused, when it was.
    pub reason: Option<String>,
    /// When it happened.
    pub recorded_at: Timestamp,
}

// ── Audit Trail ────────────────────────────────────────────────────────

/// Append-only store for both logs.
#[derive(Debug, Default)]
pub struct AuditTrail {
    history: Mutex<Vec<RoomHistoryRecord>>,
    attempts: Mutex<Vec<StatusChangeRecord>>,
}

impl AuditTrail {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a history row.
    pub fn record_history(&self, record: RoomHistoryRecord) {
        self.history.lock().push(record);
    }

    /// Append an attempt row.
    pub fn record_attempt(&self, record: StatusChangeRecord) {
        self.attempts.lock().push(record);
    }

    /// History rows for a room, oldest first.
    pub fn history_for(&self, room_id: RoomId) -> Vec<RoomHistoryRecord> {
        self.history
            .lock()
            .iter()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect()
    }

    /// Attempt rows for a room, oldest first.
    pub fn attempts_for(&self, room_id: RoomId) -> Vec<StatusChangeRecord> {
        self.attempts
            .lock()
            .iter()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect()
    }

    /// Attempts against the room number within the lookback window,
    /// most recent first.
    pub fn recent_history(
        &self,
        room_number: &str,
        lookback_minutes: i64,
        now: Timestamp,
    ) -> Vec<RecentChange> {
        let cutoff = lookback_minutes * 60;
        // Walk the log newest-first so rows sharing a timestamp come out
        // in reverse append order.
        let mut changes: Vec<RecentChange> = self
            .attempts
            .lock()
            .iter()
            .rev()
            .filter(|r| r.room_number == room_number)
            .filter(|r| {
                let age = now.seconds_since(r.recorded_at);
                age >= 0 && age <= cutoff
            })
            .map(|r| RecentChange {
                from: r.from,
                to: r.to,
                source: r.source.clone(),
                blocked: r.blocked,
                reason: r.reason.clone(),
                recorded_at: r.recorded_at,
            })
            .collect();
        changes.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        changes
    }

    /// Total rows across both logs.
    pub fn len(&self) -> usize {
        self.history.lock().len() + self.attempts.lock().len()
    }

    /// Whether both logs are empty.
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty() && self.attempts.lock().is_empty()
    }
}
