//! # Room State Machine
//!
//! The only write path for a room's status. Every request runs the same
//! sequence under the room's own mutex:
//!
//! ```text
//! attempt row → rule validation → guard review → mutate room
//!             → history row → housekeeping enqueue (dirty/cleaning)
//! ```
//!
//! Validation failures abort before any mutation; the attempt row still
//! records the (from, to) pair that was asked for. A guard block is not an
//! error: the room is left untouched, the attempt row carries the blocked
//! flag and reason, and the caller gets [`ApplyOutcome::Blocked`].

use std::sync::Arc;

use tracing::{info, warn};

use pms_core::{RoomId, SharedClock};
use pms_registry::{
    AuditTrail, DatePair, HousekeepingQueue, RoomHistoryRecord, RoomStore, StatusChangeRecord,
};
use pms_state::{RoomStatus, TransitionRuleSet, TransitionSource};

use crate::error::OpsError;
use crate::guard::{GuardDecision, ManualStatusGuard};

// ── Requests and Outcomes ──────────────────────────────────────────────

/// One room-status transition request.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    /// The room to transition.
    pub room_id: RoomId,
    /// Requested target status.
    pub to: RoomStatus,
    /// Capability tag: who is asking.
    pub source: TransitionSource,
    /// Free-text note to store on the room.
    pub note: Option<String>,
    /// Date pair for the target status's slot (stay dates for
    /// reserved/occupied, work window for the rest).
    pub dates: DatePair,
}

impl TransitionRequest {
    /// Build a request with no note and no dates.
    pub fn new(room_id: RoomId, to: RoomStatus, source: TransitionSource) -> Self {
        Self {
            room_id,
            to,
            source,
            note: None,
            dates: DatePair::default(),
        }
    }

    /// Attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attach the date pair.
    pub fn with_dates(mut self, dates: DatePair) -> Self {
        self.dates = dates;
        self
    }
}

/// What happened to a request that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The room moved.
    Applied {
        /// Status before.
        from: RoomStatus,
        /// Status after.
        to: RoomStatus,
    },
    /// The room already held the requested status. Valid, attempt logged,
    /// nothing mutated, no history row.
    NoOp {
        /// The status the room holds.
        status: RoomStatus,
    },
    /// The guard dropped an automatic request. Logged, swallowed.
    Blocked {
        /// The reason recorded on the attempt row.
        reason: String,
    },
}

impl ApplyOutcome {
    /// Whether the room actually moved.
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

// ── State Machine ──────────────────────────────────────────────────────

/// Validates and executes room status transitions.
pub struct RoomStateMachine {
    rooms: Arc<RoomStore>,
    rules: TransitionRuleSet,
    guard: ManualStatusGuard,
    trail: Arc<AuditTrail>,
    housekeeping: Arc<dyn HousekeepingQueue>,
    clock: SharedClock,
}

impl RoomStateMachine {
    /// Build a machine over the standard rule table.
    pub fn new(
        rooms: Arc<RoomStore>,
        trail: Arc<AuditTrail>,
        housekeeping: Arc<dyn HousekeepingQueue>,
        clock: SharedClock,
    ) -> Self {
        Self::with_rules(TransitionRuleSet::standard(), rooms, trail, housekeeping, clock)
    }

    /// Build a machine over a custom rule table.
    pub fn with_rules(
        rules: TransitionRuleSet,
        rooms: Arc<RoomStore>,
        trail: Arc<AuditTrail>,
        housekeeping: Arc<dyn HousekeepingQueue>,
        clock: SharedClock,
    ) -> Self {
        Self {
            rooms,
            rules,
            guard: ManualStatusGuard,
            trail,
            housekeeping,
            clock,
        }
    }

    /// The rule table in force.
    pub fn rules(&self) -> &TransitionRuleSet {
        &self.rules
    }

    /// Check whether the room could move to `to`, without moving it.
    ///
    /// # Errors
    ///
    /// [`OpsError::RoomNotFound`] for an unknown room,
    /// [`OpsError::InvalidTransition`] for an undefined pair,
    /// [`OpsError::TransitionForbidden`] for a defined, disallowed pair.
    pub fn validate_transition(&self, room_id: RoomId, to: RoomStatus) -> Result<(), OpsError> {
        let from = self.rooms.status(room_id)?;
        self.rules.validate(from, to)?;
        Ok(())
    }

    /// Execute one transition request as an atomic unit on the room.
    ///
    /// # Errors
    ///
    /// [`OpsError::RoomNotFound`] for an unknown room, plus the validation
    /// errors of [`Self::validate_transition`]. A guard block is *not* an
    /// error; it comes back as [`ApplyOutcome::Blocked`].
    pub fn apply(&self, req: TransitionRequest) -> Result<ApplyOutcome, OpsError> {
        let now = self.clock.now();
        self.rooms.with_room(req.room_id, |room| {
            let from = room.status;
            let number = room.number.as_str().to_string();
            let attempt = |blocked: bool, reason: Option<String>| StatusChangeRecord {
                room_id: req.room_id,
                room_number: number.clone(),
                from,
                to: req.to,
                source: req.source,
                blocked,
                reason,
                recorded_at: now,
            };

            if from == req.to {
                self.trail.record_attempt(attempt(false, None));
                return Ok(ApplyOutcome::NoOp { status: from });
            }

            if let Err(err) = self.rules.validate(from, req.to) {
                self.trail.record_attempt(attempt(false, None));
                return Err(OpsError::from(err));
            }

            if let GuardDecision::Block { reason } = self.guard.review(from, req.to, &req.source) {
                self.trail.record_attempt(attempt(true, Some(reason.clone())));
                warn!(
                    room = %number,
                    %from,
                    to = %req.to,
                    %reason,
                    "blocked automatic status change"
                );
                return Ok(ApplyOutcome::Blocked { reason });
            }

            self.trail.record_attempt(attempt(false, None));

            room.status = req.to;
            room.status_note = req.note.clone();
            room.set_date_slot(req.to.date_slot(), req.dates);
            room.touch(now);

            self.trail.record_history(RoomHistoryRecord {
                room_id: req.room_id,
                room_number: number.clone(),
                from,
                to: req.to,
                start_date: req.dates.start,
                end_date: req.dates.end,
                actor: req.source.actor(),
                note: req.note.clone(),
                recorded_at: now,
            });

            if matches!(req.to, RoomStatus::Dirty | RoomStatus::Cleaning) {
                let due = req.dates.start.unwrap_or_else(|| now.date());
                self.housekeeping
                    .enqueue_cleaning(req.room_id, &number, due, now);
            }

            info!(room = %number, %from, to = %req.to, source = %req.source, "room status changed");
            Ok(ApplyOutcome::Applied { from, to: req.to })
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pms_core::{FixedClock, Money, RoomNumber, StaffId};
    use pms_registry::{EnqueueOutcome, InMemoryHousekeepingQueue, Room};

    struct Harness {
        rooms: Arc<RoomStore>,
        trail: Arc<AuditTrail>,
        housekeeping: Arc<InMemoryHousekeepingQueue>,
        machine: RoomStateMachine,
    }

    fn harness() -> Harness {
        let rooms = Arc::new(RoomStore::new());
        let trail = Arc::new(AuditTrail::new());
        let housekeeping = Arc::new(InMemoryHousekeepingQueue::new());
        let clock = Arc::new(FixedClock::at_midnight(
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        ));
        let machine = RoomStateMachine::new(
            Arc::clone(&rooms),
            Arc::clone(&trail),
            Arc::clone(&housekeeping) as Arc<dyn HousekeepingQueue>,
            clock,
        );
        Harness {
            rooms,
            trail,
            housekeeping,
            machine,
        }
    }

    fn add_room(h: &Harness, number: &str, status: RoomStatus) -> RoomId {
        let mut room = Room::new(
            RoomNumber::new(number).unwrap(),
            "standard",
            2,
            Money::parse("120.00").unwrap(),
        );
        room.status = status;
        h.rooms.insert(room).unwrap()
    }

    #[test]
    fn test_applied_transition_writes_one_history_and_one_attempt() {
        let h = harness();
        let staff = StaffId::new();
        let room = add_room(&h, "101", RoomStatus::Available);

        let outcome = h
            .machine
            .apply(
                TransitionRequest::new(
                    room,
                    RoomStatus::Occupied,
                    TransitionSource::Manual(staff),
                )
                .with_note("walk-in"),
            )
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                from: RoomStatus::Available,
                to: RoomStatus::Occupied
            }
        );

        let history = h.trail.history_for(room);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from, RoomStatus::Available);
        assert_eq!(history[0].to, RoomStatus::Occupied);
        assert_eq!(history[0].actor, Some(staff));
        assert!(!history[0].is_auto_generated());

        let attempts = h.trail.attempts_for(room);
        assert_eq!(attempts.len(), 1);
        assert!(!attempts[0].blocked);

        assert_eq!(h.rooms.status(room), Ok(RoomStatus::Occupied));
    }

    #[test]
    fn test_same_status_is_a_logged_noop() {
        let h = harness();
        let room = add_room(&h, "101", RoomStatus::Dirty);
        let before = h.rooms.snapshot(room).unwrap().updated_at;

        let outcome = h
            .machine
            .apply(TransitionRequest::new(
                room,
                RoomStatus::Dirty,
                TransitionSource::Auto,
            ))
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::NoOp {
                status: RoomStatus::Dirty
            }
        );

        assert!(h.trail.history_for(room).is_empty());
        assert_eq!(h.trail.attempts_for(room).len(), 1);
        assert_eq!(h.rooms.snapshot(room).unwrap().updated_at, before);
        // No cleaning task either: nothing moved.
        assert!(h.housekeeping.is_empty());
    }

    #[test]
    fn test_undefined_pair_fails_after_logging_the_attempt() {
        let h = harness();
        let room = add_room(&h, "101", RoomStatus::OutOfOrder);

        let err = h
            .machine
            .apply(TransitionRequest::new(
                room,
                RoomStatus::Occupied,
                TransitionSource::Manual(StaffId::new()),
            ))
            .unwrap_err();
        assert_eq!(
            err,
            OpsError::InvalidTransition {
                from: RoomStatus::OutOfOrder,
                to: RoomStatus::Occupied
            }
        );

        assert!(h.trail.history_for(room).is_empty());
        assert_eq!(h.trail.attempts_for(room).len(), 1);
        assert_eq!(h.rooms.status(room), Ok(RoomStatus::OutOfOrder));
    }

    #[test]
    fn test_forbidden_pair() {
        let h = harness();
        let room = add_room(&h, "101", RoomStatus::Occupied);
        let err = h
            .machine
            .validate_transition(room, RoomStatus::Maintenance)
            .unwrap_err();
        assert_eq!(
            err,
            OpsError::TransitionForbidden {
                from: RoomStatus::Occupied,
                to: RoomStatus::Maintenance
            }
        );
    }

    #[test]
    fn test_guard_block_is_swallowed_and_logged() {
        let h = harness();
        let room = add_room(&h, "101", RoomStatus::Maintenance);

        let outcome = h
            .machine
            .apply(TransitionRequest::new(
                room,
                RoomStatus::Available,
                TransitionSource::Auto,
            ))
            .unwrap();
        assert!(matches!(outcome, ApplyOutcome::Blocked { .. }));

        assert_eq!(h.rooms.status(room), Ok(RoomStatus::Maintenance));
        assert!(h.trail.history_for(room).is_empty());
        let attempts = h.trail.attempts_for(room);
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].blocked);
        assert!(attempts[0].reason.is_some());
    }

    #[test]
    fn test_dirty_transition_enqueues_cleaning_once() {
        let h = harness();
        let room = add_room(&h, "101", RoomStatus::Occupied);

        h.machine
            .apply(TransitionRequest::new(
                room,
                RoomStatus::Dirty,
                TransitionSource::Auto,
            ))
            .unwrap();
        assert_eq!(h.housekeeping.len(), 1);

        // Re-queueing for the same room and date stays idempotent.
        let due = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(matches!(
            h.housekeeping
                .enqueue_cleaning(room, "101", due, pms_core::Timestamp::now()),
            EnqueueOutcome::AlreadyQueued(_)
        ));
    }

    #[test]
    fn test_date_slot_set_and_cleared() {
        let h = harness();
        let staff = StaffId::new();
        let room = add_room(&h, "101", RoomStatus::Available);
        let dates = DatePair::new(
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        );

        h.machine
            .apply(
                TransitionRequest::new(room, RoomStatus::Reserved, TransitionSource::Manual(staff))
                    .with_dates(dates),
            )
            .unwrap();
        let snap = h.rooms.snapshot(room).unwrap();
        assert_eq!(snap.reserved_dates, dates);

        h.machine
            .apply(TransitionRequest::new(
                room,
                RoomStatus::Available,
                TransitionSource::Manual(staff),
            ))
            .unwrap();
        let snap = h.rooms.snapshot(room).unwrap();
        assert!(snap.reserved_dates.is_empty());
    }
}
