//! # Manual Status Guard
//!
//! Two writers compete for a room's status: staff (front desk,
//! housekeeping, engineering) and the booking synchronizer. The guard
//! arbitrates in the synchronizer's path — an automatic request must never
//! silently revert a status a person set. The capability tag
//! ([`TransitionSource`]) carried on every request makes this a
//! set-membership check rather than anything inferred from note text.
//!
//! Rules for `Auto` requests:
//!
//! * the current status must not be manually owned (`dirty`, `cleaning`,
//!   `maintenance`, `out_of_order`) — only staff clear those;
//! * the target must be in the selling set (`available`, `reserved`,
//!   `occupied`), with a single carve-out for the checkout flow:
//!   `occupied → dirty` is the machine raising housekeeping work, not the
//!   machine overriding it.
//!
//! `Manual` requests always pass; the rule table is their only arbiter.

use pms_state::{RoomStatus, TransitionSource};

/// The guard's verdict on one transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The request may proceed to the rule table.
    Permit,
    /// The request must be dropped: logged as blocked, never applied,
    /// never surfaced as an error to the triggering workflow.
    Block {
        /// Human-readable reason recorded on the attempt row.
        reason: String,
    },
}

impl GuardDecision {
    /// Whether the verdict is a block.
    pub fn is_block(&self) -> bool {
        matches!(self, GuardDecision::Block { .. })
    }
}

/// Arbiter between automatic and staff-driven status writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualStatusGuard;

impl ManualStatusGuard {
    /// Statuses an automatic request may target (besides the checkout
    /// carve-out).
    const AUTO_TARGETS: [RoomStatus; 3] = [
        RoomStatus::Available,
        RoomStatus::Reserved,
        RoomStatus::Occupied,
    ];

    /// Judge one request. Same-status requests are not routed here; the
    /// machine short-circuits them as no-ops first.
    pub fn review(
        &self,
        current: RoomStatus,
        target: RoomStatus,
        source: &TransitionSource,
    ) -> GuardDecision {
        if !source.is_auto() {
            return GuardDecision::Permit;
        }
        if current.is_manually_owned() {
            return GuardDecision::Block {
                reason: format!(
                    "room is {current}; automatic changes may not clear a staff-owned status"
                ),
            };
        }
        let checkout_flow = current == RoomStatus::Occupied && target == RoomStatus::Dirty;
        if !checkout_flow && !Self::AUTO_TARGETS.contains(&target) {
            return GuardDecision::Block {
                reason: format!("{target} may only be set by staff"),
            };
        }
        GuardDecision::Permit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pms_core::StaffId;

    #[test]
    fn test_manual_always_permitted() {
        let guard = ManualStatusGuard;
        let staff = TransitionSource::Manual(StaffId::new());
        for &from in RoomStatus::all() {
            for &to in RoomStatus::all() {
                assert_eq!(guard.review(from, to, &staff), GuardDecision::Permit);
            }
        }
    }

    #[test]
    fn test_auto_blocked_out_of_staff_owned_status() {
        let guard = ManualStatusGuard;
        for from in [
            RoomStatus::Dirty,
            RoomStatus::Cleaning,
            RoomStatus::Maintenance,
            RoomStatus::OutOfOrder,
        ] {
            let decision = guard.review(from, RoomStatus::Available, &TransitionSource::Auto);
            assert!(decision.is_block(), "{from} should block auto clearance");
        }
    }

    #[test]
    fn test_auto_selling_moves_permitted() {
        let guard = ManualStatusGuard;
        for (from, to) in [
            (RoomStatus::Available, RoomStatus::Reserved),
            (RoomStatus::Reserved, RoomStatus::Occupied),
            (RoomStatus::Reserved, RoomStatus::Available),
            (RoomStatus::Occupied, RoomStatus::Available),
            (RoomStatus::Occupied, RoomStatus::Dirty),
        ] {
            assert_eq!(
                guard.review(from, to, &TransitionSource::Auto),
                GuardDecision::Permit,
                "{from} -> {to} should pass"
            );
        }
    }

    #[test]
    fn test_auto_may_not_set_staff_owned_targets() {
        let guard = ManualStatusGuard;
        for to in [
            RoomStatus::Cleaning,
            RoomStatus::Maintenance,
            RoomStatus::OutOfOrder,
        ] {
            let decision = guard.review(RoomStatus::Available, to, &TransitionSource::Auto);
            assert!(decision.is_block(), "auto -> {to} should block");
        }
        // Dirty is staff-owned too, except as the checkout side effect.
        assert!(guard
            .review(RoomStatus::Available, RoomStatus::Dirty, &TransitionSource::Auto)
            .is_block());
    }
}
