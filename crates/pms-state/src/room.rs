//! # Room Status and the Transition Rule Table
//!
//! A room has exactly one operational status at any instant. Which statuses
//! can follow which is reference data, not code paths scattered through
//! handlers: the [`TransitionRuleSet`] is a single static table the state
//! machine consults for every non-same-status request.
//!
//! ## Status Graph (default rule table)
//!
//! ```text
//! available ──▶ reserved ──▶ occupied ──▶ dirty ──▶ cleaning ──▶ available
//!     │             │            │                      │
//!     │             └──▶ available (cancel)             └──▶ dirty (failed inspection)
//!     │
//!     ├──▶ maintenance ◀──▶ out_of_order
//!     └──▶ dirty / cleaning (scheduled housekeeping)
//! ```
//!
//! Pairs *absent* from the table are undefined; pairs *present but
//! disallowed* (e.g. `occupied → maintenance` while a guest is in house)
//! are forbidden. The distinction matters operationally: undefined pairs
//! are usually caller bugs, forbidden pairs are policy.
//!
//! ## Permission Tags
//!
//! `requires_permission` is advisory metadata this core stores but does not
//! enforce — the caller checks it against the identity service before
//! invoking a manual transition.

use std::collections::HashMap;

use pms_core::StaffId;
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

// ── Room Status ────────────────────────────────────────────────────────

/// The operational status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Clean and ready to sell.
    Available,
    /// A guest is in house.
    Occupied,
    /// Held for a future arrival.
    Reserved,
    /// Housekeeping is actively working the room.
    Cleaning,
    /// Needs housekeeping before it can be sold again.
    Dirty,
    /// Under scheduled maintenance.
    Maintenance,
    /// Unsellable until engineering clears it.
    OutOfOrder,
}

impl RoomStatus {
    /// All statuses as a slice.
    pub fn all() -> &'static [RoomStatus] {
        &[
            Self::Available,
            Self::Occupied,
            Self::Reserved,
            Self::Cleaning,
            Self::Dirty,
            Self::Maintenance,
            Self::OutOfOrder,
        ]
    }

    /// The canonical string identifier for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
            Self::Cleaning => "cleaning",
            Self::Dirty => "dirty",
            Self::Maintenance => "maintenance",
            Self::OutOfOrder => "out_of_order",
        }
    }

    /// Parse a status from its canonical string.
    ///
    /// Accepts `"clean"` as an alias for `available` — front-desk tooling
    /// has historically sent both.
    pub fn parse(s: &str) -> Option<RoomStatus> {
        match s {
            "available" | "clean" => Some(Self::Available),
            "occupied" => Some(Self::Occupied),
            "reserved" => Some(Self::Reserved),
            "cleaning" => Some(Self::Cleaning),
            "dirty" => Some(Self::Dirty),
            "maintenance" => Some(Self::Maintenance),
            "out_of_order" => Some(Self::OutOfOrder),
            _ => None,
        }
    }

    /// Statuses owned by housekeeping/engineering. Automatic booking-driven
    /// logic must never pull a room out of these; only a staff member may.
    pub fn is_manually_owned(&self) -> bool {
        matches!(
            self,
            Self::Dirty | Self::Cleaning | Self::Maintenance | Self::OutOfOrder
        )
    }

    /// The date-pair slot a room in this status keeps populated, if any.
    /// Entering a status sets its slot and clears the other two; `available`
    /// clears all three.
    pub fn date_slot(&self) -> Option<DateSlot> {
        match self {
            Self::Reserved | Self::Occupied => Some(DateSlot::Reserved),
            Self::Maintenance | Self::OutOfOrder => Some(DateSlot::Maintenance),
            Self::Cleaning | Self::Dirty => Some(DateSlot::Cleaning),
            Self::Available => None,
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Transition Source ──────────────────────────────────────────────────

/// Who is asking for a transition: the booking synchronizer (automatic)
/// or a staff member (manual).
///
/// This is a structured capability tag carried on every transition
/// request. It is deliberately *not* inferred from markers inside the
/// free-text note — an earlier generation of this system did exactly that
/// and automatic logic ended up silently reverting manually-set `dirty`
/// rooms when the marker drifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionSource {
    /// System-triggered, no human actor.
    Auto,
    /// Staff-initiated by the given actor.
    Manual(StaffId),
}

impl TransitionSource {
    /// The acting staff member, if any.
    pub fn actor(&self) -> Option<StaffId> {
        match self {
            Self::Auto => None,
            Self::Manual(actor) => Some(*actor),
        }
    }

    /// Whether this is an automatic (system-triggered) request.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl std::fmt::Display for TransitionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Manual(_) => f.write_str("manual"),
        }
    }
}

// ── Date Slots ─────────────────────────────────────────────────────────

/// The three mutually exclusive date-pair slots on a room record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSlot {
    /// Stay dates while reserved or occupied.
    Reserved,
    /// Scheduled maintenance window.
    Maintenance,
    /// Scheduled cleaning window.
    Cleaning,
}

// ── Transition Rules ───────────────────────────────────────────────────

/// A single entry in the rule table: whether the pair is allowed and which
/// permission (if any) a manual caller should hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    /// Whether the transition may execute.
    pub allowed: bool,
    /// Advisory permission tag for manual callers. Stored, surfaced,
    /// never enforced here.
    pub requires_permission: Option<&'static str>,
}

/// Static table of (from, to) room-status pairs.
///
/// Same-status pairs are implicitly always valid and never appear in the
/// table. Everything else is explicit: absent means undefined, present
/// with `allowed: false` means forbidden.
#[derive(Debug, Clone)]
pub struct TransitionRuleSet {
    rules: HashMap<(RoomStatus, RoomStatus), TransitionRule>,
}

impl TransitionRuleSet {
    /// Build an empty rule set (every non-same-status pair undefined).
    pub fn empty() -> Self {
        Self { rules: HashMap::new() }
    }

    /// Insert or replace a rule.
    pub fn insert(
        &mut self,
        from: RoomStatus,
        to: RoomStatus,
        allowed: bool,
        requires_permission: Option<&'static str>,
    ) {
        self.rules.insert(
            (from, to),
            TransitionRule { allowed, requires_permission },
        );
    }

    /// Look up the rule for a pair, if one is defined.
    pub fn lookup(&self, from: RoomStatus, to: RoomStatus) -> Option<&TransitionRule> {
        self.rules.get(&(from, to))
    }

    /// Validate a (from, to) pair against the table.
    ///
    /// Same-status is always valid. Otherwise the pair must be present and
    /// allowed.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Undefined`] when the pair is absent,
    /// [`TransitionError::Forbidden`] when present but disallowed.
    pub fn validate(&self, from: RoomStatus, to: RoomStatus) -> Result<(), TransitionError> {
        if from == to {
            return Ok(());
        }
        match self.lookup(from, to) {
            None => Err(TransitionError::Undefined { from, to }),
            Some(rule) if !rule.allowed => Err(TransitionError::Forbidden { from, to }),
            Some(_) => Ok(()),
        }
    }

    /// The standard hotel rule table.
    pub fn standard() -> Self {
        use RoomStatus::*;

        const MAINT: Option<&str> = Some("rooms:maintenance");
        const HK_CLEAR: Option<&str> = Some("housekeeping:clear");
        const HK_SCHEDULE: Option<&str> = Some("housekeeping:schedule");

        let mut set = Self::empty();

        // Selling flow.
        set.insert(Available, Reserved, true, None);
        set.insert(Available, Occupied, true, None);
        set.insert(Reserved, Occupied, true, None);
        set.insert(Reserved, Available, true, None);
        set.insert(Occupied, Dirty, true, None);
        set.insert(Occupied, Available, true, None);

        // Housekeeping flow.
        set.insert(Available, Dirty, true, HK_SCHEDULE);
        set.insert(Available, Cleaning, true, HK_SCHEDULE);
        set.insert(Occupied, Cleaning, true, HK_SCHEDULE);
        set.insert(Dirty, Cleaning, true, None);
        set.insert(Dirty, Available, true, HK_CLEAR);
        set.insert(Cleaning, Available, true, HK_CLEAR);
        set.insert(Cleaning, Dirty, true, None);

        // Engineering flow.
        set.insert(Available, Maintenance, true, MAINT);
        set.insert(Available, OutOfOrder, true, MAINT);
        set.insert(Reserved, Maintenance, true, MAINT);
        set.insert(Dirty, Maintenance, true, MAINT);
        set.insert(Dirty, OutOfOrder, true, MAINT);
        set.insert(Cleaning, Maintenance, true, MAINT);
        set.insert(Cleaning, OutOfOrder, true, MAINT);
        set.insert(Maintenance, Available, true, MAINT);
        set.insert(Maintenance, Dirty, true, MAINT);
        set.insert(Maintenance, OutOfOrder, true, MAINT);
        set.insert(OutOfOrder, Maintenance, true, MAINT);
        set.insert(OutOfOrder, Available, true, MAINT);

        // Defined but forbidden: policy, not omission. A room with a guest
        // in house cannot be pulled for works, and a held room cannot be
        // marked soiled without passing through a stay.
        set.insert(Occupied, Reserved, false, None);
        set.insert(Occupied, Maintenance, false, MAINT);
        set.insert(Occupied, OutOfOrder, false, MAINT);
        set.insert(Reserved, Dirty, false, None);
        set.insert(Reserved, Cleaning, false, None);

        set
    }

    /// Number of defined pairs.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for TransitionRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RoomStatus::*;

    #[test]
    fn test_as_str_parse_roundtrip() {
        for status in RoomStatus::all() {
            assert_eq!(RoomStatus::parse(status.as_str()), Some(*status));
        }
    }

    #[test]
    fn test_clean_alias_maps_to_available() {
        assert_eq!(RoomStatus::parse("clean"), Some(Available));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OutOfOrder).unwrap();
        assert_eq!(json, "\"out_of_order\"");
        let back: RoomStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OutOfOrder);
    }

    #[test]
    fn test_manually_owned_set() {
        assert!(Dirty.is_manually_owned());
        assert!(Cleaning.is_manually_owned());
        assert!(Maintenance.is_manually_owned());
        assert!(OutOfOrder.is_manually_owned());
        assert!(!Available.is_manually_owned());
        assert!(!Occupied.is_manually_owned());
        assert!(!Reserved.is_manually_owned());
    }

    #[test]
    fn test_date_slots() {
        assert_eq!(Reserved.date_slot(), Some(DateSlot::Reserved));
        assert_eq!(Occupied.date_slot(), Some(DateSlot::Reserved));
        assert_eq!(Maintenance.date_slot(), Some(DateSlot::Maintenance));
        assert_eq!(OutOfOrder.date_slot(), Some(DateSlot::Maintenance));
        assert_eq!(Cleaning.date_slot(), Some(DateSlot::Cleaning));
        assert_eq!(Dirty.date_slot(), Some(DateSlot::Cleaning));
        assert_eq!(Available.date_slot(), None);
    }

    #[test]
    fn test_same_status_always_valid() {
        // Even against an empty table.
        let empty = TransitionRuleSet::empty();
        for status in RoomStatus::all() {
            assert!(empty.validate(*status, *status).is_ok());
        }
    }

    #[test]
    fn test_absent_pair_is_undefined() {
        let rules = TransitionRuleSet::standard();
        assert_eq!(
            rules.validate(Dirty, Reserved),
            Err(TransitionError::Undefined { from: Dirty, to: Reserved })
        );
        assert_eq!(
            rules.validate(OutOfOrder, Occupied),
            Err(TransitionError::Undefined { from: OutOfOrder, to: Occupied })
        );
    }

    #[test]
    fn test_present_disallowed_pair_is_forbidden() {
        let rules = TransitionRuleSet::standard();
        assert_eq!(
            rules.validate(Occupied, Maintenance),
            Err(TransitionError::Forbidden { from: Occupied, to: Maintenance })
        );
        assert_eq!(
            rules.validate(Occupied, Reserved),
            Err(TransitionError::Forbidden { from: Occupied, to: Reserved })
        );
    }

    #[test]
    fn test_every_absent_pair_is_undefined() {
        // For all pairs absent from the table,
        // validation yields Undefined (never Forbidden, never Ok).
        let rules = TransitionRuleSet::standard();
        for from in RoomStatus::all() {
            for to in RoomStatus::all() {
                if from == to || rules.lookup(*from, *to).is_some() {
                    continue;
                }
                assert_eq!(
                    rules.validate(*from, *to),
                    Err(TransitionError::Undefined { from: *from, to: *to }),
                );
            }
        }
    }

    #[test]
    fn test_standard_selling_flow_allowed() {
        let rules = TransitionRuleSet::standard();
        assert!(rules.validate(Available, Reserved).is_ok());
        assert!(rules.validate(Reserved, Occupied).is_ok());
        assert!(rules.validate(Occupied, Dirty).is_ok());
        assert!(rules.validate(Dirty, Cleaning).is_ok());
        assert!(rules.validate(Cleaning, Available).is_ok());
    }

    #[test]
    fn test_permission_tags_surface_through_lookup() {
        let rules = TransitionRuleSet::standard();
        let rule = rules.lookup(Cleaning, Available).unwrap();
        assert_eq!(rule.requires_permission, Some("housekeeping:clear"));
        let rule = rules.lookup(Available, Reserved).unwrap();
        assert_eq!(rule.requires_permission, None);
    }
}
