//! # Booking Status
//!
//! The booking lifecycle is owned by the reservation workflow (an external
//! collaborator); this module defines the status vocabulary plus the two
//! predicates the rest of the core evaluates against it:
//!
//! - **active** — the booking still holds a claim on its room
//!   (synchronizer rule 4 checks no *other* active booking before freeing
//!   a room).
//! - **excluded from posting** — the night audit never posts cancelled or
//!   no-show bookings.
//!
//! Complimentary stays are an orthogonal date-ranged attribute
//! ([`ComplimentaryPeriod`]), not a competing status value — the
//! `released` / `partial_complimentary` / `fully_complimentary` statuses
//! record the commercial outcome, the period records the dates it covers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Booking Status ─────────────────────────────────────────────────────

/// The lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, awaiting confirmation.
    Pending,
    /// Confirmed for a future or current stay.
    Confirmed,
    /// Guest is in house.
    CheckedIn,
    /// Guest has departed.
    CheckedOut,
    /// Cancelled before arrival.
    Cancelled,
    /// Guest never arrived.
    NoShow,
    /// Stay finished and fully settled.
    Completed,
    /// Released from its charges.
    Released,
    /// Part of the stay was complimentary.
    PartialComplimentary,
    /// The whole stay was complimentary.
    FullyComplimentary,
}

impl BookingStatus {
    /// All statuses as a slice.
    pub fn all() -> &'static [BookingStatus] {
        &[
            Self::Pending,
            Self::Confirmed,
            Self::CheckedIn,
            Self::CheckedOut,
            Self::Cancelled,
            Self::NoShow,
            Self::Completed,
            Self::Released,
            Self::PartialComplimentary,
            Self::FullyComplimentary,
        ]
    }

    /// The canonical string identifier for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
            Self::Completed => "completed",
            Self::Released => "released",
            Self::PartialComplimentary => "partial_complimentary",
            Self::FullyComplimentary => "fully_complimentary",
        }
    }

    /// Parse a status from its canonical string.
    pub fn parse(s: &str) -> Option<BookingStatus> {
        BookingStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
    }

    /// Whether a booking in this status still holds a claim on its room.
    ///
    /// Used by the synchronizer when deciding whether a cancellation may
    /// free the room: another booking in one of these statuses (with a
    /// check-out on or after today) keeps the room held.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::CheckedIn)
    }

    /// Whether the night audit skips bookings in this status entirely.
    pub fn excluded_from_posting(&self) -> bool {
        matches!(self, Self::Cancelled | Self::NoShow)
    }

    /// Whether a booking in this status contributes to posted revenue.
    /// Only in-house and departed stays count; held or pending ones do not.
    pub fn counts_toward_revenue(&self) -> bool {
        matches!(self, Self::CheckedIn | Self::CheckedOut)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Complimentary Period ───────────────────────────────────────────────

/// A date-ranged complimentary stretch within a stay.
///
/// Kept orthogonal to [`BookingStatus`]: a booking can be `checked_in` and
/// still have a complimentary period recorded against it. The status pair
/// `partial_complimentary` / `fully_complimentary` summarizes the
/// commercial outcome once the stay closes; this struct is the date-level
/// detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplimentaryPeriod {
    /// First complimentary night.
    pub start: NaiveDate,
    /// Last complimentary night (inclusive).
    pub end: NaiveDate,
    /// Why the nights were granted.
    pub reason: String,
}
