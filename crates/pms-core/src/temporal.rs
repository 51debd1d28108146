//! # Temporal Types — UTC Timestamps and the Injectable Clock
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to seconds
//! precision, and the [`Clock`] trait that operational code uses instead of
//! reaching for `Utc::now()` directly.
//!
//! ## Why an injectable clock
//!
//! Several lifecycle rules are date-sensitive: "check-in strictly in the
//! future", "check-out on or after today", "booking active across the audit
//! date". Any component that asked the wall clock directly would be
//! untestable at the day boundaries those rules care most about. Services
//! take an `Arc<dyn Clock>`; production wires [`SystemClock`], tests wire
//! [`FixedClock`].

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Room history rows, attempt-log rows, and audit-run rows all carry one of
/// these; uniform precision keeps ordering comparisons exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string, converting any offset
    /// to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if the string is not valid
    /// RFC 3339.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| CoreError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The calendar date (UTC) this instant falls on.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `self` is
    /// earlier).
    pub fn seconds_since(&self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).num_seconds()
    }

    /// Render as ISO 8601 with Z suffix (e.g. `2026-08-30T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" and "today" for date-sensitive lifecycle rules.
pub trait Clock: Send + Sync {
    /// The current instant, UTC, seconds precision.
    fn now(&self) -> Timestamp;

    /// The current calendar date (UTC).
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock pinned to a fixed instant. Test fixture; also useful for
/// replaying a day's events deterministically.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    /// Pin the clock to midnight UTC of the given date.
    pub fn at_midnight(date: NaiveDate) -> Self {
        let dt = date
            .and_hms_opt(0, 0, 0)
            .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
            .unwrap_or_else(Utc::now);
        Self(Timestamp::from_utc(dt))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Convenience alias for the shared clock handle services hold.
pub type SharedClock = Arc<dyn Clock>;
