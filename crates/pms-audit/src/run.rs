//! # Audit Runs, Statistics, and the Run Registry
//!
//! A [`NightAuditRun`] is created `in_progress` when a date is reserved and
//! finalized exactly once, as `completed` with its statistics or as
//! `failed` with a reason. The [`RunRegistry`] holds every run and owns the
//! at-most-one-per-date invariant: reservation is a single check-and-insert
//! under one lock, so two schedulers racing on the same date cannot both
//! win.

use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pms_core::{AuditRunId, Money, StaffId, Timestamp};

use crate::error::AuditError;

// ── Runs ───────────────────────────────────────────────────────────────

/// Where a run sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The date is reserved and posting is underway.
    InProgress,
    /// Finalized with statistics. Terminal; the date can never be run again.
    Completed,
    /// Aborted mid-run. Terminal for this run; the date may be retried.
    Failed,
}

/// Per-status room counts at audit time.
///
/// `occupied` is derived from checked-in bookings spanning the audit date;
/// the remaining counts come from the cached room statuses. The two sources
/// can transiently disagree, so the columns need not sum to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCensus {
    /// Rooms with a checked-in booking spanning the audit date.
    pub occupied: u32,
    /// Rooms cached as `available`.
    pub available: u32,
    /// Rooms cached as `reserved`.
    pub reserved: u32,
    /// Rooms cached as `dirty`.
    pub dirty: u32,
    /// Rooms cached as `cleaning`.
    pub cleaning: u32,
    /// Rooms cached as `maintenance`.
    pub maintenance: u32,
    /// Rooms cached as `out_of_order`.
    pub out_of_order: u32,
    /// All rooms on the books.
    pub total: u32,
}

impl RoomCensus {
    /// Occupied over total, as a percentage rounded to one decimal place.
    pub fn occupancy_rate(&self) -> Decimal {
        if self.total == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.occupied) * Decimal::from(100) / Decimal::from(self.total)).round_dp(1)
    }
}

/// The aggregated statistics block a completed run carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStatistics {
    /// Bookings posted by this run.
    pub bookings_posted: u32,
    /// Posted bookings in `checked_in`.
    pub check_ins: u32,
    /// Posted bookings in `checked_out`.
    pub check_outs: u32,
    /// Sum of `total_amount` over posted bookings in
    /// `checked_in`/`checked_out`.
    pub revenue: Money,
    /// Room counts at audit time.
    pub census: RoomCensus,
    /// `census.occupancy_rate()`, frozen at finalization.
    pub occupancy_rate: Decimal,
}

/// One night-audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightAuditRun {
    /// Unique run identifier.
    pub id: AuditRunId,
    /// The calendar date this run closes.
    pub audit_date: NaiveDate,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Staff member who started the run; `None` for the scheduler.
    pub actor: Option<StaffId>,
    /// Statistics, present once completed.
    pub statistics: Option<AuditStatistics>,
    /// Why the run failed, when it did.
    pub failure_reason: Option<String>,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the run finalized, either way.
    pub finished_at: Option<Timestamp>,
}

/// What a detail row snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailRecordType {
    /// A posted booking.
    Booking,
    /// A room's posted-status snapshot.
    Room,
}

/// One immutable detail row: the posted entity as it looked at posting
/// time. Corrections are new rows, never edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightAuditDetail {
    /// The run that wrote this row.
    pub run_id: AuditRunId,
    /// What kind of entity was snapshotted.
    pub record_type: DetailRecordType,
    /// Display reference of that entity (`booking:<uuid>` / `room:<uuid>`).
    pub reference: String,
    /// What the run did (`"posted"`, `"status_snapshot"`).
    pub action: String,
    /// The entity at that instant.
    pub snapshot: serde_json::Value,
    /// When the row was written.
    pub recorded_at: Timestamp,
}

// ── Run Registry ───────────────────────────────────────────────────────

/// Holds every run and enforces the once-per-date invariant.
#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<AuditRunId, NightAuditRun>>,
}

impl RunRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically reserve `audit_date` and create its `in_progress` run.
    /// The check and the insert happen under one lock; that is the
    /// uniqueness constraint.
    ///
    /// # Errors
    ///
    /// [`AuditError::AlreadyAudited`] if a completed run exists for the
    /// date, [`AuditError::RunInProgress`] if one is underway.
    pub fn reserve(
        &self,
        audit_date: NaiveDate,
        actor: Option<StaffId>,
        now: Timestamp,
    ) -> Result<AuditRunId, AuditError> {
        let mut runs = self.runs.lock();
        for run in runs.values() {
            if run.audit_date != audit_date {
                continue;
            }
            match run.status {
                RunStatus::Completed => {
                    return Err(AuditError::AlreadyAudited { date: audit_date })
                }
                RunStatus::InProgress => {
                    return Err(AuditError::RunInProgress { date: audit_date })
                }
                RunStatus::Failed => {}
            }
        }
        let run = NightAuditRun {
            id: AuditRunId::new(),
            audit_date,
            status: RunStatus::InProgress,
            actor,
            statistics: None,
            failure_reason: None,
            started_at: now,
            finished_at: None,
        };
        let id = run.id;
        runs.insert(id, run);
        Ok(id)
    }

    /// Finalize a run as `completed` with its statistics.
    ///
    /// # Errors
    ///
    /// [`AuditError::RunNotFound`] for an unknown id.
    pub fn complete(
        &self,
        id: AuditRunId,
        statistics: AuditStatistics,
        now: Timestamp,
    ) -> Result<(), AuditError> {
        let mut runs = self.runs.lock();
        let run = runs.get_mut(&id).ok_or(AuditError::RunNotFound(id))?;
        run.status = RunStatus::Completed;
        run.statistics = Some(statistics);
        run.finished_at = Some(now);
        Ok(())
    }

    /// Finalize a run as `failed`.
    ///
    /// # Errors
    ///
    /// [`AuditError::RunNotFound`] for an unknown id.
    pub fn fail(
        &self,
        id: AuditRunId,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), AuditError> {
        let mut runs = self.runs.lock();
        let run = runs.get_mut(&id).ok_or(AuditError::RunNotFound(id))?;
        run.status = RunStatus::Failed;
        run.failure_reason = Some(reason.into());
        run.finished_at = Some(now);
        Ok(())
    }

    /// A copy of the run.
    pub fn get(&self, id: AuditRunId) -> Result<NightAuditRun, AuditError> {
        self.runs
            .lock()
            .get(&id)
            .cloned()
            .ok_or(AuditError::RunNotFound(id))
    }

    /// All runs, most recent start first.
    pub fn all(&self) -> Vec<NightAuditRun> {
        let mut runs: Vec<NightAuditRun> = self.runs.lock().values().cloned().collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stats() -> AuditStatistics {
        AuditStatistics {
            bookings_posted: 0,
            check_ins: 0,
            check_outs: 0,
            revenue: Money::ZERO,
            census: RoomCensus::default(),
            occupancy_rate: Decimal::ZERO,
        }
    }

    #[test]
    fn test_completed_date_can_never_be_reserved_again() {
        let registry = RunRegistry::new();
        let d = date(2026, 9, 1);
        let id = registry.reserve(d, None, Timestamp::now()).unwrap();
        registry.complete(id, stats(), Timestamp::now()).unwrap();
        assert_eq!(
            registry.reserve(d, None, Timestamp::now()),
            Err(AuditError::AlreadyAudited { date: d })
        );
        // A different date is unaffected.
        assert!(registry.reserve(date(2026, 9, 2), None, Timestamp::now()).is_ok());
    }

    #[test]
    fn test_in_progress_date_fails_fast() {
        let registry = RunRegistry::new();
        let d = date(2026, 9, 1);
        registry.reserve(d, None, Timestamp::now()).unwrap();
        assert_eq!(
            registry.reserve(d, None, Timestamp::now()),
            Err(AuditError::RunInProgress { date: d })
        );
    }

    #[test]
    fn test_failed_run_allows_retry() {
        let registry = RunRegistry::new();
        let d = date(2026, 9, 1);
        let first = registry.reserve(d, None, Timestamp::now()).unwrap();
        registry.fail(first, "store unavailable", Timestamp::now()).unwrap();
        let second = registry.reserve(d, None, Timestamp::now()).unwrap();
        assert_ne!(first, second);
        assert_eq!(registry.get(first).unwrap().status, RunStatus::Failed);
        assert_eq!(registry.get(second).unwrap().status, RunStatus::InProgress);
    }

    #[test]
    fn test_occupancy_rate_rounding() {
        let census = RoomCensus {
            occupied: 1,
            total: 3,
            ..RoomCensus::default()
        };
        assert_eq!(census.occupancy_rate().to_string(), "33.3");
        assert_eq!(RoomCensus::default().occupancy_rate(), Decimal::ZERO);
    }
}
