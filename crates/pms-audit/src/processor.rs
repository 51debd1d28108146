//! # Night-Audit Processor
//!
//! The once-per-calendar-day batch that freezes a day's operational and
//! financial state. A run:
//!
//! 1. reserves its date atomically (in-progress run row);
//! 2. selects the unposted bookings the date is responsible for;
//! 3. posts each one and writes an immutable detail snapshot;
//! 4. recomputes the room census, deriving the occupied count from
//!    checked-in bookings rather than trusting cached room statuses;
//! 5. stamps every room's last-posted status/date, each with its own
//!    detail snapshot;
//! 6. finalizes the run with its statistics.
//!
//! Any failure mid-run finalizes it as `failed` instead and leaves the
//! not-yet-posted rows untouched; because selection filters on
//! `is_posted = false`, a retry picks up exactly where the failed run
//! stopped.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::json;
use tracing::{info, warn};

use pms_core::{AuditRunId, Money, SharedClock, StaffId, Timestamp};
use pms_registry::{Booking, BookingStore, RoomStore};
use pms_state::{BookingStatus, RoomStatus};

use crate::error::AuditError;
use crate::run::{
    AuditStatistics, DetailRecordType, NightAuditDetail, NightAuditRun, RoomCensus, RunRegistry,
};

/// What a run *would* post, without posting anything.
#[derive(Debug, Clone)]
pub struct AuditPreview {
    /// The date previewed.
    pub audit_date: NaiveDate,
    /// Bookings the run would select.
    pub eligible: Vec<Booking>,
    /// Revenue the run would report.
    pub estimated_revenue: Money,
    /// The census as it stands now.
    pub census: RoomCensus,
}

/// Runs the nightly batch.
pub struct NightAuditProcessor {
    bookings: Arc<BookingStore>,
    rooms: Arc<RoomStore>,
    registry: RunRegistry,
    details: Mutex<Vec<NightAuditDetail>>,
    clock: SharedClock,
}

impl NightAuditProcessor {
    /// Build a processor with an empty run registry.
    pub fn new(bookings: Arc<BookingStore>, rooms: Arc<RoomStore>, clock: SharedClock) -> Self {
        Self {
            bookings,
            rooms,
            registry: RunRegistry::new(),
            details: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Execute the audit for `audit_date`.
    ///
    /// # Errors
    ///
    /// [`AuditError::AlreadyAudited`] if the date has a completed run,
    /// [`AuditError::RunInProgress`] if one is underway. A mid-run store
    /// error finalizes the run as failed and propagates.
    pub fn run(
        &self,
        audit_date: NaiveDate,
        actor: Option<StaffId>,
    ) -> Result<AuditRunId, AuditError> {
        let now = self.clock.now();
        let run_id = self.registry.reserve(audit_date, actor, now)?;
        info!(%run_id, %audit_date, "night audit started");

        match self.execute(run_id, audit_date, now) {
            Ok(statistics) => {
                let posted = statistics.bookings_posted;
                self.registry.complete(run_id, statistics, self.clock.now())?;
                info!(%run_id, %audit_date, posted, "night audit completed");
                Ok(run_id)
            }
            Err(err) => {
                warn!(%run_id, %audit_date, error = %err, "night audit failed");
                self.registry.fail(run_id, err.to_string(), self.clock.now())?;
                Err(err)
            }
        }
    }

    /// Report what a run for `audit_date` would do, posting nothing.
    pub fn preview(&self, audit_date: NaiveDate) -> AuditPreview {
        let eligible = self.bookings.unposted_eligible(audit_date);
        let estimated_revenue = revenue_of(&eligible);
        let census = self.census(audit_date);
        AuditPreview {
            audit_date,
            eligible,
            estimated_revenue,
            census,
        }
    }

    /// All runs, most recent first.
    pub fn runs(&self) -> Vec<NightAuditRun> {
        self.registry.all()
    }

    /// One run by id.
    ///
    /// # Errors
    ///
    /// [`AuditError::RunNotFound`] for an unknown id.
    pub fn run_record(&self, id: AuditRunId) -> Result<NightAuditRun, AuditError> {
        self.registry.get(id)
    }

    /// Detail rows a run wrote, in write order.
    pub fn details_for(&self, run_id: AuditRunId) -> Vec<NightAuditDetail> {
        self.details
            .lock()
            .iter()
            .filter(|d| d.run_id == run_id)
            .cloned()
            .collect()
    }

    // Steps 3–7; called with the date already reserved.
    fn execute(
        &self,
        run_id: AuditRunId,
        audit_date: NaiveDate,
        now: Timestamp,
    ) -> Result<AuditStatistics, AuditError> {
        let selected = self.bookings.unposted_eligible(audit_date);

        let mut check_ins = 0u32;
        let mut check_outs = 0u32;
        for booking in &selected {
            self.bookings.update(booking.id, now, |b| {
                b.is_posted = true;
                b.posted_date = Some(audit_date);
            })?;
            match booking.status {
                BookingStatus::CheckedIn => check_ins += 1,
                BookingStatus::CheckedOut => check_outs += 1,
                _ => {}
            }
            self.details.lock().push(NightAuditDetail {
                run_id,
                record_type: DetailRecordType::Booking,
                reference: booking.id.to_string(),
                action: "posted".to_string(),
                snapshot: json!({
                    "number": booking.number,
                    "room_id": booking.room_id,
                    "status": booking.status,
                    "check_in": booking.check_in,
                    "check_out": booking.check_out,
                    "total_amount": booking.total_amount,
                }),
                recorded_at: now,
            });
        }

        let census = self.census(audit_date);

        for room in self.rooms.snapshots() {
            let status = self.rooms.with_room(room.id, |r| {
                r.last_posted_status = Some(r.status);
                r.last_posted_date = Some(audit_date);
                r.touch(now);
                r.status
            })?;
            self.details.lock().push(NightAuditDetail {
                run_id,
                record_type: DetailRecordType::Room,
                reference: room.id.to_string(),
                action: "status_snapshot".to_string(),
                snapshot: json!({
                    "number": room.number,
                    "status": status,
                    "posted_date": audit_date,
                }),
                recorded_at: now,
            });
        }

        Ok(AuditStatistics {
            bookings_posted: selected.len() as u32,
            check_ins,
            check_outs,
            revenue: revenue_of(&selected),
            occupancy_rate: census.occupancy_rate(),
            census,
        })
    }

    // Occupied from the booking census; everything else from cached status.
    fn census(&self, audit_date: NaiveDate) -> RoomCensus {
        let occupied_rooms = self.bookings.checked_in_rooms_on(audit_date);
        let mut census = RoomCensus {
            occupied: occupied_rooms.len() as u32,
            ..RoomCensus::default()
        };
        for room in self.rooms.snapshots() {
            census.total += 1;
            match room.status {
                RoomStatus::Available => census.available += 1,
                RoomStatus::Reserved => census.reserved += 1,
                RoomStatus::Dirty => census.dirty += 1,
                RoomStatus::Cleaning => census.cleaning += 1,
                RoomStatus::Maintenance => census.maintenance += 1,
                RoomStatus::OutOfOrder => census.out_of_order += 1,
                RoomStatus::Occupied => {}
            }
        }
        census
    }
}

/// Revenue counts only bookings with a guest actually in (or just out of)
/// the house.
fn revenue_of(bookings: &[Booking]) -> Money {
    bookings
        .iter()
        .filter(|b| b.status.counts_toward_revenue())
        .map(|b| b.total_amount)
        .sum()
}
