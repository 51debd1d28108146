//! # PMS Audit — the Night-Audit Batch
//!
//! Posts each day's eligible bookings exactly once, snapshots the room
//! census and revenue, and records everything in immutable run/detail
//! rows. The run registry's atomic date reservation is what makes
//! "at most one completed run per date" hold across concurrent
//! schedulers.

pub mod error;
pub mod processor;
pub mod run;

pub use error::AuditError;
pub use processor::{AuditPreview, NightAuditProcessor};
pub use run::{
    AuditStatistics, DetailRecordType, NightAuditDetail, NightAuditRun, RoomCensus, RunRegistry,
    RunStatus,
};
