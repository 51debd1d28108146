//! # pms-registry — In-Memory Stores and the Append-Only Audit Trail
//!
//! The storage substrate of the property-management core. Persistence
//! technology is out of scope for the core; these stores are the seam a
//! database-backed deployment would replace, and they carry the two
//! concurrency guarantees the operational layer leans on:
//!
//! 1. **Per-room serialization.** [`RoomStore`] keeps each room behind its
//!    own mutex. A transition's read → validate → write → log sequence runs
//!    entirely inside [`RoomStore::with_room`], so two concurrent
//!    transitions on the same room cannot interleave and lose an update.
//!
//! 2. **Append-only logs.** [`AuditTrail`] rows are pushed and never
//!    mutated; [`HousekeepingQueue`] enqueueing is idempotent per room and
//!    due date.
//!
//! Room records are mutated exclusively through the state machine in
//! `pms-ops`; nothing else should call [`RoomStore::with_room`] with a
//! status write.

pub mod bookings;
pub mod error;
pub mod housekeeping;
pub mod rooms;
pub mod trail;

// Re-export primary types for ergonomic imports.
pub use bookings::{Booking, BookingStore, NewBooking};
pub use error::RegistryError;
pub use housekeeping::{
    EnqueueOutcome, HousekeepingQueue, HousekeepingTask, InMemoryHousekeepingQueue, TaskState,
};
pub use rooms::{DatePair, Room, RoomStore};
pub use trail::{AuditTrail, RecentChange, RoomHistoryRecord, StatusChangeRecord};
