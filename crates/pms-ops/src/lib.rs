//! # PMS Ops — Room State Machine and Booking Synchronization
//!
//! Operational heart of the stack. [`RoomStateMachine`] is the only write
//! path for a room's status; [`BookingLifecycleSynchronizer`] turns booking
//! status writes into automatic room transitions through it; the
//! [`ManualStatusGuard`] sits between the two and keeps automatic logic
//! from reverting what staff set.
//!
//! ```text
//! booking write ──► BookingLifecycleSynchronizer
//!                          │ (Auto request)
//!                          ▼
//!                   RoomStateMachine ──► ManualStatusGuard
//!                          │
//!                          ├─► room row (per-room mutex)
//!                          ├─► audit trail (attempt + history)
//!                          └─► housekeeping queue (dirty/cleaning)
//! ```

pub mod error;
pub mod guard;
pub mod machine;
pub mod sync;

pub use error::OpsError;
pub use guard::{GuardDecision, ManualStatusGuard};
pub use machine::{ApplyOutcome, RoomStateMachine, TransitionRequest};
pub use sync::{BookingLifecycleSynchronizer, MaxOccupancyLookup};
