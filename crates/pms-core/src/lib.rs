//! # pms-core — Foundational Types for the PMS Stack
//!
//! This crate is the bedrock of the property-management core. It defines
//! the type-system primitives every other crate in the workspace builds on;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** [`RoomId`], [`BookingId`],
//!    [`StaffId`], [`AuditRunId`], [`RoomNumber`] — no bare strings or UUIDs
//!    for identifiers. You cannot pass a `BookingId` where a `RoomId` is
//!    expected.
//!
//! 2. **UTC-only timestamps.** [`Timestamp`] enforces UTC with seconds
//!    precision. Log rows across the audit trail sort and compare without
//!    timezone ambiguity.
//!
//! 3. **Injectable clock.** Operational rules depend on "today" (future
//!    check-in, stay spanning a date). The [`Clock`] trait keeps those rules
//!    deterministic under test.
//!
//! 4. **Decimal money.** [`Money`] wraps `rust_decimal::Decimal`. Revenue
//!    is summed during the night audit; floats are never an acceptable
//!    representation for it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pms-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use identity::{AuditRunId, BookingId, HousekeepingTaskId, RoomId, RoomNumber, StaffId};
pub use money::Money;
pub use temporal::{Clock, FixedClock, SharedClock, SystemClock, Timestamp};
