//! # pms-state — Room and Booking State Vocabulary
//!
//! Pure state definitions for the property-management core. Nothing in this
//! crate touches a store or a clock; it is the vocabulary the operational
//! services (`pms-ops`) speak.
//!
//! - **Room** ([`room`]): [`RoomStatus`], the [`TransitionRuleSet`]
//!   (static table of allowed from→to pairs with advisory permission tags),
//!   the [`TransitionSource`] capability tag (AUTO vs MANUAL), and the
//!   [`DateSlot`] a status keeps its date pair in.
//!
//! - **Booking** ([`booking`]): [`BookingStatus`] with the active/posting
//!   predicates the synchronizer and the night audit evaluate, and the
//!   orthogonal [`ComplimentaryPeriod`] attribute.
//!
//! - **Errors** ([`error`]): [`TransitionError`] — the two ways a
//!   non-same-status transition can be rejected by the rule table.

pub mod booking;
pub mod error;
pub mod room;

// Re-export primary types for ergonomic imports.
pub use booking::{BookingStatus, ComplimentaryPeriod};
pub use error::TransitionError;
pub use room::{DateSlot, RoomStatus, TransitionRule, TransitionRuleSet, TransitionSource};
