//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the PMS Stack.
//! Each identifier is a distinct type — you cannot pass a [`BookingId`]
//! where a [`RoomId`] is expected.
//!
//! ## Validation
//!
//! [`RoomNumber`] validates its contents at construction time (and at
//! deserialization time, which routes through the same constructor).
//! UUID-based identifiers are always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Implements the full surface of a UUID-backed identifier newtype:
/// random constructor, UUID accessors, `Default`, `Display` with a
/// domain prefix, and `FromStr`.
macro_rules! uuid_identifier {
    ($(#[$doc:meta])* $ty:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix(concat!($prefix, ":")).unwrap_or(s);
                s.parse::<Uuid>().map(Self)
            }
        }
    };
}

uuid_identifier!(
    /// A unique identifier for a physical bookable room.
    RoomId,
    "room"
);

uuid_identifier!(
    /// A unique identifier for a booking (a reservation spanning a date
    /// range for a room and guest).
    BookingId,
    "booking"
);

uuid_identifier!(
    /// A unique identifier for a staff member acting on the system.
    ///
    /// Supplied by the identity service; this core stores it as the actor
    /// on manually-initiated transitions but performs no permission
    /// enforcement itself.
    StaffId,
    "staff"
);

uuid_identifier!(
    /// A unique identifier for a housekeeping task.
    HousekeepingTaskId,
    "hktask"
);

uuid_identifier!(
    /// A unique identifier for a night-audit run.
    AuditRunId,
    "auditrun"
);

// ---------------------------------------------------------------------------
// RoomNumber — validated, human-facing room label
// ---------------------------------------------------------------------------

/// The human-facing room label printed on the door (e.g. `"101"`, `"12B"`).
///
/// Distinct from [`RoomId`]: the number is what front-desk staff type into
/// diagnostic queries, the id is what the stores key on. Numbers are
/// non-empty, at most 16 characters, and contain no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoomNumber(String);

impl RoomNumber {
    /// Create a validated room number.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] if the input is empty,
    /// longer than 16 characters, or contains whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        let reason = if raw.is_empty() {
            Some("must not be empty")
        } else if raw.len() > 16 {
            Some("must be at most 16 characters")
        } else if raw.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CoreError::InvalidIdentifier {
                kind: "room number",
                value: raw,
                reason: reason.to_string(),
            }),
            None => Ok(Self(raw)),
        }
    }

    /// The room number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Deserializes as a plain String, then routes through `new()` so that
// invalid values are rejected at deserialization time — not silently
// accepted.
impl<'de> Deserialize<'de> for RoomNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_distinct_random_ids() {
        assert_ne!(RoomId::new(), RoomId::new());
        assert_ne!(BookingId::new(), BookingId::new());
    }

    #[test]
    fn test_display_carries_prefix() {
        let id = RoomId::new();
        assert!(id.to_string().starts_with("room:"));
        let run = AuditRunId::new();
        assert!(run.to_string().starts_with("auditrun:"));
    }

    #[test]
    fn test_from_str_roundtrip_with_and_without_prefix() {
        let id = BookingId::new();
        let parsed = BookingId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        let bare = BookingId::from_str(&id.as_uuid().to_string()).unwrap();
        assert_eq!(bare, id);
    }

    #[test]
    fn test_room_number_accepts_alphanumeric() {
        assert_eq!(RoomNumber::new("101").unwrap().as_str(), "101");
        assert_eq!(RoomNumber::new("12B").unwrap().as_str(), "12B");
    }

    #[test]
    fn test_room_number_rejects_empty_and_whitespace() {
        assert!(RoomNumber::new("").is_err());
        assert!(RoomNumber::new("1 01").is_err());
        assert!(RoomNumber::new("a".repeat(17)).is_err());
    }

    #[test]
    fn test_room_number_deserialize_validates() {
        let ok: Result<RoomNumber, _> = serde_json::from_str("\"205\"");
        assert!(ok.is_ok());
        let bad: Result<RoomNumber, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
