//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `MemberId` where an
//! `ExpenseId` is expected. Groups are keyed by UUID; members and expenses
//! use database-assigned integer keys.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate UUID-backed typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

/// Macro to generate integer-backed typed ID wrappers for
/// database-assigned (BIGSERIAL) keys.
macro_rules! record_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an ID from a raw database key.
            #[must_use]
            pub const fn from_raw(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(GroupId, "Unique identifier for an expense-sharing group.");

record_id!(MemberId, "Unique identifier for a group member.");
record_id!(ExpenseId, "Unique identifier for a recorded expense.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_group_id_roundtrip() {
        let id = GroupId::new();
        let parsed = GroupId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_group_ids_are_unique() {
        assert_ne!(GroupId::new(), GroupId::new());
    }

    #[test]
    fn test_member_id_from_raw() {
        let id = MemberId::from_raw(42);
        assert_eq!(id.into_inner(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(MemberId::from(42), id);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let member = MemberId::from_raw(7);
        assert_eq!(serde_json::to_string(&member).unwrap(), "7");

        let group = GroupId::new();
        assert_eq!(
            serde_json::to_string(&group).unwrap(),
            format!("\"{group}\"")
        );
    }
}
