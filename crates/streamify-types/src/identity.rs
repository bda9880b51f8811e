use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new time-ordered identifier (UUID v7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Create from an existing UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Short representation (first 8 characters of the UUID).
            pub fn short_id(&self) -> String {
                self.0.to_string()[..8].to_string()
            }

            /// Parse from the canonical hyphenated or simple UUID form.
            pub fn parse(s: &str) -> Result<Self, TypeError> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| TypeError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short_id())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

document_id!(
    /// Identifier of a user document.
    ///
    /// UUID v7 ids sort by creation time, which gives listings a stable
    /// ordering key that does not shift under concurrent inserts.
    UserId,
    "user"
);

document_id!(
    /// Identifier of a friend-request document.
    FriendRequestId,
    "friend request"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn parse_display_roundtrip() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_malformed() {
        let err = UserId::parse("not-an-id").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidId {
                kind: "user",
                value: "not-an-id".into()
            }
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = FriendRequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn short_id_is_prefix() {
        let id = UserId::new();
        assert!(id.to_string().starts_with(&id.short_id()));
        assert_eq!(id.short_id().len(), 8);
    }
}
