//! Identity types for MindArena
//!
//! Backend identifiers are opaque strings (a user is keyed by email, problems
//! and sessions by server-assigned ids). Each kind gets its own wrapper so a
//! problem id can never be passed where a session id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate string-backed ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an identifier received from the server
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id_type!(UserId, "User identifier (the account email)");
define_id_type!(ProblemId, "Unique identifier for a generated problem");
define_id_type!(SessionId, "Unique identifier for an arena session");
define_id_type!(InterventionId, "Unique identifier for a mentor intervention");

/// Key attached to one submission attempt so the server can reject a
/// duplicate scoring of the same attempt.
///
/// Retrying an attempt must reuse its key; a new attempt gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(pub Uuid);

impl IdempotencyKey {
    /// Create a fresh random key
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for IdempotencyKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = ProblemId::from("P42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P42\"");

        let back: SessionId = serde_json::from_str("\"s-1\"").unwrap();
        assert_eq!(back.as_str(), "s-1");
    }

    #[test]
    fn test_idempotency_keys_are_unique() {
        assert_ne!(IdempotencyKey::new(), IdempotencyKey::new());
    }
}
