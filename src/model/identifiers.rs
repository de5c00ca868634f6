//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.
//! Deserialization goes through the same validation via `TryFrom<String>`.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $error:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Smart constructor: rejects empty identifiers.
            pub fn new(raw: impl Into<String>) -> Result<Self, $error> {
                let raw = raw.into();
                if raw.is_empty() {
                    Err($error::Empty)
                } else {
                    Ok(Self(raw))
                }
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $error;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_identifier!(
    /// Stable identifier of a component instance. Survives edits and relayouts.
    ComponentId,
    InvalidComponentId
);

string_identifier!(
    /// Identifier of a template slot.
    SlotId,
    InvalidSlotId
);

string_identifier!(
    /// Identifier of a template.
    TemplateId,
    InvalidTemplateId
);

// ===== Error Types =====

/// Rejected component identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidComponentId {
    /// The identifier was the empty string.
    #[error("Component ID cannot be empty")]
    Empty,
}

/// Rejected slot identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSlotId {
    /// The identifier was the empty string.
    #[error("Slot ID cannot be empty")]
    Empty,
}

/// Rejected template identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTemplateId {
    /// The identifier was the empty string.
    #[error("Template ID cannot be empty")]
    Empty,
}

// ===== Tests =====
