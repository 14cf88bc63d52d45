//! Newtype UUID identifiers.
//!
//! Storage keys every row by UUID, and a bare [`Uuid`] slots equally well
//! into a client-id or a user-id parameter. Each identifier here is its own
//! type, so the scope resolver can only be handed `ClientId`s and an audit
//! line can only name a `UserId`.
//!
//! ```
//! use gridmon_core::{ClientId, UserId};
//!
//! let anchor: ClientId = "550e8400-e29b-41d4-a716-446655440000".parse()?;
//! assert_eq!(anchor.to_string(), "550e8400-e29b-41d4-a716-446655440000");
//!
//! // Minted ids are random v4 UUIDs.
//! assert_ne!(UserId::new(), UserId::new());
//! # Ok::<(), gridmon_core::ParseIdError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Returned when a string does not parse as the expected identifier type.
///
/// Keeps the rejected input so callers can log what was actually received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    expected: &'static str,
    input: String,
}

impl ParseIdError {
    /// Name of the identifier type the parse was aimed at.
    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// The string that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} is not a valid {}", self.input, self.expected)
    }
}

impl std::error::Error for ParseIdError {}

/// Defines one UUID-backed identifier newtype with the full conversion
/// and formatting surface.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mints a fresh random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID, typically one read from storage.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrows the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Unwraps into the underlying UUID, for query binding.
            #[must_use]
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match Uuid::parse_str(s) {
                    Ok(uuid) => Ok(Self(uuid)),
                    Err(_) => Err(ParseIdError {
                        expected: stringify!($name),
                        input: s.to_string(),
                    }),
                }
            }
        }
    };
}

define_id!(
    /// Identifier of a client-tree node.
    ///
    /// Every tenant/organizational node in the client hierarchy (root,
    /// enterprise, division, site, leaf client) carries one, and every
    /// client-scoped row (devices, fault events, statistics) is keyed by
    /// one.
    ///
    /// ```
    /// use gridmon_core::ClientId;
    /// use uuid::Uuid;
    ///
    /// let row_id = Uuid::new_v4();
    /// let client = ClientId::from_uuid(row_id);
    /// assert_eq!(client.as_uuid(), &row_id);
    /// assert_eq!(client.into_uuid(), row_id);
    /// ```
    ClientId
);

define_id!(
    /// Identifier of an authenticated user.
    UserId
);

define_id!(
    /// Identifier of a monitored device.
    DeviceId
);
