//! Typed entity identifiers
//!
//! Every entity carries an opaque ULID-backed identifier. ULIDs sort by
//! creation time, which gives listings a stable order and gives the
//! fairness ranking a deterministic tie-breaker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Ulid);

        impl $name {
            /// Generate a fresh identifier
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ulid::from_string(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Organization identifier
    OrganizationId
);
entity_id!(
    /// Member identifier
    MemberId
);
entity_id!(
    /// Roster identifier
    RosterId
);
entity_id!(
    /// Shift identifier
    ShiftId
);
entity_id!(
    /// Answer identifier
    AnswerId
);
entity_id!(
    /// Assignment (saved shift) identifier
    AssignmentId
);
entity_id!(
    /// Template identifier
    TemplateId
);
entity_id!(
    /// Template shift identifier
    TemplateShiftId
);
entity_id!(
    /// Template preference identifier
    PreferenceId
);
