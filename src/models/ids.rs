//! Identity newtypes for people referenced by the engine.
//!
//! The engine never inspects instructor or student attributes beyond
//! identity, so these are thin string wrappers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrows the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_newtype!(
    /// Instructor identity.
    InstructorId
);
id_newtype!(
    /// Student identity.
    StudentId
);
id_newtype!(
    /// Session type (lecture, lab, seminar, ...). Rooms carry the same tag.
    SessionType
);
