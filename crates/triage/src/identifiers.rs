//! Newtype domain identifiers.
//!
//! Every backend identifier the router handles is a distinct newtype wrapping
//! a string. This prevents accidentally passing, for example, a [`LabelId`]
//! where a [`TeamId`] is expected, even though both are opaque UUID strings
//! issued by the ticketing backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: backend-issued
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a ticketing team that owns issues for one application.
    TeamId
}

string_id! {
    /// Identifies an issue label (problem category, bridge, priority, or the
    /// constant rageshake label).
    LabelId
}

string_id! {
    /// Identifies a ticketing-backend user account.
    ///
    /// Used as the assignee of an issue when the reporter is a staff member
    /// whose email resolves to an account.
    AccountId
}

string_id! {
    /// Opaque backend identifier of a created issue.
    IssueId
}

string_id! {
    /// Human-readable issue key assigned by the backend (e.g. `"AND-1234"`).
    IssueKey
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one report submission through the triage service.
///
/// Generated fresh for every report; recorded on the submission span so all
/// log lines from a single report can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Generates a new random submission identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
