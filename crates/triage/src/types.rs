//! Shared value types for the triage domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the content of a report as it moves through routing, identity resolution,
//! and issue composition.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{AccountId, IssueId, IssueKey, LabelId, TeamId};

// ---------------------------------------------------------------------------
// Report classification
// ---------------------------------------------------------------------------

/// Problem category picked by the user in the report form.
///
/// Serialised as the exact text the form submits, which is also the key used
/// in the `[routing.problems]` configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProblemCategory {
    #[serde(rename = "Trouble connecting Beeper to a chat network")]
    SignIn,
    #[serde(rename = "I can't send a message")]
    Send,
    #[serde(rename = "I can't receive any messages")]
    ReceiveAny,
    #[serde(rename = "I can't receive certain messages")]
    ReceiveCertain,
    #[serde(rename = "Problem with app buttons/interface/text")]
    Interface,
    #[serde(rename = "Encryption/decryption error")]
    Encryption,
    #[serde(rename = "Notifications problem")]
    Notifications,
    #[serde(rename = "Feature request")]
    FeatureRequest,
    #[serde(rename = "Bridge Request")]
    BridgeRequest,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Suggestion")]
    Suggestion,
}

impl ProblemCategory {
    /// Every category, in form order.
    pub const ALL: [ProblemCategory; 11] = [
        Self::SignIn,
        Self::Send,
        Self::ReceiveAny,
        Self::ReceiveCertain,
        Self::Interface,
        Self::Encryption,
        Self::Notifications,
        Self::FeatureRequest,
        Self::BridgeRequest,
        Self::Other,
        Self::Suggestion,
    ];

    /// Returns the form text for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "Trouble connecting Beeper to a chat network",
            Self::Send => "I can't send a message",
            Self::ReceiveAny => "I can't receive any messages",
            Self::ReceiveCertain => "I can't receive certain messages",
            Self::Interface => "Problem with app buttons/interface/text",
            Self::Encryption => "Encryption/decryption error",
            Self::Notifications => "Notifications problem",
            Self::FeatureRequest => "Feature request",
            Self::BridgeRequest => "Bridge Request",
            Self::Other => "Other",
            Self::Suggestion => "Suggestion",
        }
    }
}

impl std::fmt::Display for ProblemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// How urgent the user considers the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserPriority {
    Low,
    Medium,
    High,
}

impl UserPriority {
    /// Returns the wire name (`"low"`, `"medium"`, `"high"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for UserPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// A form value that matches none of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0:?}")]
pub struct UnknownVariant(pub String);

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A support report as handed over by the front end.
///
/// Unknown problem categories and priorities are accepted and become `None`;
/// routing then simply adds no label for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Originating application (e.g. `"beeper-android"`).
    pub application: String,

    /// Bridge the problem relates to, if any.
    #[serde(default)]
    pub bridge: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub problem: Option<ProblemCategory>,

    #[serde(default, deserialize_with = "lenient")]
    pub priority: Option<UserPriority>,

    /// Reporter email as typed by the user; not validated.
    #[serde(default)]
    pub email: String,

    /// Free-text description written by the user.
    #[serde(default)]
    pub body: String,

    /// Matrix username of the reporter, used to build log links.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Extra key/value context (app version, device, ...), rendered verbatim
    /// into the issue description.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Report {
    /// Returns the bridge name if one was given and it is not blank.
    pub fn bridge(&self) -> Option<&str> {
        self.bridge.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

// ---------------------------------------------------------------------------
// Routing and issue types
// ---------------------------------------------------------------------------

/// Backend identifiers derived from a report by the routing table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingResult {
    /// Owning team; `None` when the application is unknown and no default
    /// team is configured.
    pub team: Option<TeamId>,

    /// Labels to attach. Always contains the rageshake label.
    pub labels: BTreeSet<LabelId>,
}

/// A user account as returned by the ticketing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Fully composed create-issue input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    pub team: TeamId,
    pub title: String,
    /// Markdown body.
    pub description: String,
    pub labels: Vec<LabelId>,
    pub assignee: Option<AccountId>,
}

/// Reference to an issue the backend accepted.
///
/// Only ever constructed from a successful create-issue response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: IssueId,
    pub title: String,
    /// Human-readable key (e.g. `"AND-1234"`).
    pub identifier: IssueKey,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn unix_millis(self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
