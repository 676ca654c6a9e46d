//! Core domain for support-report triage.
//!
//! This crate turns a user's support report into a ticketing-backend issue:
//! it decides which team owns the report and which labels apply, resolves the
//! reporter to a backend account, and composes the issue. Infrastructure
//! crates implement the port traits defined here; they never add routing rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed from the ticketing backend; the `linear` crate
//! defines *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype backend identifiers (`TeamId`, `LabelId`, etc.) |
//! | [`types`] | Report, routing result, issue draft and created-issue types |
//! | [`errors`] | Backend error taxonomy and triage errors |
//! | [`ports`] | `AccountDirectory` and `IssueTracker` traits |
//! | [`routing`] | Configurable routing tables |
//! | [`identity`] | Email normalisation, account cache and resolver |
//! | [`issue`] | Issue title/description composition |
//! | [`diagnostics`] | Grafana log links |
//! | [`service`] | Per-report orchestration |

pub mod diagnostics;
pub mod errors;
pub mod identifiers;
pub mod identity;
pub mod issue;
pub mod ports;
pub mod routing;
pub mod service;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use diagnostics::{GrafanaConfig, LogLinks};
pub use errors::{TrackerError, TriageError};
pub use identifiers::{AccountId, IssueId, IssueKey, LabelId, SubmissionId, TeamId};
pub use identity::{
    canonical_email, AccountCache, AccountEntry, IdentityResolver, InMemoryAccountCache,
};
pub use issue::compose_issue;
pub use ports::{AccountDirectory, IssueTracker};
pub use routing::{BridgeRoute, RoutingConfig, RoutingTable};
pub use service::TriageService;
pub use types::{
    AccountRecord, CreatedIssue, IssueDraft, ProblemCategory, Report, RoutingResult, Timestamp,
    UnknownVariant, UserPriority,
};
