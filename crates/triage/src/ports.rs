//! Port traits implemented by ticketing-backend adapters.
//!
//! The domain defines *what* it needs from the backend; the `linear` crate
//! supplies *how*. Both traits are object-safe so the service can hold them
//! as `Arc<dyn ...>`.

use async_trait::async_trait;

use crate::{AccountRecord, CreatedIssue, IssueDraft, TrackerError};

/// Account lookups against the ticketing backend.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Returns the accounts whose email equals `email` exactly.
    ///
    /// The backend may return related accounts as well; callers must not
    /// assume the result contains only exact matches.
    async fn find_accounts_by_email(&self, email: &str)
        -> Result<Vec<AccountRecord>, TrackerError>;

    /// Returns every account the backend lists in a single page (at most 250).
    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, TrackerError>;
}

/// Issue creation against the ticketing backend.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Files `draft` as a new issue.
    ///
    /// Returns [`TrackerError::Rejected`] when the backend executes the
    /// mutation but reports that it did not create the issue.
    async fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue, TrackerError>;
}
