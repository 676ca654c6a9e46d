//! Error types for the triage domain.
//!
//! [`TrackerError`] is the taxonomy every ticketing-backend adapter reports
//! through the port traits in [`crate::ports`]. [`TriageError`] covers
//! conditions that stop a single report from becoming an issue.

use std::time::Duration;

use thiserror::Error;

use crate::TeamId;

// ---------------------------------------------------------------------------
// Ticketing backend errors
// ---------------------------------------------------------------------------

/// Failure of one request to the ticketing backend.
///
/// None of these are retried; each failure is reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Network, DNS or connection failure before a response was received.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the underlying cause.
        message: String,
    },

    /// The request did not complete within the configured deadline.
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The deadline that was exceeded.
        after: Duration,
    },

    /// The response body is not a GraphQL envelope.
    ///
    /// The raw body is kept so malformed responses can be diagnosed.
    #[error("invalid response (status {status}): {message}: {body}")]
    Protocol {
        /// HTTP status code of the response.
        status: u16,
        /// Parser error.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// The envelope was valid but `data` does not have the expected shape.
    #[error("failed to decode response data: {message}")]
    Decode {
        /// Decoder error.
        message: String,
    },

    /// The backend reported an application error.
    ///
    /// Only the first error of the envelope is carried; any further errors
    /// are dropped.
    #[error("GraphQL error: {message}")]
    GraphQl {
        /// User-presentable message when the backend supplied one, otherwise
        /// the raw error message.
        message: String,
    },

    /// The mutation executed but the backend declined to create the issue.
    #[error("issue creation rejected by the backend for team {team}")]
    Rejected {
        /// Team the issue was addressed to.
        team: TeamId,
    },
}

// ---------------------------------------------------------------------------
// Triage errors
// ---------------------------------------------------------------------------

/// Errors that stop a report from being filed.
#[derive(Debug, Error)]
pub enum TriageError {
    /// The report's application maps to no team and no default team is set.
    #[error("no team is configured for application '{application}'")]
    Unroutable {
        /// Application name from the report.
        application: String,
    },

    /// The routing configuration is invalid.
    ///
    /// Produced at load time; the service never starts with an invalid table.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The ticketing backend request failed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl TriageError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
