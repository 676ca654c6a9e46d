//! Linear infrastructure adapter.
//!
//! Implements the [`triage::AccountDirectory`] and [`triage::IssueTracker`]
//! traits over Linear's GraphQL API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request encoding, envelope decoding and
//! the typed operations live here. The [`triage`] crate sees only the port
//! traits and [`triage::TrackerError`].
//!
//! ## Error mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | connection / DNS failure | `Transport` |
//! | deadline exceeded (default one minute) | `Timeout` |
//! | body is not a GraphQL envelope | `Protocol` (raw body attached) |
//! | envelope carries errors | `GraphQl` (first error only) |
//! | `data` has the wrong shape | `Decode` |
//! | `issueCreate.success == false` | `Rejected` |
//!
//! Nothing is retried.

pub mod client;
pub mod operations;
pub mod token;
pub mod tracker;
pub mod transport;

pub use client::{decode_response, GraphQlClient, GraphQlOperation};
pub use token::ApiToken;
pub use tracker::LinearTracker;
pub use transport::{HttpTransport, RawResponse, Transport, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

/// Builds a tracker talking to `endpoint` over HTTP.
pub fn http_tracker(
    endpoint: impl Into<String>,
    timeout: std::time::Duration,
    token: ApiToken,
) -> Result<LinearTracker, triage::TrackerError> {
    let transport = HttpTransport::new(endpoint, timeout)?;
    Ok(LinearTracker::new(GraphQlClient::new(transport), token))
}
