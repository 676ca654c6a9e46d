//! HTTP transport for GraphQL requests.
//!
//! [`Transport`] is the seam between envelope handling in
//! [`crate::client`] and the wire. [`HttpTransport`] is the reqwest
//! implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use triage::TrackerError;

use crate::ApiToken;

/// Default GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

/// Default request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Status and fully-read body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one encoded GraphQL request and returns the raw response.
///
/// Implementations must not retry and must read the whole body before
/// returning.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, body: String, token: &ApiToken) -> Result<RawResponse, TrackerError>;
}

/// reqwest-backed [`Transport`] posting to a single endpoint.
///
/// The deadline covers connecting, sending and reading the body. Dropping
/// the returned future aborts the request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport for `endpoint` with the given deadline.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, error: reqwest::Error) -> TrackerError {
        if error.is_timeout() {
            TrackerError::Timeout {
                after: self.timeout,
            }
        } else {
            TrackerError::Transport {
                message: error_chain(&error),
            }
        }
    }
}

/// Joins `error` and its `source()` chain into one message.
///
/// Causes already contained in the preceding text are skipped.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, body: String, token: &ApiToken) -> Result<RawResponse, TrackerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, token.expose())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok(RawResponse { status, body })
    }
}
