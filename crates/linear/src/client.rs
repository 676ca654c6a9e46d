//! GraphQL request execution and envelope decoding.
//!
//! Every request is `{"query": ..., "variables": ...}`; the token travels only
//! in the `Authorization` header. Responses are decoded in three steps:
//!
//! 1. The body must be JSON shaped like `{"errors": [...], "data": ...}`,
//!    whatever the HTTP status (the backend reports errors with non-200
//!    statuses too). Otherwise → [`TrackerError::Protocol`].
//! 2. A non-empty `errors` list → [`TrackerError::GraphQl`] built from the
//!    *first* error only; `data` is ignored even when present.
//! 3. `data` is decoded into the operation's response type, or
//!    [`TrackerError::Decode`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use triage::TrackerError;

use crate::transport::{HttpTransport, RawResponse, Transport};
use crate::ApiToken;

/// A typed GraphQL operation.
///
/// The implementing type is serialised as the request's `variables` object.
pub trait GraphQlOperation: Serialize + Send + Sync {
    /// Operation name, used for logging.
    const NAME: &'static str;

    /// Query or mutation document.
    const QUERY: &'static str;

    /// Shape of the response's `data` field.
    type Data: DeserializeOwned + Send;
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: &'a V,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct ErrorExtensions {
    #[serde(default, rename = "userPresentableMessage")]
    user_presentable_message: Option<String>,
}

impl GraphQlError {
    fn into_message(self) -> String {
        match self.extensions.and_then(|e| e.user_presentable_message) {
            Some(message) if !message.is_empty() => message,
            _ => self.message,
        }
    }
}

/// Executes [`GraphQlOperation`]s over a [`Transport`].
#[derive(Debug, Clone)]
pub struct GraphQlClient<T = HttpTransport> {
    transport: T,
}

impl<T: Transport> GraphQlClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `operation` once and decodes its payload.
    #[instrument(name = "linear_request", skip_all, fields(operation = O::NAME))]
    pub async fn execute<O: GraphQlOperation>(
        &self,
        operation: &O,
        token: &ApiToken,
    ) -> Result<O::Data, TrackerError> {
        let body = serde_json::to_string(&GraphQlRequest {
            query: O::QUERY,
            variables: operation,
        })
        .map_err(|e| TrackerError::Transport {
            message: format!("failed to encode request JSON: {e}"),
        })?;

        let response = self.transport.post(body, token).await?;
        decode_response(&response)
    }
}

/// Decodes a raw response into `D`, logging it on the way.
pub fn decode_response<D: DeserializeOwned>(response: &RawResponse) -> Result<D, TrackerError> {
    let RawResponse { status, body } = response;
    let parsed = serde_json::from_str::<Value>(body);

    if *status != 200 {
        error!(status_code = status, resp_data = %body, "got non-200 response");
    } else if parsed.is_ok() {
        info!(resp_data = %body, "received GraphQL response");
    } else {
        warn!(resp_data_invalid = %body, "received non-JSON GraphQL response");
    }

    let envelope = parsed
        .and_then(serde_json::from_value::<Envelope>)
        .map_err(|e| TrackerError::Protocol {
            status: *status,
            message: e.to_string(),
            body: body.clone(),
        })?;

    let mut errors = envelope.errors.unwrap_or_default().into_iter();
    if let Some(first) = errors.next() {
        let dropped = errors.count();
        if dropped > 0 {
            debug!(dropped, "only the first GraphQL error is reported");
        }
        return Err(TrackerError::GraphQl {
            message: first.into_message(),
        });
    }

    serde_json::from_value(envelope.data).map_err(|e| TrackerError::Decode {
        message: e.to_string(),
    })
}
