use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::data_uri::DataUriError;

/// Error body returned by the worker, e.g. `{"success": false, "error": "Unauthorized"}`.
///
/// Any JSON object counts; both fields may be missing or `null`.
#[derive(Debug, Deserialize)]
struct WorkerApiErrorPayload {
    error: Option<Value>,
    details: Option<Value>,
}

/// Errors that can occur when talking to an AI worker
#[derive(Debug, Error)]
pub enum WorkerRequestError {
    /// Transport failure (DNS, connect, TLS, broken body)
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    /// Error status with a structured worker error body
    #[error("worker returned HTTP {status}: {message}", message = display_api_error(.error.as_deref(), .details.as_deref()))]
    Api {
        status: reqwest::StatusCode,
        error: Option<String>,
        details: Option<String>,
    },

    /// Error status whose body is not a worker error payload
    #[error("{source}")]
    Http {
        #[source]
        source: reqwest::Error,
        body: String,
    },

    /// Stream line that could not be decoded
    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    /// Malformed data URI
    #[error(transparent)]
    DataUri(#[from] DataUriError),
}

impl WorkerRequestError {
    /// HTTP status of the failed request, if the worker answered at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status(),
            Self::ReqwestError(e) => e.status(),
            _ => None,
        }
    }
}

/// `<error> - <details>`, with `None` standing in for a missing field.
fn display_api_error(error: Option<&str>, details: Option<&str>) -> String {
    format!(
        "{} - {}",
        error.unwrap_or("None"),
        details.unwrap_or("None")
    )
}

/// Render a JSON value the way it reads in a message: strings verbatim, anything else as JSON.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse an error response from the worker.
///
/// `source` is the status error produced by `reqwest` for the same response; it
/// becomes the fallback when the body is not a JSON object.
pub(crate) fn parse_error_response(
    status: reqwest::StatusCode,
    source: reqwest::Error,
    bytes: &bytes::Bytes,
) -> WorkerRequestError {
    let payload = serde_json::from_slice::<Value>(bytes)
        .ok()
        .filter(Value::is_object)
        .and_then(|value| serde_json::from_value::<WorkerApiErrorPayload>(value).ok());

    if let Some(WorkerApiErrorPayload { error, details }) = payload {
        return WorkerRequestError::Api {
            status,
            error: error.as_ref().map(value_to_text),
            details: details.as_ref().map(value_to_text),
        };
    }

    WorkerRequestError::Http {
        source,
        body: String::from_utf8_lossy(bytes).into_owned(),
    }
}
