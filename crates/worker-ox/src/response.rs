use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{data_uri, error::value_to_text};

/// Non-streaming reply from the worker.
///
/// The worker usually answers with a string `response`, but forwards the raw model
/// output when it doesn't recognise its shape, so `response` is kept as a value.
/// `error` and `details` are informational on a success status and may hold any JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkerResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl WorkerResponse {
    /// The `response` field as text. Non-string values are rendered as JSON.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self.response.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(value_to_text(other))),
        }
    }

    /// The `response` string if it carries image data.
    pub fn image_data_uri(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(Value::as_str)
            .filter(|text| data_uri::contains_image(text))
    }

    /// Decode the image carried in `response`, if any.
    pub fn decode_image(&self) -> Option<Result<Vec<u8>, data_uri::DataUriError>> {
        self.image_data_uri().map(data_uri::decode)
    }
}

/// One token event from a streaming reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamChunk {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

impl StreamChunk {
    pub fn text(&self) -> &str {
        self.response.as_deref().unwrap_or_default()
    }
}
