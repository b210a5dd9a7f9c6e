use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::data_uri;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Prior conversation turn, inserted between the system prompt and the prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Body of a `POST /` to the worker.
///
/// Only `prompt`, `systemPrompt` and `stream` are always sent. The worker switches
/// to its vision model whenever `image` is present.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(builder_type(vis = "pub"), state_mod(vis = "pub"))]
pub struct WorkerRequest {
    #[builder(field)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryMessage>,
    #[builder(into)]
    pub prompt: String,
    #[builder(into)]
    #[serde(rename = "systemPrompt")]
    pub system_prompt: String,
    #[builder(default)]
    pub stream: bool,
    /// Data URI, see [`data_uri`].
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl<S: worker_request_builder::State> WorkerRequestBuilder<S> {
    pub fn history(mut self, messages: impl IntoIterator<Item = HistoryMessage>) -> Self {
        self.history = messages.into_iter().collect();
        self
    }

    pub fn history_message(mut self, message: HistoryMessage) -> Self {
        self.history.push(message);
        self
    }
}

impl WorkerRequest {
    /// Attach raw JPEG bytes as the `image` field.
    pub fn with_jpeg(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.image = Some(data_uri::encode(data_uri::JPEG_MEDIA_TYPE, bytes));
        self
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_body_has_exactly_three_keys() {
        let request = WorkerRequest::builder()
            .prompt("Describe a futuristic city at sunset")
            .system_prompt("You are a helpful AI assistant.")
            .build();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "prompt": "Describe a futuristic city at sunset",
                "systemPrompt": "You are a helpful AI assistant.",
                "stream": false,
            })
        );
        assert!(value.get("image").is_none());
    }

    #[test]
    fn test_with_jpeg_sets_data_uri() {
        let request = WorkerRequest::builder()
            .prompt("what is this?")
            .system_prompt("")
            .build()
            .with_jpeg([1u8, 2, 3]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["image"], "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_optional_parameters_serialize_with_worker_names() {
        let request = WorkerRequest::builder()
            .prompt("hi")
            .system_prompt("sys")
            .stream(true)
            .temperature(0.2)
            .top_p(0.5)
            .max_tokens(128)
            .history_message(HistoryMessage::user("earlier"))
            .history_message(HistoryMessage::assistant("reply"))
            .build();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], true);
        assert_eq!(value["max_tokens"], 128);
        assert!(value.get("top_p").is_some());
        assert_eq!(
            value["history"],
            json!([
                {"role": "user", "content": "earlier"},
                {"role": "assistant", "content": "reply"},
            ])
        );
    }

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!("system".parse::<Role>().unwrap(), Role::System);
    }
}
