#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Client for Cloudflare-style AI workers.
//!
//! A worker answers `POST` on the one URL it is deployed at, guarded by a bearer
//! token. It runs a text model, or a vision model when the request carries an
//! image, and answers either with one JSON object or with a `text/event-stream`
//! body. The URL is used exactly as configured, path and query included.
//!
//! ```rust,no_run
//! use worker_ox::{Worker, WorkerRequest};
//!
//! # async fn run() -> Result<(), worker_ox::WorkerRequestError> {
//! let worker = Worker::new("https://your-worker-domain.com/", "YOUR_API_KEY_HERE");
//! let request = WorkerRequest::builder()
//!     .prompt("Describe a futuristic city at sunset")
//!     .system_prompt("You are a helpful AI assistant.")
//!     .build();
//!
//! let response = worker.send(&request).await?;
//! println!("{:?}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod data_uri;
pub mod error;
mod internal;
pub mod request;
pub mod request_builder;
pub mod response;
pub mod streaming;

// Re-export main types
pub use error::WorkerRequestError;
pub use request::{HistoryMessage, Role, WorkerRequest};
pub use response::{StreamChunk, WorkerResponse};
pub use streaming::WorkerStream;
pub use reqwest::StatusCode;

use bon::Builder;
use core::fmt;

use crate::internal::WorkerRequestHelper;

#[derive(Clone, Builder)]
pub struct Worker {
    #[builder(into)]
    pub(crate) base_url: String,
    #[builder(into)]
    pub(crate) api_key: String,
    #[builder(default)]
    pub(crate) client: reqwest::Client,
}

impl Worker {
    /// Create a new client for the worker at `base_url`, which is posted to as-is.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Read `WORKER_API_URL` and `WORKER_API_KEY`.
    pub fn load_from_env() -> Result<Self, std::env::VarError> {
        let base_url = std::env::var("WORKER_API_URL")?;
        let api_key = std::env::var("WORKER_API_KEY")?;
        Ok(Self::builder().base_url(base_url).api_key(api_key).build())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create request helper for internal use
    fn request_helper(&self) -> WorkerRequestHelper {
        WorkerRequestHelper::new(self.client.clone(), &self.base_url, &self.api_key)
    }
}

impl Worker {
    /// Send the request with `stream: false` and read the whole JSON reply.
    pub async fn send(&self, request: &WorkerRequest) -> Result<WorkerResponse, WorkerRequestError> {
        if request.stream {
            let mut request = request.clone();
            request.stream = false;
            return self.request_helper().send_request(&request).await;
        }

        self.request_helper().send_request(request).await
    }

    /// Send the request with `stream: true`.
    ///
    /// Fails before yielding anything if the worker answers with an error status.
    pub async fn stream(&self, request: &WorkerRequest) -> Result<WorkerStream, WorkerRequestError> {
        if request.stream {
            return self.request_helper().stream_request(request).await;
        }

        let mut request = request.clone();
        request.stream = true;
        self.request_helper().stream_request(&request).await
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("client", &self.client)
            .finish()
    }
}
