use reqwest::{RequestBuilder as ReqwestRequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::error::{self, WorkerRequestError};

/// Configuration for request building
#[derive(Clone)]
pub struct RequestConfig {
    /// Full endpoint URL, used exactly as given.
    pub url: String,
    pub bearer_token: Option<String>,
}

impl RequestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer_token: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestConfig")
            .field("url", &self.url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Builds and sends the JSON POST requests the worker accepts
pub struct RequestBuilder {
    client: reqwest::Client,
    config: RequestConfig,
}

impl RequestBuilder {
    pub fn new(client: reqwest::Client, config: RequestConfig) -> Self {
        Self { client, config }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Build a JSON POST to the configured URL
    pub fn build_request(&self) -> ReqwestRequestBuilder {
        let mut req = self.client.post(&self.config.url);

        if let Some(ref token) = self.config.bearer_token {
            req = req.bearer_auth(token);
        }

        req.header("content-type", "application/json")
    }

    /// Send a JSON body and return the response once its status is known to be a success.
    ///
    /// The body is not read on success, so the caller may still stream it.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<Response, WorkerRequestError> {
        let payload = serde_json::to_vec(body)?;
        log::debug!("POST {} ({} byte body)", self.url(), payload.len());

        let res = self.build_request().body(payload).send().await?;
        Self::check_status(res).await
    }

    /// Send a JSON body and deserialize the JSON reply.
    pub async fn request_json<T: for<'de> Deserialize<'de>, B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<T, WorkerRequestError> {
        let res = self.send_json(body).await?;
        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(res: Response) -> Result<Response, WorkerRequestError> {
        let status = res.status();
        match res.error_for_status_ref().map(|_| ()) {
            Ok(()) => Ok(res),
            Err(source) => {
                log::debug!("worker answered {status}");
                let bytes = res.bytes().await?;
                Err(error::parse_error_response(status, source, &bytes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_url(url: &str) -> String {
        RequestBuilder::new(reqwest::Client::new(), RequestConfig::new(url))
            .build_request()
            .build()
            .unwrap()
            .url()
            .to_string()
    }

    #[test]
    fn test_url_is_used_as_configured() {
        assert_eq!(
            built_url("https://your-worker-domain.com/"),
            "https://your-worker-domain.com/"
        );
        assert_eq!(built_url("https://host/chat"), "https://host/chat");
        assert_eq!(built_url("https://host/?v=1"), "https://host/?v=1");
    }

    #[test]
    fn test_build_request_sets_headers() {
        let builder = RequestBuilder::new(
            reqwest::Client::new(),
            RequestConfig::new("https://example.com").with_bearer("secret"),
        );

        let request = builder.build_request().build().unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        let headers = request.headers();
        assert_eq!(headers["authorization"], "Bearer secret");
        assert_eq!(headers["content-type"], "application/json");
    }

    #[test]
    fn test_config_debug_is_redacted() {
        let config = RequestConfig::new("https://example.com").with_bearer("secret");
        assert!(!format!("{config:?}").contains("secret"));
    }
}
