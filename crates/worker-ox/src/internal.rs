use crate::{
    WorkerRequest, WorkerRequestError, WorkerResponse,
    request_builder::{RequestBuilder, RequestConfig},
    streaming::WorkerStream,
};

/// Worker client helper methods using the common RequestBuilder
pub(crate) struct WorkerRequestHelper {
    request_builder: RequestBuilder,
}

impl WorkerRequestHelper {
    /// The worker serves everything from the one URL it is deployed at.
    pub(crate) fn new(client: reqwest::Client, url: &str, api_key: &str) -> Self {
        let config = RequestConfig::new(url).with_bearer(api_key);

        Self {
            request_builder: RequestBuilder::new(client, config),
        }
    }

    pub(crate) async fn send_request(
        &self,
        request: &WorkerRequest,
    ) -> Result<WorkerResponse, WorkerRequestError> {
        self.request_builder.request_json(request).await
    }

    pub(crate) async fn stream_request(
        &self,
        request: &WorkerRequest,
    ) -> Result<WorkerStream, WorkerRequestError> {
        let response = self.request_builder.send_json(request).await?;

        Ok(WorkerStream::new(response))
    }
}
