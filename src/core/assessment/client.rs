use std::time::Duration;

use tracing::debug;

use super::types::{
    AssessmentBackend, AssessmentRequest, AssessmentResponse, DispatchError, TurnResult,
};

/// HTTP client for the assessment backend.
///
/// Posts `{"message": <utterance>}` to the configured endpoint and maps the
/// structured response into a [`TurnResult`]. Exactly one attempt per call:
/// a network failure or non-2xx status surfaces directly as a
/// [`DispatchError`] with no retry at this layer.
pub struct HttpAssessmentClient {
    client: reqwest::Client,
    url: String,
}

impl HttpAssessmentClient {
    /// Create a client for the given endpoint.
    ///
    /// # Arguments
    /// * `url` - Assessment backend endpoint
    /// * `timeout` - Per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Network(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl AssessmentBackend for HttpAssessmentClient {
    async fn assess(&self, utterance: &str) -> Result<TurnResult, DispatchError> {
        debug!("Dispatching utterance ({} chars) to backend", utterance.len());

        let response = self
            .client
            .post(&self.url)
            .json(&AssessmentRequest { message: utterance })
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }

        let body: AssessmentResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::Malformed(e.to_string()))?;

        body.try_into()
    }
}
