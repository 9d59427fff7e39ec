use crate::api::transport::Transport;
use crate::api::{ChatPayload, ChatReply};
use crate::core::error::ClientError;
use crate::core::version::{VersionRouter, VersionToken};
use crate::utils::url::{construct_api_url, normalize_base_url};
use std::sync::Arc;
use tracing::{debug, warn};

/// One submit action. Built fresh each time and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub prompt: String,
    pub model: String,
    /// Order carries no meaning; the backend treats it as a set.
    pub selected_library_ids: Vec<i64>,
    pub version: VersionToken,
}

impl SubmissionRequest {
    /// Wire body for this request's strategy. Plain never carries library
    /// ids; every grounding strategy always does, even when empty.
    pub fn payload(&self) -> ChatPayload<'_> {
        ChatPayload {
            prompt: &self.prompt,
            model: &self.model,
            selected_libraries: self
                .version
                .supports_grounding()
                .then_some(self.selected_library_ids.as_slice()),
        }
    }
}

/// Routes submissions to the strategy endpoint and classifies the outcome.
///
/// There are no retries, no timeout and no cancellation: one call, one
/// request, one result.
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, version: VersionToken) -> String {
        construct_api_url(&self.base_url, VersionRouter::resolve(version))
    }

    /// The backend's answer text, or a classified error.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<String, ClientError> {
        self.submit_detailed(request).await.map(|reply| reply.response)
    }

    /// Like [`Self::submit`] but keeps the intermediate analysis the
    /// two-stage strategies return.
    pub async fn submit_detailed(
        &self,
        request: &SubmissionRequest,
    ) -> Result<ChatReply, ClientError> {
        let url = self.endpoint_url(request.version);
        let body = serde_json::to_value(request.payload())
            .map_err(|err| ClientError::Unknown(err.to_string()))?;

        debug!(
            url = %url,
            model = %request.model,
            strategy = %request.version,
            libraries = ?request.selected_library_ids,
            "Dispatching submission"
        );

        let result = match self.transport.post(&url, &body).await {
            Ok(response) => serde_json::from_value::<ChatReply>(response.json)
                .map_err(|err| ClientError::unexpected_payload("chat", err)),
            Err(err) => Err(ClientError::from(err)),
        };

        if let Err(err) = &result {
            warn!(strategy = %request.version, kind = ?err.kind(), error = %err, "Submission failed");
        }
        result
    }
}
