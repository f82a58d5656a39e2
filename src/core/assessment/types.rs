use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The only audio encoding the playback path accepts.
pub const AUDIO_MP3: &str = "audio/mp3";

/// Result of one completed dispatch. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    /// Assessment text to surface to the user
    pub text: String,
    /// Whether the backend flagged the situation as requiring immediate care
    pub severe: bool,
    /// Synthesized speech for the assessment, when the backend provided it
    pub audio: Option<Bytes>,
}

/// Error types for dispatch operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    #[error("assessment request failed: {0}")]
    Network(String),
    #[error("assessment backend returned status {0}")]
    Status(u16),
    #[error("malformed assessment response: {0}")]
    Malformed(String),
}

/// Request body for one assessment call.
#[derive(Debug, Serialize)]
pub struct AssessmentRequest<'a> {
    pub message: &'a str,
}

/// Synthesized audio attached to an assessment response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioPayload {
    /// Base64-encoded audio bytes
    pub data: String,
    /// MIME type of the encoded audio
    #[serde(rename = "contentType")]
    pub content_type: String,
}

/// Wire shape of the assessment backend's response body.
///
/// The severity flag is a string `"true"`/`"false"`, not a boolean; anything
/// other than `"true"` reads as not severe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssessmentResponse {
    pub result: String,
    pub is_severe: String,
    #[serde(default)]
    pub audio: Option<AudioPayload>,
}

impl TryFrom<AssessmentResponse> for TurnResult {
    type Error = DispatchError;

    fn try_from(response: AssessmentResponse) -> Result<Self, Self::Error> {
        // Audio is only played when the backend says it is mp3; other
        // encodings are dropped while the text response still surfaces.
        let audio = match response.audio {
            Some(payload) if payload.content_type == AUDIO_MP3 => {
                let decoded = BASE64
                    .decode(payload.data.as_bytes())
                    .map_err(|e| DispatchError::Malformed(format!("invalid audio base64: {e}")))?;
                Some(Bytes::from(decoded))
            }
            _ => None,
        };

        Ok(TurnResult {
            text: response.result,
            severe: response.is_severe == "true",
            audio,
        })
    }
}

/// One request per finalized utterance; one awaited response, no retries.
#[async_trait::async_trait]
pub trait AssessmentBackend: Send + Sync {
    /// Submit one utterance for assessment.
    async fn assess(&self, utterance: &str) -> Result<TurnResult, DispatchError>;
}
