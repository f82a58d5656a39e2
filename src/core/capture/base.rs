/// One recognized alternative inside a fragment event.
///
/// The capture device may report several results per event; each carries the
/// transcript text for its slot.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FragmentAlternative {
    /// The transcribed text for this result slot
    pub transcript: String,
}

/// One transcript fragment event from the capture device.
///
/// `result_index` is monotonically non-decreasing across a capture session;
/// `results` holds every result from that index to the end of the device's
/// current result list, so each event carries the full current-best tail of
/// the transcript rather than a delta.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFragment {
    /// Index of the first result carried by this event
    pub result_index: usize,
    /// Ordered results from `result_index` to the end of the result list
    pub results: Vec<FragmentAlternative>,
}

impl CaptureFragment {
    /// Create a fragment event from plain transcript strings.
    pub fn new(result_index: usize, transcripts: impl IntoIterator<Item = String>) -> Self {
        Self {
            result_index,
            results: transcripts
                .into_iter()
                .map(|transcript| FragmentAlternative { transcript })
                .collect(),
        }
    }
}

/// Error types for speech capture operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("speech capture is not supported by this client")]
    Unsupported,
    #[error("speech capture device error: {0}")]
    Device(String),
}

/// Control surface for a speech capture device.
///
/// Implementations open and close recognition sessions on the underlying
/// device. Fragment, error, and end notifications do not flow through this
/// trait: the device adapter forwards them into the session's event channel,
/// so the orchestrator consumes them as [`TurnEvent`]s in receipt order.
///
/// [`TurnEvent`]: crate::core::orchestrator::TurnEvent
#[async_trait::async_trait]
pub trait SpeechCapture: Send {
    /// Open a new capture session on the device.
    ///
    /// # Returns
    /// * `Result<(), CaptureError>` - `Unsupported` when the client has no
    ///   recognizer capability; `Device` when the session could not be opened
    async fn start(&mut self) -> Result<(), CaptureError>;

    /// Close any open capture session. Idempotent; safe when not recording.
    async fn stop(&mut self) -> Result<(), CaptureError>;
}
