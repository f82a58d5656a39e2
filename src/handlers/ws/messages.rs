//! WebSocket message types
//!
//! All messages are JSON with a `type` tag. The client is the physical
//! device surface: it relays recognizer fragments and audio element
//! notifications up, and executes capture/playback commands sent down.

use serde::{Deserialize, Serialize};

use crate::core::capture::FragmentAlternative;
use crate::core::orchestrator::SessionSnapshot;

pub(super) fn default_capture_supported() -> bool {
    true
}

/// Messages from the client.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    /// First message on every socket; configures the session
    #[serde(rename = "config")]
    Config {
        /// Whether the client has a speech recognizer capability
        #[serde(default = "default_capture_supported")]
        capture_supported: bool,
    },
    /// The user pressed the listen/stop control
    #[serde(rename = "toggle_listening")]
    ToggleListening,
    /// A recognizer result event
    #[serde(rename = "fragment")]
    Fragment {
        result_index: usize,
        results: Vec<FragmentAlternative>,
    },
    /// The recognizer reported an error
    #[serde(rename = "capture_error")]
    CaptureError { code: String },
    /// The recognizer ended the session on its own
    #[serde(rename = "capture_ended")]
    CaptureEnded,
    /// The audio element finished the current resource
    #[serde(rename = "playback_ended")]
    PlaybackEnded,
    /// The audio element reported a playback error
    #[serde(rename = "playback_error")]
    PlaybackError { message: String },
}

/// Messages to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    /// The session is configured and ready for input
    #[serde(rename = "ready")]
    Ready,
    /// Observable session state changed
    #[serde(rename = "state")]
    State { session: SessionSnapshot },
    /// Open a recognizer session
    #[serde(rename = "start_capture")]
    StartCapture,
    /// Close the recognizer session
    #[serde(rename = "stop_capture")]
    StopCapture,
    /// Start playing the given audio resource
    #[serde(rename = "play_audio")]
    PlayAudio {
        id: u64,
        /// Base64-encoded audio bytes
        data: String,
        content_type: String,
    },
    /// Pause playback and reset position
    #[serde(rename = "pause_audio")]
    PauseAudio,
    /// The audio resource has been reclaimed server-side
    #[serde(rename = "release_audio")]
    ReleaseAudio { id: u64 },
    /// Protocol-level error
    #[serde(rename = "error")]
    Error { message: String },
}
