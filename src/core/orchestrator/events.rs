//! Events and effects of the turn state machine.
//!
//! Device callbacks are re-expressed as discrete [`TurnEvent`]s so the core
//! logic is a transition function over `(state, event)`, testable without
//! real audio or speech devices. Transitions request [`Effect`]s; the
//! session driver executes them against the device seams.

use bytes::Bytes;

use crate::core::assessment::{DispatchError, TurnResult};
use crate::core::capture::CaptureFragment;

/// Discrete inputs driving the turn state machine.
#[derive(Debug)]
pub enum TurnEvent {
    /// The user pressed the listen/stop control
    ToggleListening,
    /// The capture device produced a transcript fragment
    Fragment(CaptureFragment),
    /// A requested capture start could not open a session
    CaptureStartFailed(String),
    /// The capture device reported an error mid-session
    CaptureFailed(String),
    /// The capture device ended the session on its own
    CaptureEnded,
    /// The inactivity window elapsed without a new fragment
    SilenceElapsed,
    /// The assessment request resolved
    DispatchResolved(Result<TurnResult, DispatchError>),
    /// The playback device finished the current resource
    PlaybackEnded,
    /// Playback failed to start or the device reported an error
    PlaybackFailed(String),
}

/// Side effects requested by a transition, executed by the session driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open a new capture session
    StartCapture,
    /// Close any open capture session (idempotent)
    StopCapture,
    /// Cancel and re-arm the inactivity timer
    RestartSilenceTimer,
    /// Cancel any armed inactivity timer
    CancelSilenceTimer,
    /// Send the finalized utterance to the assessment backend
    Dispatch(String),
    /// Play a synthesized audio response, superseding any current playback
    Play(Bytes),
}
