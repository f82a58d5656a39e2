//! Core voice-turn processing
//!
//! The [`orchestrator`] module carries the turn-taking state machine; the
//! [`capture`], [`assessment`], and [`playback`] modules define the device
//! and backend seams it drives.

pub mod assessment;
pub mod capture;
pub mod orchestrator;
pub mod playback;

pub use assessment::{AssessmentBackend, DispatchError, HttpAssessmentClient, TurnResult};
pub use capture::{CaptureError, CaptureFragment, FragmentAlternative, SpeechCapture};
pub use orchestrator::{
    ConsultSession, OrchestratorConfig, SessionEvent, SessionHandle, SessionSnapshot, TurnEvent,
};
pub use playback::{AudioHandle, AudioSink, PlaybackError};
