//! # Voice Turn Orchestrator
//!
//! Central coordinator for the hands-free consultation loop: capture speech,
//! segment it into utterances on silence, dispatch each utterance to the
//! assessment backend, play the synthesized response, then resume listening.
//!
//! The core logic is a pure transition function over discrete events
//! ([`TurnState::step`]); the [`ConsultSession`] driver adapts device
//! notifications to events, executes the requested effects against the
//! [`SpeechCapture`], [`AssessmentBackend`], and [`AudioSink`] seams, and
//! owns every timer and playback handle. All state is session-owned; there
//! is no ambient or static state.
//!
//! [`SpeechCapture`]: crate::core::capture::SpeechCapture
//! [`AssessmentBackend`]: crate::core::assessment::AssessmentBackend
//! [`AudioSink`]: crate::core::playback::AudioSink

pub mod config;
pub mod events;
mod playback;
pub mod segmenter;
pub mod session;
pub mod state;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use config::OrchestratorConfig;
pub use events::{Effect, TurnEvent};
pub use segmenter::UtteranceSegmenter;
pub use session::{ConsultSession, SessionEvent, SessionHandle};
pub use state::{SessionSnapshot, TurnState};
