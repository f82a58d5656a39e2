//! Assessment backend seam
//!
//! One finalized utterance goes out, one structured triage assessment comes
//! back: response text, a severity flag, and optionally synthesized speech
//! for the response. The backend's internal pipeline is not this crate's
//! concern; [`HttpAssessmentClient`] is the production implementation of the
//! [`AssessmentBackend`] trait.

mod client;
mod types;

pub use client::HttpAssessmentClient;
pub use types::{
    AUDIO_MP3, AssessmentBackend, AssessmentResponse, AudioPayload, DispatchError, TurnResult,
};
