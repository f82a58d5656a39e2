//! Turn state and the pure transition function.
//!
//! # State transitions
//!
//! ```text
//! [Idle] ── toggle ──► [Listening] ── silence window ──► [Dispatching]
//!    ▲                     │                                   │
//!    │      device error / │ device end / toggle               │ backend error
//!    ├─────────────────────┘                                   │
//!    ├─────────────────────────────────────────────────────────┤
//!    │                                          response audio │
//!    │                                                         ▼
//!    └──── playback error ────────────────────────────── [Playing]
//!                                                              │
//!                        natural completion ──► [Listening] ◄──┘
//! ```
//!
//! Recording and playback are mutually exclusive by policy: the listen
//! control is inert while a turn is in flight (dispatching or playing), and
//! capture only restarts once playback has settled one way or the other.
//! Errors never escalate: every failure lands back in idle with
//! `last_error` set, and the user can always re-trigger listening.

use serde::Serialize;
use tracing::debug;

use super::events::{Effect, TurnEvent};
use super::segmenter::UtteranceSegmenter;
use crate::core::assessment::{DispatchError, TurnResult};
use crate::core::capture::CaptureFragment;

/// Read-only observable session state published to the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// A capture session is open
    pub is_recording: bool,
    /// A synthesized response is playing
    pub is_playing: bool,
    /// An assessment request is in flight
    pub is_loading: bool,
    /// Live interim transcript of the current utterance
    pub transcript: String,
    /// Text of the most recent assessment
    pub last_response_text: String,
    /// Whether the most recent assessment was flagged severe
    pub is_severe: bool,
    /// Most recent collaborator error, if any
    pub last_error: Option<String>,
}

/// Full turn state: the observable snapshot plus the utterance accumulator.
#[derive(Debug, Default)]
pub struct TurnState {
    snapshot: SessionSnapshot,
    segmenter: UtteranceSegmenter,
}

impl TurnState {
    /// Create an idle turn state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.clone()
    }

    /// Apply one event and return the effects the driver must execute.
    ///
    /// This is the whole of the orchestration policy; it performs no I/O
    /// and never blocks.
    pub fn step(&mut self, event: TurnEvent) -> Vec<Effect> {
        let effects = match event {
            TurnEvent::ToggleListening => self.on_toggle(),
            TurnEvent::Fragment(fragment) => self.on_fragment(fragment),
            TurnEvent::CaptureStartFailed(message) => self.on_capture_start_failed(message),
            TurnEvent::CaptureFailed(code) => self.on_capture_failed(code),
            TurnEvent::CaptureEnded => self.on_capture_ended(),
            TurnEvent::SilenceElapsed => self.on_silence_elapsed(),
            TurnEvent::DispatchResolved(outcome) => self.on_dispatch_resolved(outcome),
            TurnEvent::PlaybackEnded => self.on_playback_ended(),
            TurnEvent::PlaybackFailed(message) => self.on_playback_failed(message),
        };

        debug_assert!(
            !(self.snapshot.is_recording && self.snapshot.is_playing),
            "recording and playback must stay mutually exclusive"
        );

        effects
    }

    /// Enter the listening state: clear the previous episode's error and
    /// accumulator, then ask the driver to open a capture session.
    ///
    /// `is_recording` is set optimistically; a failed start rolls it back
    /// via [`TurnEvent::CaptureStartFailed`].
    fn begin_listening(&mut self) -> Vec<Effect> {
        self.snapshot.last_error = None;
        self.snapshot.is_recording = true;
        self.snapshot.transcript.clear();
        self.segmenter.clear();
        vec![Effect::CancelSilenceTimer, Effect::StartCapture]
    }

    fn on_toggle(&mut self) -> Vec<Effect> {
        if self.snapshot.is_playing || self.snapshot.is_loading {
            // The listen control is inert while a response is pending or
            // playing; recording and playback stay mutually exclusive.
            debug!("Toggle rejected while a turn is in flight");
            return Vec::new();
        }

        if self.snapshot.is_recording {
            self.snapshot.is_recording = false;
            return vec![Effect::StopCapture];
        }

        self.begin_listening()
    }

    fn on_fragment(&mut self, fragment: CaptureFragment) -> Vec<Effect> {
        if !self.snapshot.is_recording {
            debug!("Dropping fragment received while not recording");
            return Vec::new();
        }

        let interim = self.segmenter.apply(&fragment);
        self.snapshot.transcript = interim.to_string();
        vec![Effect::RestartSilenceTimer]
    }

    fn on_capture_start_failed(&mut self, message: String) -> Vec<Effect> {
        self.snapshot.is_recording = false;
        self.snapshot.last_error = Some(message);
        Vec::new()
    }

    fn on_capture_failed(&mut self, code: String) -> Vec<Effect> {
        self.snapshot.is_recording = false;
        self.snapshot.last_error = Some(format!("Recognition error: {code}"));
        // No auto-retry: the user re-triggers listening manually.
        vec![Effect::StopCapture]
    }

    fn on_capture_ended(&mut self) -> Vec<Effect> {
        // The device may stop itself (network hiccup, silence limits).
        // Treated like an explicit stop; only the turn-completion path
        // restarts capture implicitly.
        debug!("Capture session ended by device");
        self.snapshot.is_recording = false;
        Vec::new()
    }

    fn on_silence_elapsed(&mut self) -> Vec<Effect> {
        let utterance = self.segmenter.finalize();
        self.snapshot.transcript.clear();

        debug!(
            "Silence window elapsed; dispatching utterance ({} chars)",
            utterance.len()
        );

        // Capture stops before the request goes out so no fragments race
        // with the pending call. Empty utterances are still dispatched.
        self.snapshot.is_loading = true;
        self.snapshot.last_error = None;
        self.snapshot.is_severe = false;
        self.snapshot.is_recording = false;

        vec![Effect::StopCapture, Effect::Dispatch(utterance)]
    }

    fn on_dispatch_resolved(&mut self, outcome: Result<TurnResult, DispatchError>) -> Vec<Effect> {
        self.snapshot.is_loading = false;

        match outcome {
            Ok(result) => {
                if !result.text.is_empty() {
                    self.snapshot.last_response_text = result.text;
                    self.snapshot.is_severe = result.severe;
                }

                match result.audio {
                    Some(bytes) => {
                        // Playback is in flight from this instant; the
                        // device start settles asynchronously and reports
                        // only failure.
                        self.snapshot.is_playing = true;
                        vec![Effect::Play(bytes)]
                    }
                    None => Vec::new(),
                }
            }
            Err(e) => {
                debug!("Dispatch failed: {e}");
                self.snapshot.last_error = Some(e.to_string());
                self.snapshot.is_playing = false;
                Vec::new()
            }
        }
    }

    fn on_playback_ended(&mut self) -> Vec<Effect> {
        if !self.snapshot.is_playing {
            debug!("Ignoring playback end while not playing");
            return Vec::new();
        }

        self.snapshot.is_playing = false;
        // Natural completion closes the loop: listening resumes without
        // user action.
        self.begin_listening()
    }

    fn on_playback_failed(&mut self, message: String) -> Vec<Effect> {
        self.snapshot.is_playing = false;
        self.snapshot.last_error = Some(message);
        // Unlike natural completion, an error ends the automatic loop.
        Vec::new()
    }
}
