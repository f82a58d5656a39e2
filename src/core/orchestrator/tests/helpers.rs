//! Shared test helpers for orchestrator tests.

use std::sync::Arc;

use crate::core::assessment::AssessmentBackend;
use crate::core::capture::CaptureFragment;
use crate::core::orchestrator::{
    ConsultSession, OrchestratorConfig, SessionEvent, SessionHandle, TurnEvent,
};
use crate::core::playback::AudioSink;

use super::stubs::{CaptureCalls, StubBackend, StubCapture, StubSink};

/// A spawned session plus handles to every stub behind it.
pub struct SessionFixture {
    pub handle: SessionHandle,
    pub capture: Arc<CaptureCalls>,
    pub backend: Arc<StubBackend>,
    pub sink: Arc<StubSink>,
}

/// Spawn a session over fresh stubs with the given config.
pub fn spawn_session(config: OrchestratorConfig) -> SessionFixture {
    let (capture, calls) = StubCapture::new();
    let backend = StubBackend::new();
    let sink = StubSink::new();
    spawn_session_with(config, capture, calls, backend, sink)
}

/// Spawn a session over caller-provided stubs.
pub fn spawn_session_with(
    config: OrchestratorConfig,
    capture: StubCapture,
    calls: Arc<CaptureCalls>,
    backend: Arc<StubBackend>,
    sink: Arc<StubSink>,
) -> SessionFixture {
    let handle = ConsultSession::spawn(
        config,
        Box::new(capture),
        Arc::clone(&backend) as Arc<dyn AssessmentBackend>,
        Arc::clone(&sink) as Arc<dyn AudioSink>,
    );

    SessionFixture {
        handle,
        capture: calls,
        backend,
        sink,
    }
}

/// A fragment event carrying one full interim transcript.
pub fn fragment(text: &str) -> SessionEvent {
    SessionEvent::Turn(TurnEvent::Fragment(CaptureFragment::new(
        0,
        [text.to_string()],
    )))
}

/// Let every ready task run without advancing the (possibly paused) clock.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

/// Yield until the condition holds; panics if it never does.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after 1000 yields");
}
