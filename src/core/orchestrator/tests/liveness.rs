//! Teardown and liveness guard tests.
//!
//! Once teardown begins no session state may change, while in-flight
//! backend requests still run to completion on the collaborator side.

use tokio::time::{Duration, sleep};

use crate::core::orchestrator::OrchestratorConfig;

use super::helpers::{fragment, settle, spawn_session, spawn_session_with, wait_until};
use super::stubs::{SinkOp, StubBackend, StubCapture, StubSink};

#[tokio::test(start_paused = true)]
async fn test_teardown_mid_dispatch_mutates_nothing() {
    let (backend, gate) = StubBackend::gated();
    let (capture, calls) = StubCapture::new();
    let sink = StubSink::new();
    let fixture = spawn_session_with(
        OrchestratorConfig::default(),
        capture,
        calls,
        backend,
        sink,
    );

    let snapshots = fixture.handle.snapshots();

    fixture.handle.toggle_listening().await;
    fixture.handle.send(fragment("I feel faint")).await;
    settle().await;
    sleep(Duration::from_millis(2001)).await;
    wait_until(|| fixture.backend.dispatch_count() == 1).await;
    settle().await;

    let before = snapshots.borrow().clone();
    assert!(before.is_loading);

    // Teardown begins while the request is still held by the gate.
    fixture.handle.shutdown().await;

    // The request runs to completion on the backend side...
    gate.notify_one();
    wait_until(|| fixture.backend.resolved_count() == 1).await;
    settle().await;

    // ...but its resolution is a no-op: observable state never changed.
    assert_eq!(*snapshots.borrow(), before);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_silence_window() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture.handle.send(fragment("never dispatched")).await;
    settle().await;

    fixture.handle.shutdown().await;

    // Even well past the window, the cancelled timer finalizes nothing.
    sleep(Duration::from_millis(5000)).await;
    settle().await;
    assert_eq!(fixture.backend.dispatch_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_quiesces_capture_and_audio_context() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture.handle.shutdown().await;

    // Capture was closed and the audio context shut down last.
    assert!(fixture.capture.stops() >= 1);
    let ops = fixture.sink.ops();
    assert_eq!(ops.last(), Some(&SinkOp::Close));
    assert!(ops.contains(&SinkOp::Pause));
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_channel_closes_after_teardown() {
    let fixture = spawn_session(OrchestratorConfig::default());
    let snapshots = fixture.handle.snapshots();

    fixture.handle.shutdown().await;

    assert!(snapshots.has_changed().is_err());
}
