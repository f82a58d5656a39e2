//! Turn-taking flow tests: debounce timing, the full consultation loop, and
//! error recovery policies. Timing is driven on tokio's paused clock.

use bytes::Bytes;
use tokio::time::{Duration, sleep};

use crate::core::assessment::{DispatchError, TurnResult};
use crate::core::orchestrator::{OrchestratorConfig, SessionEvent, TurnEvent};

use super::helpers::{fragment, settle, spawn_session, spawn_session_with, wait_until};
use super::stubs::{SinkOp, StubBackend, StubCapture, StubSink};

fn severe_result_with_audio() -> TurnResult {
    TurnResult {
        text: "Seek care immediately".to_string(),
        severe: true,
        audio: Some(Bytes::from_static(b"mp3-bytes")),
    }
}

#[tokio::test(start_paused = true)]
async fn test_debounce_finalizes_only_after_quiet_window() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    // Fragments at t=0, 500, 1200; each restarts the 2000ms window.
    fixture.handle.send(fragment("I have")).await;
    settle().await;
    sleep(Duration::from_millis(500)).await;
    fixture.handle.send(fragment("I have chest")).await;
    settle().await;
    sleep(Duration::from_millis(700)).await;
    fixture.handle.send(fragment("I have chest pain")).await;
    settle().await;

    // t=3199: one millisecond short of the window, nothing dispatched.
    sleep(Duration::from_millis(1999)).await;
    settle().await;
    assert_eq!(fixture.backend.dispatch_count(), 0);

    // t=3201: the window from the last fragment has elapsed.
    sleep(Duration::from_millis(2)).await;
    wait_until(|| fixture.backend.dispatch_count() == 1).await;
    assert_eq!(
        fixture.backend.dispatched(),
        vec!["I have chest pain".to_string()]
    );

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_late_fragment_resets_the_window() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture.handle.send(fragment("I feel")).await;
    settle().await;

    // A fragment at t=1900 pushes finalization from 2000 out to 3900.
    sleep(Duration::from_millis(1900)).await;
    fixture.handle.send(fragment("I feel dizzy")).await;
    settle().await;

    sleep(Duration::from_millis(1999)).await;
    settle().await;
    assert_eq!(fixture.backend.dispatch_count(), 0);

    sleep(Duration::from_millis(2)).await;
    wait_until(|| fixture.backend.dispatch_count() == 1).await;
    assert_eq!(fixture.backend.dispatched(), vec!["I feel dizzy".to_string()]);

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_full_turn_loop_resumes_capture_after_playback() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.backend.script(Ok(severe_result_with_audio()));

    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture.handle.send(fragment("I have")).await;
    settle().await;
    sleep(Duration::from_millis(300)).await;
    fixture.handle.send(fragment("I have chest")).await;
    settle().await;
    sleep(Duration::from_millis(400)).await;
    fixture.handle.send(fragment("I have chest pain")).await;
    settle().await;

    // Window from the last fragment (t=700) expires at t=2700.
    sleep(Duration::from_millis(2001)).await;
    wait_until(|| fixture.backend.dispatch_count() == 1).await;
    assert_eq!(
        fixture.backend.dispatched(),
        vec!["I have chest pain".to_string()]
    );

    // The severe assessment comes back with audio and playback starts.
    let snapshots = fixture.handle.snapshots();
    wait_until(|| snapshots.borrow().is_playing).await;

    let snapshot = snapshots.borrow().clone();
    assert!(snapshot.is_severe);
    assert!(!snapshot.is_recording);
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.last_response_text, "Seek care immediately");
    wait_until(|| {
        fixture
            .sink
            .ops()
            .iter()
            .any(|op| matches!(op, SinkOp::Play(_)))
    })
    .await;

    // Natural completion closes the loop: listening resumes on its own.
    fixture
        .handle
        .send(SessionEvent::Turn(TurnEvent::PlaybackEnded))
        .await;
    wait_until(|| fixture.capture.starts() == 2).await;

    let snapshot = snapshots.borrow().clone();
    assert!(snapshot.is_recording);
    assert!(!snapshot.is_playing);

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_whitespace_utterance_is_still_dispatched() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture.handle.send(fragment("   ")).await;
    settle().await;

    sleep(Duration::from_millis(2001)).await;
    wait_until(|| fixture.backend.dispatch_count() == 1).await;
    assert_eq!(fixture.backend.dispatched(), vec!["   ".to_string()]);

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_error_reports_and_does_not_resume() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.backend.script(Err(DispatchError::Status(500)));

    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture.handle.send(fragment("hello")).await;
    settle().await;
    sleep(Duration::from_millis(2001)).await;

    let snapshots = fixture.handle.snapshots();
    wait_until(|| snapshots.borrow().last_error.is_some()).await;

    let snapshot = snapshots.borrow().clone();
    assert!(!snapshot.is_loading);
    assert!(!snapshot.is_recording);
    assert!(!snapshot.is_playing);
    // No automatic restart after a failed dispatch.
    assert_eq!(fixture.capture.starts(), 1);

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_capture_surfaces_error_and_stays_idle() {
    let (capture, calls) = StubCapture::unsupported();
    let fixture = spawn_session_with(
        OrchestratorConfig::default(),
        capture,
        calls,
        StubBackend::new(),
        StubSink::new(),
    );

    fixture.handle.toggle_listening().await;

    let snapshots = fixture.handle.snapshots();
    wait_until(|| snapshots.borrow().last_error.is_some()).await;

    let snapshot = snapshots.borrow().clone();
    assert!(!snapshot.is_recording);
    assert!(
        snapshot
            .last_error
            .as_deref()
            .unwrap()
            .contains("not supported")
    );
    assert_eq!(fixture.capture.starts(), 0);

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_toggle_stops_an_open_capture_session() {
    let fixture = spawn_session(OrchestratorConfig::default());
    let snapshots = fixture.handle.snapshots();

    fixture.handle.toggle_listening().await;
    wait_until(|| snapshots.borrow().is_recording).await;
    assert_eq!(fixture.capture.starts(), 1);

    fixture.handle.toggle_listening().await;
    wait_until(|| !snapshots.borrow().is_recording).await;
    assert!(fixture.capture.stops() >= 1);

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_device_error_recovers_to_idle_without_retry() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture
        .handle
        .send(SessionEvent::Turn(TurnEvent::CaptureFailed(
            "network".to_string(),
        )))
        .await;

    let snapshots = fixture.handle.snapshots();
    wait_until(|| snapshots.borrow().last_error.is_some()).await;

    let snapshot = snapshots.borrow().clone();
    assert!(!snapshot.is_recording);
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some("Recognition error: network")
    );
    // Manual restart only.
    assert_eq!(fixture.capture.starts(), 1);

    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unsolicited_device_end_does_not_restart() {
    let fixture = spawn_session(OrchestratorConfig::default());
    fixture.handle.toggle_listening().await;
    wait_until(|| fixture.capture.starts() == 1).await;

    fixture
        .handle
        .send(SessionEvent::Turn(TurnEvent::CaptureEnded))
        .await;

    let snapshots = fixture.handle.snapshots();
    wait_until(|| !snapshots.borrow().is_recording).await;

    assert!(snapshots.borrow().last_error.is_none());
    assert_eq!(fixture.capture.starts(), 1);

    fixture.handle.shutdown().await;
}
