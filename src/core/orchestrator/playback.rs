//! Playback lifecycle management.
//!
//! Starting a response while a previous one is still settling its start is
//! the most hazard-prone path in the session: two starts racing on the same
//! device can double-acquire it or leak a loaded resource. The slot mutex
//! below is the single-slot pending-start gate: whoever holds it owns the
//! device until their start has settled, so a later `start` (or teardown)
//! always waits for settlement before touching the device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::playback::{AudioHandle, AudioSink};

use super::session::SessionEvent;

/// The single playback resource slot.
///
/// Holds the one live [`AudioHandle`]; taking it out is the only way to
/// release it, which keeps release exactly-once even across supersession.
#[derive(Debug, Default)]
pub(super) struct PlaybackSlot {
    pub(super) current: Option<AudioHandle>,
}

/// Manages one audio-response playback at a time against the sink.
pub(super) struct PlaybackController {
    sink: Arc<dyn AudioSink>,
    slot: Arc<Mutex<PlaybackSlot>>,
    alive: Arc<AtomicBool>,
}

impl PlaybackController {
    pub(super) fn new(sink: Arc<dyn AudioSink>, alive: Arc<AtomicBool>) -> Self {
        Self {
            sink,
            slot: Arc::new(Mutex::new(PlaybackSlot::default())),
            alive,
        }
    }

    /// Begin playing a new audio payload, superseding whatever the device
    /// currently holds.
    ///
    /// Runs as its own task so the session loop stays responsive while the
    /// start settles. A failed settlement is reported back through the
    /// event channel as `PlaybackFailed`, tagged with `generation` so a
    /// post-teardown settlement is dropped by the driver.
    pub(super) fn start(
        &self,
        bytes: Bytes,
        events: mpsc::WeakSender<SessionEvent>,
        generation: u64,
    ) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        let slot = Arc::clone(&self.slot);
        let alive = Arc::clone(&self.alive);

        tokio::spawn(async move {
            // Await settlement of any previous start before proceeding.
            let mut guard = slot.lock().await;

            // Supersede: stop the device, reclaim the previous resource.
            sink.pause().await;
            if let Some(previous) = guard.current.take() {
                sink.release(previous).await;
            }

            let handle = match sink.load(bytes).await {
                Ok(handle) => handle,
                Err(e) => {
                    warn!("Audio decode failed: {e}");
                    drop(guard);
                    send(&events, SessionEvent::PlaybackFailed {
                        generation,
                        message: e.to_string(),
                    })
                    .await;
                    return;
                }
            };

            // The session may have torn down across the decode suspension;
            // reclaim the fresh resource and leave state untouched.
            if !alive.load(Ordering::Acquire) {
                debug!("Session tore down during playback start; releasing fresh handle");
                sink.release(handle).await;
                return;
            }

            let started = sink.play(&handle).await;
            guard.current = Some(handle);
            // The start has settled; open the gate before reporting.
            drop(guard);

            match started {
                Ok(()) => {
                    debug!("Playback started");
                }
                Err(e) => {
                    warn!("Audio playback failed to start: {e}");
                    send(&events, SessionEvent::PlaybackFailed {
                        generation,
                        message: e.to_string(),
                    })
                    .await;
                }
            }
        })
    }

    /// Await settlement of any in-flight start and take exclusive hold of
    /// the slot. Teardown acquires the slot this way first.
    pub(super) async fn settle(&self) -> OwnedMutexGuard<PlaybackSlot> {
        Arc::clone(&self.slot).lock_owned().await
    }

    /// Quiesce the device: pause, reclaim the current resource, close the
    /// audio context. Every step is best-effort.
    pub(super) async fn shutdown(&self, slot: &mut PlaybackSlot) {
        self.sink.pause().await;
        if let Some(handle) = slot.current.take() {
            self.sink.release(handle).await;
        }
        self.sink.close().await;
    }
}

async fn send(events: &mpsc::WeakSender<SessionEvent>, event: SessionEvent) {
    if let Some(events) = events.upgrade() {
        let _ = events.send(event).await;
    }
}
