//! The consultation session driver.
//!
//! One [`ConsultSession`] runs per connected client as a single task that
//! drains an event channel. Device adapters and spawned continuations feed
//! the channel; the driver filters stale continuations, applies the pure
//! transition function, executes the resulting effects, and publishes
//! snapshots. Because every state mutation happens on this one task, the
//! session needs no locks beyond the playback start gate.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::core::assessment::{AssessmentBackend, DispatchError, TurnResult};
use crate::core::capture::SpeechCapture;
use crate::core::playback::AudioSink;

use super::config::OrchestratorConfig;
use super::events::{Effect, TurnEvent};
use super::playback::PlaybackController;
use super::state::{SessionSnapshot, TurnState};

/// Buffered events per session; fragment bursts stay well under this.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Driver-level events for one consultation session.
///
/// External notifications arrive as plain [`TurnEvent`]s. Resolutions of
/// operations the driver itself suspended carry the generation captured at
/// spawn, so a continuation that outlived its session epoch is dropped
/// before it can touch state.
#[derive(Debug)]
pub enum SessionEvent {
    /// An external input or device notification
    Turn(TurnEvent),
    /// The inactivity window elapsed without a new fragment
    SilenceElapsed { generation: u64 },
    /// The in-flight assessment request resolved
    DispatchResolved {
        generation: u64,
        outcome: Result<TurnResult, DispatchError>,
    },
    /// A playback start failed to settle
    PlaybackFailed { generation: u64, message: String },
    /// Tear the session down
    Shutdown,
}

/// Outcome of driver-level event filtering.
enum Accepted {
    Turn(TurnEvent),
    Shutdown,
    Stale,
}

/// Handle to a spawned consultation session.
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Sender for feeding device notifications and commands to the session.
    pub fn events(&self) -> mpsc::Sender<SessionEvent> {
        self.events.clone()
    }

    /// Receiver of observable state snapshots.
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Send one event; returns false when the session is already gone.
    pub async fn send(&self, event: SessionEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// The user-facing listen/stop command.
    pub async fn toggle_listening(&self) -> bool {
        self.send(SessionEvent::Turn(TurnEvent::ToggleListening)).await
    }

    /// Tear the session down and wait for teardown to finish.
    pub async fn shutdown(self) {
        let _ = self.events.send(SessionEvent::Shutdown).await;
        if let Err(e) = self.task.await {
            error!("Session task ended abnormally: {e}");
        }
    }
}

/// The voice turn orchestrator driver. See the module docs for the event
/// flow; the policy itself lives in [`TurnState::step`].
pub struct ConsultSession {
    state: TurnState,
    capture: Box<dyn SpeechCapture>,
    backend: Arc<dyn AssessmentBackend>,
    playback: PlaybackController,
    snapshots: watch::Sender<SessionSnapshot>,
    /// Weak sender handed to spawned continuations: once every external
    /// handle is gone the channel closes and the session tears down even
    /// without an explicit shutdown.
    events: mpsc::WeakSender<SessionEvent>,
    /// Liveness guard shared with suspended operations. False only once
    /// teardown has begun.
    alive: Arc<AtomicBool>,
    /// Session epoch; bumped once when teardown begins. Continuations
    /// spawned before the bump become stale.
    generation: u64,
    /// Generation of the armed inactivity timer; bumped on every arm and
    /// cancel so a superseded window can never finalize an utterance.
    timer_generation: u64,
    silence_timer: Option<JoinHandle<()>>,
    silence_window: Duration,
}

impl ConsultSession {
    /// Spawn a session over the given devices and backend.
    pub fn spawn(
        config: OrchestratorConfig,
        capture: Box<dyn SpeechCapture>,
        backend: Arc<dyn AssessmentBackend>,
        sink: Arc<dyn AudioSink>,
    ) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let alive = Arc::new(AtomicBool::new(true));

        let session = Self {
            state: TurnState::new(),
            capture,
            backend,
            playback: PlaybackController::new(sink, Arc::clone(&alive)),
            snapshots: snapshot_tx,
            events: events_tx.downgrade(),
            alive,
            generation: 0,
            timer_generation: 0,
            silence_timer: None,
            silence_window: Duration::from_millis(config.silence_window_ms),
        };

        let task = tokio::spawn(session.run(events_rx));

        SessionHandle {
            events: events_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) {
        info!("Consultation session started");

        while let Some(event) = events.recv().await {
            match self.accept(event) {
                Accepted::Turn(event) => {
                    self.drive(event).await;
                    self.publish();
                }
                Accepted::Shutdown => break,
                Accepted::Stale => {}
            }
        }

        // Teardown begins: flip the liveness guard and retire the epoch
        // before touching any device. No state mutation past this point;
        // late continuations resolve into dropped events.
        self.alive.store(false, Ordering::Release);
        self.generation += 1;
        self.release().await;

        info!("Consultation session torn down");
    }

    /// Filter stale continuations before they reach the state machine.
    fn accept(&self, event: SessionEvent) -> Accepted {
        match event {
            SessionEvent::Turn(event) => Accepted::Turn(event),
            SessionEvent::SilenceElapsed { generation } => {
                if generation == self.timer_generation {
                    Accepted::Turn(TurnEvent::SilenceElapsed)
                } else {
                    debug!("Dropping superseded silence timer (generation {generation})");
                    Accepted::Stale
                }
            }
            SessionEvent::DispatchResolved { generation, outcome } => {
                if generation == self.generation {
                    Accepted::Turn(TurnEvent::DispatchResolved(outcome))
                } else {
                    debug!("Dropping stale dispatch resolution (generation {generation})");
                    Accepted::Stale
                }
            }
            SessionEvent::PlaybackFailed { generation, message } => {
                if generation == self.generation {
                    Accepted::Turn(TurnEvent::PlaybackFailed(message))
                } else {
                    Accepted::Stale
                }
            }
            SessionEvent::Shutdown => Accepted::Shutdown,
        }
    }

    /// Apply one event, then execute effects until the transition settles.
    ///
    /// An effect can feed a follow-up event back into the machine (a failed
    /// capture start rolls the optimistic state back), so effects drain
    /// through a queue rather than recursing.
    async fn drive(&mut self, event: TurnEvent) {
        let mut queue = VecDeque::new();
        queue.push_back(event);

        while let Some(event) = queue.pop_front() {
            let effects = self.state.step(event);
            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<TurnEvent> {
        match effect {
            Effect::StartCapture => match self.capture.start().await {
                Ok(()) => {
                    debug!("Capture session opened");
                    None
                }
                Err(e) => {
                    warn!("Failed to start capture: {e}");
                    Some(TurnEvent::CaptureStartFailed(e.to_string()))
                }
            },
            Effect::StopCapture => {
                if let Err(e) = self.capture.stop().await {
                    warn!("Failed to stop capture: {e}");
                }
                None
            }
            Effect::RestartSilenceTimer => {
                self.arm_silence_timer();
                None
            }
            Effect::CancelSilenceTimer => {
                self.cancel_silence_timer();
                None
            }
            Effect::Dispatch(utterance) => {
                self.spawn_dispatch(utterance);
                None
            }
            Effect::Play(bytes) => {
                self.playback.start(bytes, self.events.clone(), self.generation);
                None
            }
        }
    }

    /// Cancel and re-arm the inactivity window (debounce).
    fn arm_silence_timer(&mut self) {
        if let Some(timer) = self.silence_timer.take() {
            timer.abort();
        }

        self.timer_generation += 1;
        let generation = self.timer_generation;
        let events = self.events.clone();
        let window = self.silence_window;

        self.silence_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(events) = events.upgrade() {
                let _ = events
                    .send(SessionEvent::SilenceElapsed { generation })
                    .await;
            }
        }));
    }

    fn cancel_silence_timer(&mut self) {
        self.timer_generation += 1;
        if let Some(timer) = self.silence_timer.take() {
            timer.abort();
        }
    }

    /// Issue the assessment request off the driver task.
    ///
    /// The request always runs to completion so nothing leaks on the
    /// backend side; only the continuation is subject to staleness
    /// filtering and teardown.
    fn spawn_dispatch(&mut self, utterance: String) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let outcome = backend.assess(&utterance).await;
            if let Some(events) = events.upgrade() {
                let _ = events
                    .send(SessionEvent::DispatchResolved { generation, outcome })
                    .await;
            }
        });
    }

    fn publish(&self) {
        let snapshot = self.state.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    /// Best-effort teardown: a failure in any step never prevents the
    /// remaining steps from running.
    async fn release(&mut self) {
        // Serialize behind any in-flight playback start before touching
        // the device.
        let mut slot = self.playback.settle().await;

        if let Err(e) = self.capture.stop().await {
            error!("Teardown: failed to stop capture: {e}");
        }

        self.cancel_silence_timer();

        self.playback.shutdown(&mut slot).await;
    }
}
