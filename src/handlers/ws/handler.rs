//! Axum WebSocket handler
//!
//! Upgrades the HTTP connection and runs one consultation session over it.
//! The socket receive loop converts client messages into session events;
//! pump tasks relay capture/playback commands and state snapshots back out.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::assessment::AUDIO_MP3;
use crate::core::capture::{CaptureCommand, CaptureFragment, ChannelCapture};
use crate::core::orchestrator::{
    ConsultSession, OrchestratorConfig, SessionEvent, SessionSnapshot, TurnEvent,
};
use crate::core::playback::{ChannelSink, SinkCommand};
use crate::state::AppState;

use super::messages::{IncomingMessage, OutgoingMessage};
use super::state::ConnectionState;

/// Outgoing message buffer per connection
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Buffer for device command channels; commands are sparse
const COMMAND_CHANNEL_SIZE: usize = 16;

/// WebSocket consultation handler
/// Upgrades the HTTP connection to WebSocket for a voice consultation
pub async fn ws_consult_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("WebSocket consultation upgrade requested");
    ws.on_upgrade(move |socket| handle_consult_socket(socket, state))
}

/// Manage one WebSocket consultation from upgrade to teardown.
async fn handle_consult_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let stream_id = uuid::Uuid::new_v4().to_string();
    info!("WebSocket consultation established (stream {stream_id})");

    let (mut sender, mut receiver) = socket.split();

    let (message_tx, mut message_rx) = mpsc::channel::<OutgoingMessage>(CHANNEL_BUFFER_SIZE);

    // Spawn task to handle outgoing messages
    let sender_task = tokio::spawn(async move {
        while let Some(message) = message_rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => {
                    if let Err(e) = sender.send(Message::Text(json.into())).await {
                        error!("Failed to send WebSocket message: {e}");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize outgoing message: {e}");
                }
            }
        }
    });

    let mut state = ConnectionState::new(stream_id.clone());

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(msg) => {
                let continue_processing =
                    process_message(msg, &mut state, &message_tx, &app_state).await;
                if !continue_processing {
                    break;
                }
            }
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
        }
    }

    // Session teardown releases the capture session, pending timers, and
    // audio resources before the pumps go away.
    if let Some(session) = state.session.take() {
        session.shutdown().await;
    }
    for pump in state.pumps.drain(..) {
        pump.abort();
    }
    sender_task.abort();

    info!("WebSocket consultation terminated (stream {stream_id})");
}

/// Process one incoming WebSocket frame. Returns false to end the session.
async fn process_message(
    msg: Message,
    state: &mut ConnectionState,
    message_tx: &mpsc::Sender<OutgoingMessage>,
    app_state: &Arc<AppState>,
) -> bool {
    match msg {
        Message::Text(text) => {
            let incoming: IncomingMessage = match serde_json::from_str(&text) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Failed to parse incoming message: {e}");
                    let _ = message_tx
                        .send(OutgoingMessage::Error {
                            message: format!("Invalid message format: {e}"),
                        })
                        .await;
                    return true;
                }
            };

            handle_incoming_message(incoming, state, message_tx, app_state).await;
            true
        }
        Message::Binary(_) => {
            warn!("Unexpected binary frame on consultation socket");
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            info!("WebSocket connection closed by client");
            false
        }
    }
}

async fn handle_incoming_message(
    message: IncomingMessage,
    state: &mut ConnectionState,
    message_tx: &mpsc::Sender<OutgoingMessage>,
    app_state: &Arc<AppState>,
) {
    match message {
        IncomingMessage::Config { capture_supported } => {
            configure_session(capture_supported, state, message_tx, app_state).await;
        }
        IncomingMessage::ToggleListening => {
            forward(state, message_tx, TurnEvent::ToggleListening).await;
        }
        IncomingMessage::Fragment {
            result_index,
            results,
        } => {
            let fragment = CaptureFragment {
                result_index,
                results,
            };
            forward(state, message_tx, TurnEvent::Fragment(fragment)).await;
        }
        IncomingMessage::CaptureError { code } => {
            forward(state, message_tx, TurnEvent::CaptureFailed(code)).await;
        }
        IncomingMessage::CaptureEnded => {
            forward(state, message_tx, TurnEvent::CaptureEnded).await;
        }
        IncomingMessage::PlaybackEnded => {
            forward(state, message_tx, TurnEvent::PlaybackEnded).await;
        }
        IncomingMessage::PlaybackError { message } => {
            forward(state, message_tx, TurnEvent::PlaybackFailed(message)).await;
        }
    }
}

/// Build the session and its device adapters from the client's config.
async fn configure_session(
    capture_supported: bool,
    state: &mut ConnectionState,
    message_tx: &mpsc::Sender<OutgoingMessage>,
    app_state: &Arc<AppState>,
) {
    if state.is_configured() {
        let _ = message_tx
            .send(OutgoingMessage::Error {
                message: "Session already configured".to_string(),
            })
            .await;
        return;
    }

    let (capture_tx, capture_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (sink_tx, sink_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

    let capture = ChannelCapture::new(capture_tx, capture_supported);
    let sink = Arc::new(ChannelSink::new(sink_tx));

    let orchestrator = OrchestratorConfig::default()
        .with_silence_window_ms(app_state.config.silence_window_ms);

    let session = ConsultSession::spawn(
        orchestrator,
        Box::new(capture),
        Arc::clone(&app_state.backend),
        sink,
    );

    state
        .pumps
        .push(spawn_capture_pump(capture_rx, message_tx.clone()));
    state
        .pumps
        .push(spawn_sink_pump(sink_rx, message_tx.clone()));
    state
        .pumps
        .push(spawn_snapshot_pump(session.snapshots(), message_tx.clone()));

    state.session = Some(session);

    debug!("Consultation session configured (capture_supported={capture_supported})");
    let _ = message_tx.send(OutgoingMessage::Ready).await;
}

/// Forward a device notification or command into the session.
async fn forward(
    state: &mut ConnectionState,
    message_tx: &mpsc::Sender<OutgoingMessage>,
    event: TurnEvent,
) {
    let Some(session) = &state.session else {
        let _ = message_tx
            .send(OutgoingMessage::Error {
                message: "Session not configured".to_string(),
            })
            .await;
        return;
    };

    if !session.send(SessionEvent::Turn(event)).await {
        warn!("Session is gone; dropping event");
    }
}

/// Relay capture commands to the client.
fn spawn_capture_pump(
    mut commands: mpsc::Receiver<CaptureCommand>,
    out: mpsc::Sender<OutgoingMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            let message = match command {
                CaptureCommand::Start => OutgoingMessage::StartCapture,
                CaptureCommand::Stop => OutgoingMessage::StopCapture,
            };
            if out.send(message).await.is_err() {
                break;
            }
        }
    })
}

/// Relay playback commands to the client, encoding audio payloads.
fn spawn_sink_pump(
    mut commands: mpsc::Receiver<SinkCommand>,
    out: mpsc::Sender<OutgoingMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            let message = match command {
                SinkCommand::Play { id, bytes } => OutgoingMessage::PlayAudio {
                    id,
                    data: BASE64.encode(&bytes),
                    content_type: AUDIO_MP3.to_string(),
                },
                SinkCommand::Pause => OutgoingMessage::PauseAudio,
                SinkCommand::Release { id } => OutgoingMessage::ReleaseAudio { id },
                SinkCommand::Close => break,
            };
            if out.send(message).await.is_err() {
                break;
            }
        }
    })
}

/// Relay observable state snapshots to the client.
fn spawn_snapshot_pump(
    mut snapshots: watch::Receiver<SessionSnapshot>,
    out: mpsc::Sender<OutgoingMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // Send the initial state so the client renders before the first
        // transition.
        let initial = snapshots.borrow().clone();
        if out
            .send(OutgoingMessage::State { session: initial })
            .await
            .is_err()
        {
            return;
        }

        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if out
                .send(OutgoingMessage::State { session: snapshot })
                .await
                .is_err()
            {
                break;
            }
        }
    })
}
