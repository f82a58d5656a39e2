//! Channel-backed playback device.
//!
//! The production playback device is an audio element on the far side of a
//! WebSocket. Loading stashes the encoded bytes under a fresh resource id;
//! playing relays the bytes to the client; the client's `ended`/`error`
//! notifications come back through the connection layer into the session's
//! event channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use super::base::{AudioHandle, AudioSink, PlaybackError};

/// Command relayed to the remote playback device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCommand {
    /// Start playing the resource with the given id
    Play { id: u64, bytes: Bytes },
    /// Pause playback and reset position
    Pause,
    /// The resource with the given id has been reclaimed
    Release { id: u64 },
    /// The audio context is closing; no further commands follow
    Close,
}

/// Playback device controlled through a command channel.
pub struct ChannelSink {
    commands: mpsc::Sender<SinkCommand>,
    next_id: AtomicU64,
    /// Loaded resources awaiting play, keyed by handle id
    buffers: Mutex<HashMap<u64, Bytes>>,
    closed: AtomicBool,
}

impl ChannelSink {
    /// Create a channel sink draining into the connection layer.
    pub fn new(commands: mpsc::Sender<SinkCommand>) -> Self {
        Self {
            commands,
            next_id: AtomicU64::new(1),
            buffers: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl AudioSink for ChannelSink {
    async fn load(&self, bytes: Bytes) -> Result<AudioHandle, PlaybackError> {
        if self.is_closed() {
            return Err(PlaybackError::Closed);
        }
        if bytes.is_empty() {
            return Err(PlaybackError::Decode("empty audio payload".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.buffers.lock().insert(id, bytes);
        debug!("Loaded audio resource {id}");
        Ok(AudioHandle::new(id))
    }

    async fn play(&self, handle: &AudioHandle) -> Result<(), PlaybackError> {
        if self.is_closed() {
            return Err(PlaybackError::Closed);
        }

        let bytes = self
            .buffers
            .lock()
            .get(&handle.id())
            .cloned()
            .ok_or_else(|| {
                PlaybackError::Device(format!("unknown audio resource {}", handle.id()))
            })?;

        self.commands
            .send(SinkCommand::Play {
                id: handle.id(),
                bytes,
            })
            .await
            .map_err(|_| PlaybackError::Device("playback command channel closed".to_string()))
    }

    async fn pause(&self) {
        let _ = self.commands.send(SinkCommand::Pause).await;
    }

    async fn release(&self, handle: AudioHandle) {
        let id = handle.id();
        self.buffers.lock().remove(&id);
        let _ = self.commands.send(SinkCommand::Release { id }).await;
        debug!("Released audio resource {id}");
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.buffers.lock().clear();
            let _ = self.commands.send(SinkCommand::Close).await;
        }
    }
}
