use bytes::Bytes;

/// Error types for playback operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio decode failed: {0}")]
    Decode(String),
    #[error("audio playback failed: {0}")]
    Device(String),
    #[error("audio device closed")]
    Closed,
}

/// One decoded, playable audio resource held by the sink.
///
/// The handle addresses a resource the sink allocated from backend-supplied
/// bytes. It is deliberately not `Clone`: passing it to
/// [`AudioSink::release`] consumes it, which makes exactly-once release a
/// move-checked property rather than a runtime convention.
#[derive(Debug, PartialEq, Eq)]
pub struct AudioHandle {
    id: u64,
}

impl AudioHandle {
    /// Construct a handle for a sink-allocated resource id.
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// The sink-side id of the addressed resource.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Control surface for the audio playback device.
///
/// The device plays at most one resource at a time. `ended` and `error`
/// notifications flow through the session's event channel via the device
/// adapter, the same way capture notifications do.
#[async_trait::async_trait]
pub trait AudioSink: Send + Sync {
    /// Decode encoded audio bytes into a playable resource.
    async fn load(&self, bytes: Bytes) -> Result<AudioHandle, PlaybackError>;

    /// Point the device at the handle's resource and begin playback.
    ///
    /// Resolves once playback has started (or failed to start); natural
    /// completion is reported later through the event channel.
    async fn play(&self, handle: &AudioHandle) -> Result<(), PlaybackError>;

    /// Pause the device and reset its position. Best-effort, idempotent.
    async fn pause(&self);

    /// Reclaim the handle's resource. Consumes the handle.
    async fn release(&self, handle: AudioHandle);

    /// Close the underlying audio processing context. Idempotent; further
    /// operations after close fail with [`PlaybackError::Closed`].
    async fn close(&self);
}
