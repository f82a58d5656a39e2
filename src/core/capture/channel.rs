//! Channel-backed capture device.
//!
//! The production capture device is the client's speech recognizer on the
//! far side of a WebSocket. This adapter turns `start`/`stop` calls into
//! commands on a channel; the connection layer relays them to the client,
//! and relays the client's fragment/error/end notifications back into the
//! session's event channel.

use tokio::sync::mpsc;

use super::base::{CaptureError, SpeechCapture};

/// Command relayed to the remote capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    /// Open a new recognition session
    Start,
    /// Close the current recognition session
    Stop,
}

/// Capture device controlled through a command channel.
pub struct ChannelCapture {
    commands: mpsc::Sender<CaptureCommand>,
    /// Whether the remote client reported a recognizer capability
    supported: bool,
}

impl ChannelCapture {
    /// Create a channel capture device.
    ///
    /// # Arguments
    /// * `commands` - Channel the connection layer drains toward the client
    /// * `supported` - Capability flag reported by the client at configuration
    pub fn new(commands: mpsc::Sender<CaptureCommand>, supported: bool) -> Self {
        Self { commands, supported }
    }
}

#[async_trait::async_trait]
impl SpeechCapture for ChannelCapture {
    async fn start(&mut self) -> Result<(), CaptureError> {
        if !self.supported {
            return Err(CaptureError::Unsupported);
        }

        self.commands
            .send(CaptureCommand::Start)
            .await
            .map_err(|_| CaptureError::Device("capture command channel closed".to_string()))
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.commands
            .send(CaptureCommand::Stop)
            .await
            .map_err(|_| CaptureError::Device("capture command channel closed".to_string()))
    }
}
