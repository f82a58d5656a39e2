//! WebSocket connection state management

use tokio::task::JoinHandle;

use crate::core::orchestrator::SessionHandle;

/// Per-connection state, owned by the socket receive loop.
///
/// Only the receive loop mutates this, so no synchronization is needed; the
/// pumps spawned at configuration time are tracked here so cleanup can abort
/// them when the socket closes.
pub struct ConnectionState {
    /// The running consultation session, once the client has configured one
    pub session: Option<SessionHandle>,
    /// Relay tasks bridging session channels to the outgoing socket
    pub pumps: Vec<JoinHandle<()>>,
    /// Unique identifier for this WebSocket session
    pub stream_id: String,
}

impl ConnectionState {
    pub fn new(stream_id: String) -> Self {
        Self {
            session: None,
            pumps: Vec::new(),
            stream_id,
        }
    }

    /// Whether the client has configured a session yet.
    pub fn is_configured(&self) -> bool {
        self.session.is_some()
    }
}
