//! WebSocket consultation surface
//!
//! One socket per consultation: the client relays its speech recognizer and
//! audio element over the wire, and the server runs the turn orchestration.
//! Incoming messages become session events; capture/playback commands and
//! state snapshots flow back out.

mod handler;
mod messages;
mod state;

pub use handler::ws_consult_handler;
pub use messages::{IncomingMessage, OutgoingMessage};
pub use state::ConnectionState;
