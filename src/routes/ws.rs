use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::ws;
use crate::state::AppState;
use std::sync::Arc;

/// Create the WebSocket router
///
/// The `/ws` endpoint carries one consultation session per connection. It is
/// unauthenticated: sessions are ephemeral, nothing is persisted, and the
/// deployment fronts the socket with a reverse proxy when access control is
/// needed.
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(ws::ws_consult_handler))
        .layer(TraceLayer::new_for_http())
}
