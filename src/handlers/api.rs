use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};

use crate::state::AppState;

/// Health check handler
/// Returns a simple JSON response indicating the server is running
pub async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "OK"
    })))
}

/// "Find nearby help" handler
///
/// Returns the external map search URL the client opens when the user asks
/// for nearby care. Plain I/O wrapper; the target is configured server-side.
pub async fn nearby_care(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "url": state.config.nearby_search_url
    }))
}
