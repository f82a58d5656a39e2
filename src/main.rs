use axum::Router;
use tokio::net::TcpListener;

use anyhow::anyhow;

use triva::{ServerConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    let address = config.address();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;

    // REST routes: health check + nearby care lookup
    let api_routes = routes::api::create_api_router();

    // WebSocket route for consultation sessions
    let ws_routes = routes::ws::create_ws_router();

    let app: Router = api_routes.merge(ws_routes).with_state(app_state);

    // Create listener
    let listener = TcpListener::bind(&address).await?;

    println!("Server listening on {address}");

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
