//! Server configuration
//!
//! Configuration is loaded from environment variables (with `.env` support)
//! and validated before the server starts. See [`ServerConfig::from_env`].

mod env;
mod validation;

/// Default inactivity window that finalizes an utterance, in milliseconds.
pub const DEFAULT_SILENCE_WINDOW_MS: u64 = 2000;

/// Default timeout for one assessment backend request, in seconds.
pub const DEFAULT_ASSESSMENT_TIMEOUT_SECONDS: u64 = 30;

/// Default external map search opened by the "find nearby help" action.
pub const DEFAULT_NEARBY_SEARCH_URL: &str =
    "https://www.google.com/maps/search/doctors+near+me";

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Assessment backend endpoint receiving finalized utterances
    pub assessment_url: String,
    /// Timeout for one assessment request in seconds
    pub assessment_timeout_seconds: u64,
    /// Inactivity window that finalizes an utterance in milliseconds
    pub silence_window_ms: u64,
    /// External map search URL for the "find nearby help" action
    pub nearby_search_url: String,
}

impl ServerConfig {
    /// Full bind address in `host:port` form
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
