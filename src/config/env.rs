use std::env;

use super::validation::{validate_assessment_url, validate_silence_window};
use super::{
    DEFAULT_ASSESSMENT_TIMEOUT_SECONDS, DEFAULT_NEARBY_SEARCH_URL, DEFAULT_SILENCE_WINDOW_MS,
    ServerConfig,
};

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible defaults.
    /// Also loads from .env file if present using dotenvy.
    ///
    /// # Returns
    /// * `Result<Self, Box<dyn std::error::Error>>` - The loaded configuration or an error
    ///
    /// # Errors
    /// Returns an error if:
    /// - Numeric environment variables are malformed
    /// - `ASSESSMENT_URL` is missing or not a valid URL
    /// - `SILENCE_WINDOW_MS` is zero
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // Server configuration
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid port number: {e}"))?;

        // Assessment backend configuration
        let assessment_url =
            env::var("ASSESSMENT_URL").map_err(|_| "ASSESSMENT_URL must be set".to_string())?;
        let assessment_timeout_seconds = env::var("ASSESSMENT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_ASSESSMENT_TIMEOUT_SECONDS);

        // Turn orchestration configuration
        let silence_window_ms = env::var("SILENCE_WINDOW_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SILENCE_WINDOW_MS);

        // "Find nearby help" action target
        let nearby_search_url =
            env::var("NEARBY_SEARCH_URL").unwrap_or_else(|_| DEFAULT_NEARBY_SEARCH_URL.to_string());

        validate_assessment_url(&assessment_url)?;
        validate_silence_window(silence_window_ms)?;

        Ok(ServerConfig {
            host,
            port,
            assessment_url,
            assessment_timeout_seconds,
            silence_window_ms,
            nearby_search_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Helper to clean up environment variables after tests
    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("ASSESSMENT_URL");
            env::remove_var("ASSESSMENT_TIMEOUT_SECONDS");
            env::remove_var("SILENCE_WINDOW_MS");
            env::remove_var("NEARBY_SEARCH_URL");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();
        unsafe {
            env::set_var("ASSESSMENT_URL", "http://localhost:9000/assess");
        }

        let config = ServerConfig::from_env().expect("config should load");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.assessment_url, "http://localhost:9000/assess");
        assert_eq!(
            config.assessment_timeout_seconds,
            DEFAULT_ASSESSMENT_TIMEOUT_SECONDS
        );
        assert_eq!(config.silence_window_ms, DEFAULT_SILENCE_WINDOW_MS);
        assert_eq!(config.nearby_search_url, DEFAULT_NEARBY_SEARCH_URL);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        cleanup_env_vars();
        unsafe {
            env::set_var("HOST", "127.0.0.1");
            env::set_var("PORT", "8080");
            env::set_var("ASSESSMENT_URL", "https://triage.example.com/api/assess");
            env::set_var("ASSESSMENT_TIMEOUT_SECONDS", "5");
            env::set_var("SILENCE_WINDOW_MS", "1500");
            env::set_var("NEARBY_SEARCH_URL", "https://maps.example.com/search");
        }

        let config = ServerConfig::from_env().expect("config should load");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.assessment_url,
            "https://triage.example.com/api/assess"
        );
        assert_eq!(config.assessment_timeout_seconds, 5);
        assert_eq!(config.silence_window_ms, 1500);
        assert_eq!(config.nearby_search_url, "https://maps.example.com/search");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_requires_assessment_url() {
        cleanup_env_vars();

        let result = ServerConfig::from_env();
        assert!(result.is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_invalid_port() {
        cleanup_env_vars();
        unsafe {
            env::set_var("ASSESSMENT_URL", "http://localhost:9000/assess");
            env::set_var("PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_silence_window() {
        cleanup_env_vars();
        unsafe {
            env::set_var("ASSESSMENT_URL", "http://localhost:9000/assess");
            env::set_var("SILENCE_WINDOW_MS", "0");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());

        cleanup_env_vars();
    }
}
