use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::core::assessment::{AssessmentBackend, HttpAssessmentClient};

/// Application state that can be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Assessment backend every consultation session dispatches to
    pub backend: Arc<dyn AssessmentBackend>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let backend = HttpAssessmentClient::new(
            config.assessment_url.clone(),
            Duration::from_secs(config.assessment_timeout_seconds),
        )?;

        Ok(Arc::new(Self {
            config,
            backend: Arc::new(backend),
        }))
    }

    /// Create state over a preconstructed backend. Used by tests to swap in
    /// a stub without standing up an HTTP endpoint.
    pub fn with_backend(config: ServerConfig, backend: Arc<dyn AssessmentBackend>) -> Arc<Self> {
        Arc::new(Self { config, backend })
    }
}
