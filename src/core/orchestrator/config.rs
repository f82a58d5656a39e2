//! Configuration for turn orchestration

use crate::config::DEFAULT_SILENCE_WINDOW_MS;

/// Configuration for one consultation session's turn orchestration.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Inactivity window that finalizes an utterance (ms).
    ///
    /// Measured from the most recently received fragment; a new fragment
    /// always restarts the window (debounce, not throttle).
    pub silence_window_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            silence_window_ms: DEFAULT_SILENCE_WINDOW_MS,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new config with the specified silence window.
    pub fn with_silence_window_ms(mut self, window_ms: u64) -> Self {
        self.silence_window_ms = window_ms;
        self
    }
}
