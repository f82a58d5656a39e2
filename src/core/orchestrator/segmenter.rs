//! Utterance accumulation from capture fragments.
//!
//! Pure accumulation, no I/O and no clock: the inactivity window that
//! finalizes an utterance belongs to the session driver. Each fragment event
//! carries the full current-best tail of the transcript, so applying an
//! event replaces the interim transcript rather than appending to it.

use tracing::debug;

use crate::core::capture::CaptureFragment;

/// Accumulates transcript fragments for one listening episode.
#[derive(Debug, Default)]
pub struct UtteranceSegmenter {
    interim: String,
    last_result_index: usize,
}

impl UtteranceSegmenter {
    /// Create an empty segmenter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one fragment event and return the rebuilt interim transcript.
    ///
    /// Events are processed strictly in receipt order. Result indices are
    /// expected to be monotonically non-decreasing; a backwards index is
    /// logged but still processed, since receipt order is authoritative.
    pub fn apply(&mut self, fragment: &CaptureFragment) -> &str {
        if fragment.result_index < self.last_result_index {
            debug!(
                "Fragment result index went backwards ({} -> {}); processing in receipt order",
                self.last_result_index, fragment.result_index
            );
        }
        self.last_result_index = fragment.result_index;

        self.interim.clear();
        for alternative in &fragment.results {
            self.interim.push_str(&alternative.transcript);
        }
        &self.interim
    }

    /// The current interim transcript.
    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Whether nothing has accumulated since the last finalization.
    pub fn is_empty(&self) -> bool {
        self.interim.is_empty()
    }

    /// Take the finalized utterance and reset for the next one.
    ///
    /// An empty or whitespace-only interim transcript is returned as-is:
    /// finalization does not filter, the dispatch policy decides.
    pub fn finalize(&mut self) -> String {
        self.last_result_index = 0;
        std::mem::take(&mut self.interim)
    }

    /// Discard any accumulated state. Called when listening restarts.
    pub fn clear(&mut self) {
        self.interim.clear();
        self.last_result_index = 0;
    }
}
