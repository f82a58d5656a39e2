//! Speech capture device seam
//!
//! The capture device runs outside this process (the client's speech
//! recognizer); this module defines the control trait the orchestrator uses
//! to drive it and the fragment events it produces. The device is
//! unreliable by contract: it may report errors mid-session or end itself
//! without being asked.

mod base;
mod channel;

pub use base::{CaptureError, CaptureFragment, FragmentAlternative, SpeechCapture};
pub use channel::{CaptureCommand, ChannelCapture};
