//! Audio playback device seam
//!
//! The playback device accepts one decoded audio resource at a time and
//! plays it to completion or failure. Each loaded resource is represented by
//! an [`AudioHandle`] that must be released exactly once; release consumes
//! the handle, so the type system carries the invariant. Completion and
//! error notifications arrive through the session's event channel, not this
//! trait.

mod base;
mod channel;

pub use base::{AudioHandle, AudioSink, PlaybackError};
pub use channel::{ChannelSink, SinkCommand};
