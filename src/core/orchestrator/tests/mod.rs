//! Session-level tests for the voice turn orchestrator.
//!
//! The pure transition table is covered beside [`super::state`]; these tests
//! drive a spawned [`super::ConsultSession`] against stub devices to cover
//! timing, playback serialization, and teardown behavior.

mod helpers;
mod liveness;
mod turn_flow;
