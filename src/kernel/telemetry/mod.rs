//! Per-session telemetry.
//!
//! Telemetry is a read-only side channel: the monitor records into it but never
//! reads it back when deciding anything. It is bounded and cleared at every
//! activation, so it only ever describes the current session.

pub mod event;
pub mod metrics;
pub mod recorder;
