use serde::{Deserialize, Serialize};

use crate::session::SessionHandle;

/// Advisory signals the monitor raises towards the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    CpuOverload,
    DropFrameSpike,
    HighResourceUsage,
    ReconnectSuccess,
}

/// Everything that can mutate the monitor besides the tick. Producers on any
/// thread enqueue these; the reactor applies them one at a time.
#[derive(Debug, Clone)]
pub enum Event {
    StreamStarted(SessionHandle),
    StreamStopped,
    RecordingStarted(SessionHandle),
    RecordingStopped,
    /// A delayed stream is about to go live in `seconds`.
    DelayStarting { seconds: u32, session: SessionHandle },
    /// A delayed stream will stop in `seconds`.
    DelayStopping { seconds: u32 },
    Reconnect { timeout_seconds: u32 },
    ReconnectSuccess,
    /// User chose "don't show again" on an alert.
    Acknowledge(AlertKind),
    VisibilityChanged { visible: bool },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::StreamStarted(_) => "stream_started",
            Event::StreamStopped => "stream_stopped",
            Event::RecordingStarted(_) => "recording_started",
            Event::RecordingStopped => "recording_stopped",
            Event::DelayStarting { .. } => "delay_starting",
            Event::DelayStopping { .. } => "delay_stopping",
            Event::Reconnect { .. } => "reconnect",
            Event::ReconnectSuccess => "reconnect_success",
            Event::Acknowledge(_) => "acknowledge",
            Event::VisibilityChanged { .. } => "visibility_changed",
        }
    }
}
