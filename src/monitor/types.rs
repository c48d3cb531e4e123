use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::congestion::Indicator;
use super::reconnect::{DelayMessage, ReconnectPhase};

/// Elapsed whole seconds, rendered `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Elapsed(pub u64);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0 % 60;
        let total_minutes = self.0 / 60;
        write!(f, "{:02}:{:02}:{:02}", total_minutes / 60, total_minutes % 60, seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroppedFrames {
    pub dropped: u32,
    pub total: u32,
    pub percent: f64,
}

impl fmt::Display for DroppedFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dropped Frames {} ({:.1}%)", self.dropped, self.percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CpuReading {
    pub usage_percent: f64,
    pub fps: f64,
}

impl fmt::Display for CpuReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU: {:.1}%, {:.2} fps", self.usage_percent, self.fps)
    }
}

/// Text for the status line, kept structured so the presentation layer can
/// localize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusMessage {
    Reconnecting { attempt: u32, remaining: u32 },
    AttemptingReconnect { attempt: u32 },
    ReconnectSuccessful,
    HighResourceUsage,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Reconnecting { attempt, remaining } => {
                write!(f, "Disconnected, reconnecting in {remaining} second(s) (attempt {attempt})")
            }
            StatusMessage::AttemptingReconnect { attempt } => {
                write!(f, "Attempting to reconnect... (attempt {attempt})")
            }
            StatusMessage::ReconnectSuccessful => write!(f, "Reconnection successful"),
            StatusMessage::HighResourceUsage => {
                write!(f, "Encoding overloaded! Consider turning down video settings or using a faster encoding preset.")
            }
        }
    }
}

/// Single status-line slot. Transient messages expire after their hold
/// period; persistent ones stay until replaced or cleared.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    message: Option<StatusMessage>,
    hold_ticks: Option<u32>,
}

impl StatusLine {
    pub fn show(&mut self, message: StatusMessage) {
        self.message = Some(message);
        self.hold_ticks = None;
    }

    pub fn show_for(&mut self, message: StatusMessage, ticks: u32) {
        self.message = Some(message);
        self.hold_ticks = Some(ticks);
    }

    /// Counts down a transient message.
    pub fn tick(&mut self) {
        if let Some(remaining) = self.hold_ticks.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.clear();
            }
        }
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.hold_ticks = None;
    }

    pub fn current(&self) -> Option<StatusMessage> {
        self.message
    }
}

/// Everything the presentation layer needs for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub active: bool,
    pub session_id: Option<Uuid>,
    pub stream_attached: bool,
    pub record_attached: bool,
    pub stream_time: Elapsed,
    pub record_time: Elapsed,
    pub cpu: CpuReading,
    pub bandwidth_kbps: Option<f64>,
    pub dropped_frames: Option<DroppedFrames>,
    pub status_message: Option<StatusMessage>,
    pub delay_message: Option<DelayMessage>,
    pub reconnect: ReconnectPhase,
    pub indicator: Indicator,
}

impl StatusSnapshot {
    pub fn stream_label(&self) -> String {
        format!("LIVE: {}", self.stream_time)
    }

    pub fn record_label(&self) -> String {
        format!("REC: {}", self.record_time)
    }

    pub fn bandwidth_label(&self) -> Option<String> {
        self.bandwidth_kbps.map(|kbps| format!("kb/s: {kbps:.0}"))
    }
}
