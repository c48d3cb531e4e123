use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::StatusMessage;
use crate::session::OutputSession;

/// Stream delay countdowns. Starting and stopping are independent and may
/// overlap during rapid reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DelayCountdown {
    pub total: u32,
    pub starting: u32,
    pub stopping: u32,
}

impl DelayCountdown {
    pub fn is_counting(&self) -> bool {
        self.starting > 0 || self.stopping > 0
    }

    /// One second passes for both countdowns.
    pub fn tick(&mut self) {
        self.starting = self.starting.saturating_sub(1);
        self.stopping = self.stopping.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayMessage {
    /// Delay in effect, nothing counting down.
    Delay { seconds: u32 },
    StartingIn { seconds: u32 },
    StoppingIn { seconds: u32 },
    StoppingStartingIn { stopping: u32, starting: u32 },
}

impl fmt::Display for DelayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayMessage::Delay { seconds } => write!(f, "Delay ({seconds} sec)"),
            DelayMessage::StartingIn { seconds } => write!(f, "Delay (starting in {seconds} sec)"),
            DelayMessage::StoppingIn { seconds } => write!(f, "Delay (stopping in {seconds} sec)"),
            DelayMessage::StoppingStartingIn { stopping, starting } => {
                write!(f, "Delay (stopping in {stopping} sec, starting in {starting} sec)")
            }
        }
    }
}

pub fn compose_delay_message(delay: &DelayCountdown) -> Option<DelayMessage> {
    if delay.total == 0 {
        return None;
    }
    Some(match (delay.starting, delay.stopping) {
        (0, 0) => DelayMessage::Delay { seconds: delay.total },
        (starting, 0) => DelayMessage::StartingIn { seconds: starting },
        (0, stopping) => DelayMessage::StoppingIn { seconds: stopping },
        (starting, stopping) => DelayMessage::StoppingStartingIn { stopping, starting },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ReconnectPhase {
    #[default]
    Idle,
    Reconnecting { attempt: u32, remaining: u32 },
    /// Countdown exhausted; the output is retrying on its own.
    Attempting { attempt: u32 },
}

/// Reflects the output's reconnect attempts. It never drives a retry itself.
#[derive(Debug, Clone, Default)]
pub struct ReconnectTracker {
    retries: u32,
    countdown: u32,
    delay: DelayCountdown,
}

impl ReconnectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn delay(&self) -> DelayCountdown {
        self.delay
    }

    pub fn phase(&self) -> ReconnectPhase {
        if self.countdown > 0 {
            ReconnectPhase::Reconnecting { attempt: self.retries, remaining: self.countdown }
        } else if self.retries > 0 {
            ReconnectPhase::Attempting { attempt: self.retries }
        } else {
            ReconnectPhase::Idle
        }
    }

    pub fn delay_message(&self) -> Option<DelayMessage> {
        compose_delay_message(&self.delay)
    }

    /// The output dropped and will retry in `timeout_seconds`. Returns true on
    /// the first retry of a disconnect so the caller can notify once.
    /// Retries only count while a stream is attached.
    pub fn on_reconnect(&mut self, timeout_seconds: u32, session: Option<&dyn OutputSession>) -> bool {
        let first = self.retries == 0;
        self.countdown = timeout_seconds;
        if let Some(session) = session {
            self.delay.total = session.active_delay_seconds();
            self.retries += 1;
        }
        first
    }

    /// Clear, then pick the delay back up from the session if it survived.
    pub fn on_success(&mut self, session: Option<&dyn OutputSession>) {
        self.clear();
        if let Some(session) = session {
            self.delay.total = session.active_delay_seconds();
        }
    }

    pub fn clear(&mut self) {
        self.retries = 0;
        self.countdown = 0;
        self.delay.total = 0;
    }

    /// Deactivation drops every countdown, including the delay ones.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A freshly started stream has made no attempts yet.
    pub fn clear_retries(&mut self) {
        self.retries = 0;
    }

    pub fn on_delay_starting(&mut self, seconds: u32) {
        self.delay.starting = seconds;
        self.delay.total = self.delay.starting.saturating_add(self.delay.stopping);
    }

    pub fn on_delay_stopping(&mut self, seconds: u32) {
        self.delay.stopping = seconds;
        self.delay.total = self.delay.starting.saturating_add(self.delay.stopping);
    }

    /// Advance one second. Returns the status-line message for this tick:
    /// the countdown shown is the value before decrementing.
    pub fn tick(&mut self) -> Option<StatusMessage> {
        let message = if self.countdown > 0 {
            let message = StatusMessage::Reconnecting { attempt: self.retries, remaining: self.countdown };
            self.countdown -= 1;
            Some(message)
        } else if self.retries > 0 {
            Some(StatusMessage::AttemptingReconnect { attempt: self.retries })
        } else {
            None
        };

        if self.delay.is_counting() {
            self.delay.tick();
        }
        message
    }
}
