use std::fmt;

use serde::{Deserialize, Serialize};

use super::event::AlertKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    Information,
    Warning,
}

/// Out-of-band (tray/desktop) notifications. Delivery is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    Reconnecting,
    ReconnectSuccessful,
    HighResourceUsage,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Reconnecting => write!(f, "Stream disconnected, reconnecting"),
            Notice::ReconnectSuccessful => write!(f, "Reconnection successful"),
            Notice::HighResourceUsage => write!(f, "Encoding overloaded! Consider turning down video settings or using a faster encoding preset."),
        }
    }
}

/// Produced by the monitor, executed by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SideEffect {
    /// Edge-triggered in-band alert.
    Alert(AlertKind),
    Notify { notice: Notice, level: NotifyLevel },
    /// A fresh bandwidth figure, kb/s.
    BandwidthUpdated(f64),
}
