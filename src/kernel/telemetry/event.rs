use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::event::AlertKind;
use crate::kernel::time::Tick;

// Counters, ids and enums only. No status text.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    Activated {
        session_id: Uuid,
    },

    OutputAttached {
        output: OutputKind,
        tick: Tick,
    },

    OutputDetached {
        output: OutputKind,
        tick: Tick,
    },

    AlertRaised {
        kind: AlertKind,
        tick: Tick,
    },

    AlertSuppressed {
        kind: AlertKind,
    },

    ReconnectAttempt {
        attempt: u32,
        timeout_seconds: u32,
    },

    ReconnectSucceeded {
        after_attempts: u32,
    },

    BandwidthPublished {
        kbps: f64,
    },

    SessionSummary {
        session_id: Uuid,
        duration_ticks: u64,
        stream_seconds: u64,
        record_seconds: u64,
        alerts: u64,
        reconnects: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    Stream,
    Record,
}
