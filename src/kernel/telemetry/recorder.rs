use std::collections::VecDeque;

use uuid::Uuid;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

const MAX_EVENTS: usize = 4_096;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Called at deactivation; the summary is recorded as the final event.
    pub fn aggregate_session(
        &mut self,
        session_id: Uuid,
        duration_ticks: u64,
        stream_seconds: u64,
        record_seconds: u64,
    ) -> TelemetryEvent {
        let snap = self.snapshot();
        let summary = TelemetryEvent::SessionSummary {
            session_id,
            duration_ticks,
            stream_seconds,
            record_seconds,
            alerts: snap.alert_stats.total(),
            reconnects: snap.reconnect_stats.attempts,
        };
        self.record(summary.clone());
        summary
    }
}
