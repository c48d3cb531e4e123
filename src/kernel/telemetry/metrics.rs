use std::collections::VecDeque;

use serde::Serialize;

use super::event::TelemetryEvent;
use crate::kernel::event::AlertKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub alert_stats: AlertStats,
    pub reconnect_stats: ReconnectStats,
    pub bandwidth_stats: BandwidthStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertStats {
    pub cpu_overload: u64,
    pub drop_frame_spike: u64,
    pub high_resource_usage: u64,
    pub reconnect_success: u64,
    pub suppressed: u64,
}

impl AlertStats {
    pub fn total(&self) -> u64 {
        self.cpu_overload + self.drop_frame_spike + self.high_resource_usage + self.reconnect_success
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconnectStats {
    pub attempts: u64,
    pub successes: u64,
    pub max_attempts_before_success: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandwidthStats {
    pub publishes: u64,
    pub avg_kbps: f64,
    pub peak_kbps: f64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut kbps_sum = 0.0;

    for event in events {
        match event {
            TelemetryEvent::AlertRaised { kind, .. } => match kind {
                AlertKind::CpuOverload => snap.alert_stats.cpu_overload += 1,
                AlertKind::DropFrameSpike => snap.alert_stats.drop_frame_spike += 1,
                AlertKind::HighResourceUsage => snap.alert_stats.high_resource_usage += 1,
                AlertKind::ReconnectSuccess => snap.alert_stats.reconnect_success += 1,
            },
            TelemetryEvent::AlertSuppressed { .. } => {
                snap.alert_stats.suppressed += 1;
            }
            TelemetryEvent::ReconnectAttempt { .. } => {
                snap.reconnect_stats.attempts += 1;
            }
            TelemetryEvent::ReconnectSucceeded { after_attempts } => {
                snap.reconnect_stats.successes += 1;
                snap.reconnect_stats.max_attempts_before_success =
                    snap.reconnect_stats.max_attempts_before_success.max(*after_attempts);
            }
            TelemetryEvent::BandwidthPublished { kbps } => {
                snap.bandwidth_stats.publishes += 1;
                kbps_sum += kbps;
                if *kbps > snap.bandwidth_stats.peak_kbps {
                    snap.bandwidth_stats.peak_kbps = *kbps;
                }
            }
            _ => {}
        }
    }

    if snap.bandwidth_stats.publishes > 0 {
        snap.bandwidth_stats.avg_kbps = kbps_sum / snap.bandwidth_stats.publishes as f64;
    }

    snap
}
