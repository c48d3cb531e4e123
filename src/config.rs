use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::kernel::time::TICK_MS;

/// Tunables for the session monitor. Every field has a default, so an empty
/// JSON object (or no file at all) yields the stock 1 Hz behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Period of the status tick.
    pub tick_interval_ms: u64,
    /// Capacity N of the CPU and dropped-frame lookback windows.
    pub window_size: usize,
    /// CPU% every sample in the window must reach to count as overloaded.
    pub cpu_overload_percent: f64,
    /// Dropped-frame growth across the lookback window that counts as a spike.
    pub drop_spike_frames: u32,
    /// Skipped frames in a single tick that count as a burst.
    pub skip_burst_frames: u64,
    /// Minimum skipped/rendered percentage (since activation) for a burst.
    pub skip_burst_percent: f64,
    /// Ticks between bandwidth publishes.
    pub bitrate_update_ticks: u32,
    pub congestion_epsilon: f32,
    /// How long transient status-line messages stay up, in ticks.
    pub message_hold_ticks: u32,
    pub event_queue_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_MS,
            window_size: 10,
            cpu_overload_percent: 50.0,
            drop_spike_frames: 50,
            skip_burst_frames: 10,
            skip_burst_percent: 0.1,
            bitrate_update_ticks: 2,
            congestion_epsilon: 1e-5,
            message_hold_ticks: 4,
            event_queue_capacity: 100,
        }
    }
}

impl MonitorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| MonitorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms must be at least 1"));
        }
        if self.window_size == 0 {
            return Err(invalid("window_size must be at least 1"));
        }
        if self.bitrate_update_ticks == 0 {
            return Err(invalid("bitrate_update_ticks must be at least 1"));
        }
        if self.event_queue_capacity == 0 {
            return Err(invalid("event_queue_capacity must be at least 1"));
        }
        if !(self.congestion_epsilon > 0.0 && self.congestion_epsilon < 0.5) {
            return Err(invalid("congestion_epsilon must lie in (0, 0.5)"));
        }
        for (name, value) in [
            ("cpu_overload_percent", self.cpu_overload_percent),
            ("skip_burst_percent", self.skip_burst_percent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(&format!("{name} must be a finite, non-negative percentage")));
            }
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn invalid(reason: &str) -> MonitorError {
    MonitorError::InvalidConfig(reason.to_string())
}
