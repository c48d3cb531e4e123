use std::time::Instant;

/// Turns the session's cumulative byte counter into a kb/s figure, published
/// once every `update_ticks` ticks so sub-second bursts don't make it jitter.
#[derive(Debug, Clone)]
pub struct BandwidthEstimator {
    update_ticks: i64,
    last_bytes: u64,
    last_sample: Instant,
    // Signed: a reconnect pushes it to -1 so the next publish waits one extra tick.
    ticks_since_publish: i64,
    last_rate: Option<f64>,
}

impl BandwidthEstimator {
    pub fn new(update_ticks: u32, now: Instant) -> Self {
        Self {
            update_ticks: i64::from(update_ticks.max(1)),
            last_bytes: 0,
            last_sample: now,
            ticks_since_publish: 0,
            last_rate: None,
        }
    }

    /// Baseline for a freshly attached stream.
    pub fn start(&mut self, now: Instant) {
        self.last_bytes = 0;
        self.last_sample = now;
        self.ticks_since_publish = 0;
        self.last_rate = None;
    }

    pub fn reset_after_reconnect(&mut self, now: Instant) {
        self.last_bytes = 0;
        self.last_sample = now;
        self.ticks_since_publish = -1;
    }

    pub fn clear(&mut self) {
        self.last_bytes = 0;
        self.ticks_since_publish = 0;
        self.last_rate = None;
    }

    pub fn last_rate(&self) -> Option<f64> {
        self.last_rate
    }

    /// Feed one tick. Returns the new rate on publish ticks only.
    pub fn on_tick(&mut self, bytes_sent: u64, now: Instant) -> Option<f64> {
        self.ticks_since_publish += 1;
        if self.ticks_since_publish < self.update_ticks {
            return None;
        }

        let elapsed = now.saturating_duration_since(self.last_sample).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }

        // A shrinking counter means the output restarted underneath us.
        let bytes_sent = if bytes_sent < self.last_bytes { 0 } else { bytes_sent };
        if bytes_sent == 0 {
            self.last_bytes = 0;
        }

        let bits = (bytes_sent - self.last_bytes) as f64 * 8.0;
        let kbps = bits / elapsed / 1000.0;

        self.last_bytes = bytes_sent;
        self.last_sample = now;
        self.ticks_since_publish = 0;
        self.last_rate = Some(kbps);
        Some(kbps)
    }
}
