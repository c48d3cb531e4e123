use serde::{Deserialize, Serialize};

/// Monotonic count of status periods since the monitor was built. Keeps
/// counting while inactive, so telemetry can place events on one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Tick {
    pub frame: u64,
}

/// Default status period.
pub const TICK_MS: u64 = 1000;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }

    /// Periods elapsed since `earlier`; zero if `earlier` is ahead.
    pub fn periods_since(&self, earlier: Tick) -> u64 {
        self.frame.saturating_sub(earlier.frame)
    }
}
