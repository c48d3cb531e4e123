//! Collaborator seams. The monitor only ever reads these; starting, stopping
//! and mutating the real output belongs to whoever implements them.

use std::fmt::Debug;
use std::sync::Arc;

pub mod sim;

/// A live stream or record output. All reads are expected to be O(1) and
/// non-blocking (already-captured counters).
pub trait OutputSession: Send + Sync + Debug {
    /// Cumulative bytes written since the output started.
    fn total_bytes_sent(&self) -> u64;
    fn frames_dropped(&self) -> u32;
    fn total_frames(&self) -> u32;
    /// Configured stream delay currently in effect, in seconds.
    fn active_delay_seconds(&self) -> u32;
    /// Backpressure severity, nominally in [0, 1].
    fn congestion(&self) -> f32;
}

/// Lifetime counters of the video render pipeline.
pub trait VideoPipeline: Send + Sync + Debug {
    fn skipped_frames(&self) -> u64;
    fn total_rendered_frames(&self) -> u64;
    fn current_fps(&self) -> f64;
}

pub trait CpuProbe: Send + Sync + Debug {
    /// Process CPU usage in percent.
    fn cpu_usage(&self) -> f64;
}

/// Owning handle, held by the output collaborator. The monitor downgrades it.
pub type SessionHandle = Arc<dyn OutputSession>;
