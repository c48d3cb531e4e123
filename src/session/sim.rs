//! In-process stand-ins for the output, pipeline and host collaborators.
//! Counters are atomics so a driver task can mutate them while the reactor
//! reads them from its own timeline.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use super::{CpuProbe, OutputSession, SessionHandle, VideoPipeline};

#[derive(Debug, Default)]
pub struct SimulatedOutput {
    bytes_sent: AtomicU64,
    frames_dropped: AtomicU32,
    total_frames: AtomicU32,
    delay_seconds: AtomicU32,
    // f32 bit pattern
    congestion: AtomicU32,
}

impl SimulatedOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn handle(self: &Arc<Self>) -> SessionHandle {
        self.clone()
    }

    pub fn set_bytes_sent(&self, bytes: u64) {
        self.bytes_sent.store(bytes, Ordering::Relaxed);
    }

    pub fn add_bytes_sent(&self, bytes: u64) {
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn set_frames(&self, dropped: u32, total: u32) {
        self.frames_dropped.store(dropped, Ordering::Relaxed);
        self.total_frames.store(total, Ordering::Relaxed);
    }

    pub fn set_delay_seconds(&self, seconds: u32) {
        self.delay_seconds.store(seconds, Ordering::Relaxed);
    }

    pub fn set_congestion(&self, value: f32) {
        self.congestion.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl OutputSession for SimulatedOutput {
    fn total_bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    fn frames_dropped(&self) -> u32 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    fn total_frames(&self) -> u32 {
        self.total_frames.load(Ordering::Relaxed)
    }

    fn active_delay_seconds(&self) -> u32 {
        self.delay_seconds.load(Ordering::Relaxed)
    }

    fn congestion(&self) -> f32 {
        f32::from_bits(self.congestion.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
pub struct SimulatedPipeline {
    skipped: AtomicU64,
    rendered: AtomicU64,
    // f64 bit pattern
    fps: AtomicU64,
}

impl SimulatedPipeline {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_frames(&self, skipped: u64, rendered: u64) {
        self.skipped.store(skipped, Ordering::Relaxed);
        self.rendered.store(rendered, Ordering::Relaxed);
    }

    /// Advance the lifetime counters by one tick's worth of frames.
    pub fn advance(&self, skipped: u64, rendered: u64) {
        self.skipped.fetch_add(skipped, Ordering::Relaxed);
        self.rendered.fetch_add(rendered, Ordering::Relaxed);
    }

    pub fn set_fps(&self, fps: f64) {
        self.fps.store(fps.to_bits(), Ordering::Relaxed);
    }
}

impl VideoPipeline for SimulatedPipeline {
    fn skipped_frames(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    fn total_rendered_frames(&self) -> u64 {
        self.rendered.load(Ordering::Relaxed)
    }

    fn current_fps(&self) -> f64 {
        f64::from_bits(self.fps.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
pub struct SimulatedCpu {
    usage: AtomicU64,
}

impl SimulatedCpu {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_usage(&self, percent: f64) {
        self.usage.store(percent.to_bits(), Ordering::Relaxed);
    }
}

impl CpuProbe for SimulatedCpu {
    fn cpu_usage(&self) -> f64 {
        f64::from_bits(self.usage.load(Ordering::Relaxed))
    }
}
