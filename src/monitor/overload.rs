use serde::{Deserialize, Serialize};

use super::window::SlidingWindow;
use crate::kernel::event::AlertKind;

/// Warning enablement.
///
/// `Armed` may fire, and stays armed after firing: an unanswered warning
/// comes back once its window refills. Acknowledging ("don't show again")
/// latches `Disarmed` for the rest of the session. Activation re-arms both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HintState {
    #[default]
    Armed,
    Disarmed,
}

impl HintState {
    pub fn can_fire(self) -> bool {
        self == HintState::Armed
    }

    fn acknowledge(&mut self) {
        *self = HintState::Disarmed;
    }
}

/// CPU-saturation and dropped-frame-spike checks over their lookback windows.
#[derive(Debug, Clone)]
pub struct OverloadDetector {
    cpu_window: SlidingWindow<f64>,
    drop_window: SlidingWindow<u32>,
    cpu_threshold: f64,
    drop_spike: u32,
    cpu_hint: HintState,
    drop_hint: HintState,
}

impl OverloadDetector {
    pub fn new(window_size: usize, cpu_threshold: f64, drop_spike: u32) -> Self {
        Self {
            cpu_window: SlidingWindow::new(window_size),
            drop_window: SlidingWindow::new(window_size),
            cpu_threshold,
            drop_spike,
            cpu_hint: HintState::Armed,
            drop_hint: HintState::Armed,
        }
    }

    /// Clears both windows and re-arms both hints.
    pub fn rearm(&mut self) {
        self.cpu_window.reset();
        self.drop_window.reset();
        self.cpu_hint = HintState::Armed;
        self.drop_hint = HintState::Armed;
    }

    /// Returns true when the CPU has been at or above the threshold for the
    /// whole window and the hint may fire. Firing clears the window.
    pub fn on_cpu_sample(&mut self, usage: f64) -> bool {
        let usage = if usage.is_finite() { usage } else { 0.0 };
        self.cpu_window.push(usage);

        if !self.cpu_window.all_at_least(self.cpu_threshold) || !self.cpu_hint.can_fire() {
            return false;
        }
        self.cpu_window.reset();
        true
    }

    /// Returns true when the cumulative dropped count grew by more than the
    /// spike limit relative to the lookback slot. A zero lookback slot means
    /// the window is still warming up and never fires.
    pub fn on_dropped_frames(&mut self, total_dropped: u32) -> bool {
        self.drop_window.push(total_dropped);
        let older = self.drop_window.value_at(0);

        let spiked = older > 0 && total_dropped.saturating_sub(older) > self.drop_spike;
        if !spiked || !self.drop_hint.can_fire() {
            return false;
        }
        self.drop_window.reset();
        true
    }

    pub fn acknowledge(&mut self, kind: AlertKind) {
        if let Some(hint) = self.hint_mut(kind) {
            hint.acknowledge();
        }
    }

    pub fn hint(&self, kind: AlertKind) -> Option<HintState> {
        match kind {
            AlertKind::CpuOverload => Some(self.cpu_hint),
            AlertKind::DropFrameSpike => Some(self.drop_hint),
            _ => None,
        }
    }

    pub fn cpu_window(&self) -> &SlidingWindow<f64> {
        &self.cpu_window
    }

    pub fn drop_window(&self) -> &SlidingWindow<u32> {
        &self.drop_window
    }

    fn hint_mut(&mut self, kind: AlertKind) -> Option<&mut HintState> {
        match kind {
            AlertKind::CpuOverload => Some(&mut self.cpu_hint),
            AlertKind::DropFrameSpike => Some(&mut self.drop_hint),
            _ => None,
        }
    }
}
