use serde::{Deserialize, Serialize};

/// Three-stop congestion colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stop", rename_all = "snake_case")]
pub enum CongestionColor {
    Good,
    Bad,
    /// Channel intensities in [0, 1]; blue is always 0.
    Blend { red: f32, green: f32 },
}

impl CongestionColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match *self {
            CongestionColor::Good => (0, 255, 0),
            CongestionColor::Bad => (255, 0, 0),
            CongestionColor::Blend { red, green } => ((red * 255.0) as u8, (green * 255.0) as u8, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CongestionReading {
    pub smoothed: f32,
    pub color: CongestionColor,
}

/// Asymmetric smoother: jumps straight to a worsening sample, averages
/// towards an improving one.
#[derive(Debug, Clone)]
pub struct CongestionSmoother {
    epsilon: f32,
    previous: f32,
}

impl CongestionSmoother {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon, previous: 0.0 }
    }

    pub fn reset(&mut self) {
        self.previous = 0.0;
    }

    pub fn on_sample(&mut self, raw: f32) -> CongestionReading {
        let raw = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };

        let mut smoothed = (raw + self.previous) * 0.5;
        if smoothed < raw {
            smoothed = raw;
        }
        let smoothed = smoothed.min(1.0);

        self.previous = raw;
        CongestionReading {
            smoothed,
            color: self.classify(smoothed),
        }
    }

    fn classify(&self, value: f32) -> CongestionColor {
        if value < self.epsilon {
            CongestionColor::Good
        } else if (value - 1.0).abs() < self.epsilon {
            CongestionColor::Bad
        } else {
            CongestionColor::Blend {
                red: (value * 2.0).clamp(0.0, 1.0),
                green: ((1.0 - value) * 2.0).clamp(0.0, 1.0),
            }
        }
    }
}

/// What the status square shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Indicator {
    /// No stream, or the monitor is inactive.
    Hidden,
    /// Stream attached but no congestion sample yet.
    Pending,
    Congestion { smoothed: f32, color: CongestionColor },
}

impl Indicator {
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        match self {
            Indicator::Hidden => None,
            Indicator::Pending => Some((72, 72, 72)),
            Indicator::Congestion { color, .. } => Some(color.rgb()),
        }
    }
}

impl From<CongestionReading> for Indicator {
    fn from(reading: CongestionReading) -> Self {
        Indicator::Congestion {
            smoothed: reading.smoothed,
            color: reading.color,
        }
    }
}
