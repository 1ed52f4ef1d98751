//! Emulation speed factor

use serde::{Deserialize, Serialize};

/// Frame rate the emulator renders at when running unthrottled at 1x
pub const BASELINE_FPS: f64 = 60.0;

/// Ratio of the observed frame rate to the 60 fps baseline, never below 1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct EmulationSpeed(f64);

impl EmulationSpeed {
    /// Normal speed
    pub const NORMAL: Self = Self(1.0);

    /// Compute the factor from a reported frame rate.
    ///
    /// Slow-downs are reported as 1x. Non-finite rates also map to 1x.
    pub fn from_fps(fps: f64) -> Self {
        let ratio = fps / BASELINE_FPS;
        if ratio.is_finite() { Self(ratio.max(1.0)) } else { Self::NORMAL }
    }

    /// Get the factor
    pub fn factor(self) -> f64 {
        self.0
    }
}

impl Default for EmulationSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}
