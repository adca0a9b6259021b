use std::fmt;
use std::time::Duration;

/// Simulation speed as a whole percentage in `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedFactor(u8);

impl SpeedFactor {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn adjust(&mut self, delta: i32) {
        let adjusted = i32::from(self.0)
            .saturating_add(delta)
            .clamp(i32::from(Self::MIN), i32::from(Self::MAX));
        self.0 = adjusted as u8;
    }

    /// Simulated time corresponding to `wall` of real time.
    pub fn scale(self, wall: Duration) -> Duration {
        wall * u32::from(self.0) / 100
    }
}

impl Default for SpeedFactor {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl fmt::Display for SpeedFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
