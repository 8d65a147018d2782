use std::time::Instant;

/// Added to the elapsed time so two updates in the same instant stay finite
pub const EPSILON_SECS: f64 = 1e-6;

/// Instantaneous frame rate from the wall-clock time between updates
#[derive(Debug, Clone)]
pub struct FpsCounter {
    previous: Instant,
    fps: f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Counter whose first interval starts at `start`
    pub fn starting_at(start: Instant) -> Self {
        Self {
            previous: start,
            fps: 0.0,
        }
    }

    /// Rate since the previous update (or construction), then restart the interval
    pub fn update(&mut self) -> f64 {
        self.update_at(Instant::now())
    }

    pub fn update_at(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.previous).as_secs_f64();
        self.fps = 1.0 / (elapsed + EPSILON_SECS);
        self.previous = now;
        self.fps
    }

    /// Rate computed by the last update, 0 before the first one
    pub fn current(&self) -> f64 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
