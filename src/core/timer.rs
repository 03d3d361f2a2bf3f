/// Self-contained timers - manage internal state, fed with frame deltas

/// Throttled timer - minimum interval between fires
#[derive(Debug, Clone, Copy)]
pub struct Throttled {
    min_interval: f32,
    time_since_last: f32,
}

impl Throttled {
    /// Create throttled timer with minimum interval
    pub fn new(min_interval: f32) -> Self {
        Self {
            min_interval,
            time_since_last: 0.0,
        }
    }

    /// Attempt to fire, returns true if enough time has passed
    pub fn try_tick(&mut self, delta: f32) -> bool {
        self.time_since_last += delta;

        if self.time_since_last >= self.min_interval {
            self.time_since_last = 0.0;
            true
        } else {
            false
        }
    }
}

/// Frames-per-second meter averaged over a fixed window
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    window: Throttled,
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(window_seconds: f32) -> Self {
        Self {
            window: Throttled::new(window_seconds),
            frames: 0,
            elapsed: 0.0,
            fps: 0.0,
        }
    }

    /// Record one frame; returns the new average when the window closes
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;

        if self.window.try_tick(delta) && self.elapsed > 0.0 {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttled_enforces_minimum() {
        let mut timer = Throttled::new(0.1);

        assert!(!timer.try_tick(0.05)); // Too soon
        assert!(timer.try_tick(0.06)); // Enough time
        assert!(!timer.try_tick(0.01));
    }

    #[test]
    fn fps_counter_reports_once_per_window() {
        let mut counter = FpsCounter::new(1.0);

        let mut reports = Vec::new();
        for _ in 0..150 {
            if let Some(fps) = counter.tick(1.0 / 60.0) {
                reports.push(fps);
            }
        }

        assert_eq!(reports.len(), 2);
        for fps in reports {
            assert!((fps - 60.0).abs() < 1.5, "fps was {}", fps);
        }
    }

    #[test]
    fn fps_counter_starts_at_zero() {
        let counter = FpsCounter::new(1.0);
        assert_eq!(counter.fps(), 0.0);
    }
}
