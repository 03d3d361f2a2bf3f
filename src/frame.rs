use std::time::{Duration, Instant};

/// Frame metadata handed to the animator each redraw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the first frame
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Where frame timestamps come from
pub trait TimeSource {
    fn now(&mut self) -> Duration;
}

/// Monotonic wall time measured from construction
#[derive(Debug)]
pub struct SystemTime {
    origin: Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTime {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Infinite iterator over frames: `let frame = frames.next()` once per redraw
pub struct FrameIterator<T: TimeSource = SystemTime> {
    source: T,
    frame_number: u64,
    start: Duration,
    last: Duration,
}

impl FrameIterator<SystemTime> {
    pub fn new() -> Self {
        Self::with_source(SystemTime::new())
    }
}

impl<T: TimeSource> FrameIterator<T> {
    pub fn with_source(mut source: T) -> Self {
        let now = source.now();
        Self {
            source,
            frame_number: 0,
            start: now,
            last: now,
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Forget the time spent away, e.g. while the window was hidden
    pub fn resync(&mut self) {
        self.last = self.source.now();
    }
}

impl Default for FrameIterator<SystemTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> Iterator for FrameIterator<T> {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        let now = self.source.now();
        let delta = now.saturating_sub(self.last).as_secs_f32();
        let time = now.saturating_sub(self.start).as_secs_f32();

        let info = FrameInfo::new(self.frame_number, time, delta);

        self.frame_number += 1;
        self.last = now;

        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Advances a fixed step every time it is read
    struct Stepper {
        now: Duration,
        step: Duration,
    }

    impl TimeSource for Stepper {
        fn now(&mut self) -> Duration {
            let now = self.now;
            self.now += self.step;
            now
        }
    }

    fn frames(step_ms: u64) -> FrameIterator<Stepper> {
        FrameIterator::with_source(Stepper {
            now: Duration::ZERO,
            step: Duration::from_millis(step_ms),
        })
    }

    #[test]
    fn numbers_count_up() {
        let numbers: Vec<u64> = frames(16).take(4).map(|f| f.number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn delta_and_time_follow_source() {
        let mut frames = frames(20);
        let first = frames.next().unwrap();
        assert!((first.delta - 0.02).abs() < 1e-6);

        let second = frames.next().unwrap();
        assert!((second.delta - 0.02).abs() < 1e-6);
        assert!((second.time - 0.04).abs() < 1e-6);
    }

    #[test]
    fn resync_drops_elapsed_gap() {
        let mut frames = frames(10);
        frames.next();
        frames.resync();
        let after = frames.next().unwrap();
        assert!((after.delta - 0.01).abs() < 1e-6);
        assert_eq!(frames.frame_number(), 2);
    }

    #[test]
    fn system_time_is_monotonic() {
        let mut frames = FrameIterator::new();
        let a = frames.next().unwrap();
        let b = frames.next().unwrap();
        assert!(b.time >= a.time);
        assert!(b.delta >= 0.0);
    }
}
