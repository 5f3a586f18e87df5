//! Frame counting and frame-rate estimation from wall-clock time.

use std::time::Instant;

/// Counts processed frames and estimates the frame rate from the time
/// elapsed since the first one.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    frames_elapsed: u64,
    start: Option<Instant>,
    fps_estimate: Option<f64>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed frame at `now`.
    ///
    /// The first tick only starts the clock. Every later tick recomputes the
    /// estimate as frames counted so far over elapsed seconds, before counting
    /// the current frame. A zero elapsed time leaves the estimate as it was.
    pub fn tick(&mut self, now: Instant) {
        match self.start {
            None => self.start = Some(now),
            Some(start) => {
                let elapsed = now.saturating_duration_since(start).as_secs_f64();
                if elapsed > 0.0 {
                    self.fps_estimate = Some(self.frames_elapsed as f64 / elapsed);
                }
            }
        }
        self.frames_elapsed += 1;
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.frames_elapsed
    }

    pub fn fps_estimate(&self) -> Option<f64> {
        self.fps_estimate
    }

    pub fn start(&self) -> Option<Instant> {
        self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_only_starts_clock() {
        let mut clock = SessionClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        assert_eq!(clock.frames_elapsed(), 1);
        assert_eq!(clock.start(), Some(t0));
        assert!(clock.fps_estimate().is_none());
    }

    #[test]
    fn test_estimate_counts_frames_before_current() {
        let mut clock = SessionClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        clock.tick(t0 + Duration::from_millis(500));
        // one frame counted over half a second
        assert_eq!(clock.fps_estimate(), Some(2.0));

        clock.tick(t0 + Duration::from_secs(1));
        assert_eq!(clock.fps_estimate(), Some(2.0));
        assert_eq!(clock.frames_elapsed(), 3);
    }

    #[test]
    fn test_start_is_never_reset() {
        let mut clock = SessionClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        clock.tick(t0 + Duration::from_secs(2));
        assert_eq!(clock.start(), Some(t0));
    }

    #[test]
    fn test_zero_elapsed_keeps_previous_estimate() {
        let mut clock = SessionClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        clock.tick(t0);
        assert!(clock.fps_estimate().is_none());
        assert_eq!(clock.frames_elapsed(), 2);
    }
}
