//! Tick sources
//!
//! Map timers compare against a clock in seconds. The engine reads that
//! clock through [`TickSource`] so a game loop can drive it from wall time
//! ([`FrameTimer`]) while tests and tools step it by hand ([`ManualClock`]).

use std::time::Instant;

/// Clock that advances once per engine tick
pub trait TickSource {
    /// Seconds since the source started
    fn now(&self) -> f64;

    /// Advance to the next tick; returns the delta in seconds
    fn tick(&mut self) -> f64;
}

/// Wall-clock frame timing
///
/// Tracks delta time, elapsed time and the frame count.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    /// When the timer was started
    start_time: Instant,
    /// When the last frame was recorded
    last_frame_time: Instant,
    /// Delta time for the current frame, in seconds
    delta_time: f64,
    /// Total elapsed time since start, in seconds
    elapsed: f64,
    /// Current frame number
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new frame timer, starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame_time: now,
            delta_time: 0.0,
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    /// Get the delta time for the current frame in seconds
    #[inline]
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Get the total elapsed time at the last tick
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Get the current frame number (incremented by `tick()`)
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average frames per second based on elapsed time
    pub fn average_fps(&self) -> f64 {
        if self.elapsed == 0.0 {
            0.0
        } else {
            self.frame_count as f64 / self.elapsed
        }
    }

    /// Reset the timer to its initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl TickSource for FrameTimer {
    fn now(&self) -> f64 {
        self.elapsed
    }

    fn tick(&mut self) -> f64 {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame_time).as_secs_f64();
        self.elapsed = now.duration_since(self.start_time).as_secs_f64();
        self.last_frame_time = now;
        self.frame_count += 1;
        self.delta_time
    }
}

/// Clock stepped by a fixed amount per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualClock {
    now: f64,
    step: f64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl ManualClock {
    /// Create a clock at zero that advances `step` seconds per tick
    pub fn new(step: f64) -> Self {
        Self { now: 0.0, step }
    }

    /// Get the step per tick
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Advance by an arbitrary amount
    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }

    /// Jump to an absolute time
    pub fn set(&mut self, now: f64) {
        self.now = now;
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn tick(&mut self) -> f64 {
        self.now += self.step;
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_timer() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.frame_count(), 0);

        for _ in 0..3 {
            let dt = timer.tick();
            assert!(dt >= 0.0);
        }

        assert_eq!(timer.frame_count(), 3);
        assert!(timer.elapsed() >= timer.delta_time());
        assert_eq!(timer.now(), timer.elapsed());
    }

    #[test]
    fn test_frame_timer_reset() {
        let mut timer = FrameTimer::new();
        timer.tick();
        timer.tick();
        assert_eq!(timer.frame_count(), 2);

        timer.reset();
        assert_eq!(timer.frame_count(), 0);
        assert_eq!(timer.average_fps(), 0.0);
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(0.5);
        assert_eq!(clock.tick(), 0.5);
        assert_eq!(clock.tick(), 0.5);
        assert_eq!(clock.now(), 1.0);

        clock.advance(2.0);
        assert_eq!(clock.now(), 3.0);
        clock.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn test_tick_source_is_object_safe() {
        let mut sources: Vec<Box<dyn TickSource>> =
            vec![Box::new(ManualClock::new(0.25)), Box::new(FrameTimer::new())];
        for source in &mut sources {
            source.tick();
        }
        assert_eq!(sources[0].now(), 0.25);
    }
}
