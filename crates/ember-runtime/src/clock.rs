//! Fixed-step simulation clock

use std::time::Instant;

/// Longest frame fed into the accumulator; slower frames are truncated so a
/// stall cannot queue an unbounded number of ticks
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Splits variable frame time into fixed simulation ticks.
///
/// Leftover time below one tick carries over; [`interpolation_alpha`](Self::interpolation_alpha)
/// reports it as a fraction of a tick for render blending.
#[derive(Debug, Clone)]
pub struct GameClock {
    step: f64,
    frame_time: f64,
    elapsed: f64,
    carry: f64,
    wall: Option<Instant>,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::with_fixed_timestep(60.0)
    }
}

impl GameClock {
    /// 60 ticks per second
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            step: hz.recip(),
            frame_time: 0.0,
            elapsed: 0.0,
            carry: 0.0,
            wall: None,
        }
    }

    /// Seconds per tick
    pub fn fixed_timestep(&self) -> f64 {
        self.step
    }

    /// Length of the last frame after truncation
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Sum of all frame times
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Measure the frame from the wall clock. The first call only starts timing.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let previous = self.wall.replace(now);
        let frame = previous.map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        self.advance(frame);
    }

    /// Feed an explicit frame time, for headless loops and tests
    pub fn advance(&mut self, frame_time: f64) {
        self.frame_time = frame_time.clamp(0.0, MAX_FRAME_TIME);
        self.elapsed += self.frame_time;
        self.carry += self.frame_time;
    }

    pub fn should_fixed_update(&self) -> bool {
        self.carry >= self.step
    }

    pub fn consume_fixed_step(&mut self) {
        self.carry -= self.step;
    }

    /// Carried time as a fraction of one tick
    pub fn interpolation_alpha(&self) -> f64 {
        self.carry / self.step
    }
}
