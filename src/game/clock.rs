//! Fixed-Step Frame Clock
//!
//! Hosts call the simulation once per rendered frame with a wall-clock
//! timestamp. The clock converts elapsed wall time into a whole number of
//! fixed ticks and keeps the remainder for render interpolation, so
//! physics and capture rates do not depend on the frame rate.

use crate::core::constants::TICK_MS;

/// Frames longer than this are treated as a stall, not simulated time.
pub const MAX_FRAME_MS: f64 = 100.0;

/// Slack, in ticks, when splitting the accumulator into whole ticks.
const TICK_EPSILON: f64 = 1e-9;

/// Default cap on ticks run for a single frame.
pub const DEFAULT_MAX_CATCH_UP: u32 = 5;

/// Wall-clock to tick accumulator.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_frame_ms: Option<f64>,
    accumulator_ms: f64,
    max_catch_up: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CATCH_UP)
    }
}

impl FrameClock {
    /// Create a clock that runs at most `max_catch_up` ticks per frame.
    pub fn new(max_catch_up: u32) -> Self {
        Self {
            last_frame_ms: None,
            accumulator_ms: 0.0,
            max_catch_up: max_catch_up.max(1),
        }
    }

    /// Feed a frame timestamp (monotonic, milliseconds) and get the
    /// number of ticks to run. The first frame only primes the clock.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_frame_ms.replace(now_ms) else {
            return 0;
        };

        let delta = (now_ms - last).clamp(0.0, MAX_FRAME_MS);
        let cap = TICK_MS * self.max_catch_up as f64;
        self.accumulator_ms = (self.accumulator_ms + delta).min(cap);

        // Whole ticks in the accumulator, tolerant of rounding at the cap
        let whole = (self.accumulator_ms / TICK_MS + TICK_EPSILON).floor();
        let ticks = whole.min(self.max_catch_up as f64) as u32;
        self.accumulator_ms = (self.accumulator_ms - ticks as f64 * TICK_MS).max(0.0);

        ticks
    }

    /// Fraction of a tick left over, for interpolating between the last
    /// two simulated states. In [0, 1).
    pub fn alpha(&self) -> f64 {
        (self.accumulator_ms / TICK_MS).clamp(0.0, 1.0 - f64::EPSILON)
    }

    /// Forget timing history (pause, restart, focus regained).
    pub fn reset(&mut self) {
        self.last_frame_ms = None;
        self.accumulator_ms = 0.0;
    }
}
