use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source for the game loop, in milliseconds.
///
/// Only differences between readings matter; the epoch is arbitrary.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for deterministic loops and tests.
///
/// Clones share the same reading, so a test can keep one handle and move the
/// other into the loop.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Frame timing snapshot produced once per loop tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in milliseconds.
    pub delta_ms: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Turns clock readings into clamped per-frame deltas.
///
/// Delta time is clamped to `[0, max_delta_ms]` so a stall (debugger, a
/// minimized window) does not turn into a burst of catch-up updates.
#[derive(Debug, Clone)]
pub struct FrameClock<C: Clock> {
    clock: C,
    last: Option<f64>,
    frame_index: u64,
    max_delta_ms: f32,
}

impl<C: Clock> FrameClock<C> {
    pub fn new(clock: C, max_delta_ms: f32) -> Self {
        Self { clock, last: None, frame_index: 0, max_delta_ms: max_delta_ms.max(0.0) }
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Resets the baseline; the next tick reports a zero delta.
    pub fn reset(&mut self) {
        self.last = Some(self.clock.now_ms());
    }

    /// Advances the clock and returns a new `FrameTime`.
    ///
    /// The first tick after construction reports a zero delta.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.clock.now_ms();
        let elapsed = self.last.map_or(0.0, |last| now - last);
        self.last = Some(now);

        let ft = FrameTime {
            delta_ms: (elapsed as f32).clamp(0.0, self.max_delta_ms),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(12.5);
        assert_eq!(other.now_ms(), 12.5);
        other.set(3.0);
        assert_eq!(clock.now_ms(), 3.0);
    }

    #[test]
    fn deltas_are_clamped() {
        let clock = ManualClock::new();
        let mut frames = FrameClock::new(clock.clone(), 100.0);

        assert_eq!(frames.tick().delta_ms, 0.0);
        clock.advance(16.0);
        assert_eq!(frames.tick().delta_ms, 16.0);
        clock.advance(5_000.0);
        assert_eq!(frames.tick().delta_ms, 100.0);
        // Time going backwards never produces a negative step.
        clock.advance(-50.0);
        let ft = frames.tick();
        assert_eq!(ft.delta_ms, 0.0);
        assert_eq!(ft.frame_index, 3);
    }

    #[test]
    fn reset_drops_elapsed_time() {
        let clock = ManualClock::new();
        let mut frames = FrameClock::new(clock.clone(), 100.0);
        frames.tick();
        clock.advance(40.0);
        frames.reset();
        assert_eq!(frames.tick().delta_ms, 0.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
