use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::core::{Game, Platform};

use super::frame_clock::{Clock, FrameClock, SystemClock};

/// Loop tuning.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Upper bound for one tick's elapsed time, in milliseconds.
    pub max_delta_ms: f32,

    /// Paint on every tick, even when no update ran.
    pub paint_every_frame: bool,

    /// Log the measured frame rate at `info` once per second.
    pub log_fps: bool,

    /// Frame pacing for [`GameLoop::run`]; 0 runs ticks back to back.
    pub target_fps: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_delta_ms: 100.0,
            paint_every_frame: false,
            log_fps: false,
            target_fps: 60,
        }
    }
}

/// Clonable stop switch for a running loop. Safe to use from any thread.
///
/// Stopping lets the tick in flight finish; no further tick starts.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn set_running(&self) {
        self.running.store(true, Ordering::Release);
    }
}

#[derive(Debug)]
struct FpsCounter {
    window_start: f64,
    frames: u32,
}

/// Fixed/variable timestep scheduler.
///
/// Each tick measures elapsed time, drains finished asset loads, runs zero or
/// more updates, then paints if anything changed.
///
/// With a fixed update rate `r` the loop keeps an accumulator: elapsed time
/// is added, and every whole `r` consumed runs one `update(r)`. Paint receives
/// `accumulator / r` for interpolation. With rate 0 every tick runs exactly
/// one `update(delta)` and paints with alpha 0.
pub struct GameLoop<G: Game, C: Clock = SystemClock> {
    game: G,
    platform: Platform,
    frames: FrameClock<C>,
    config: LoopConfig,
    handle: LoopHandle,
    accumulator: f32,
    initialized: bool,
    fps: Option<FpsCounter>,
}

impl<G: Game> GameLoop<G, SystemClock> {
    /// Loop driven by wall-clock time.
    pub fn new(game: G, platform: Platform, config: LoopConfig) -> Self {
        Self::with_clock(game, platform, SystemClock::new(), config)
    }
}

impl<G: Game, C: Clock> GameLoop<G, C> {
    pub fn with_clock(game: G, platform: Platform, clock: C, config: LoopConfig) -> Self {
        Self {
            game,
            platform,
            frames: FrameClock::new(clock, config.max_delta_ms),
            config,
            handle: LoopHandle::default(),
            accumulator: 0.0,
            initialized: false,
            fps: None,
        }
    }

    #[inline]
    pub fn game(&self) -> &G {
        &self.game
    }

    #[inline]
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    #[inline]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    #[inline]
    pub fn platform_mut(&mut self) -> &mut Platform {
        &mut self.platform
    }

    /// Time carried over toward the next fixed update, in milliseconds.
    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Moves to the running state. `Game::init` runs on the first start only.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }
        if !self.initialized {
            self.game.init(&mut self.platform).context("game init failed")?;
            self.initialized = true;
        }
        self.frames.reset();
        self.accumulator = 0.0;
        self.fps = self.config.log_fps.then(|| FpsCounter {
            window_start: self.frames.clock().now_ms(),
            frames: 0,
        });
        self.handle.set_running();
        log::debug!("game loop started (update rate {} ms)", self.game.update_rate());
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.is_running() {
            self.handle.stop();
            log::debug!("game loop stopped");
        }
    }

    /// Runs one frame. Does nothing while stopped.
    ///
    /// Errors from the game propagate unchanged; the accumulator keeps
    /// whatever time was not yet consumed.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        let time = self.frames.tick();
        let delta = time.delta_ms;

        let settled = self.platform.drain_assets();
        if settled > 0 {
            log::trace!("settled {settled} image load(s)");
        }

        let rate = self.game.update_rate();
        let mut dirty = false;
        if rate == 0 {
            self.game.update(delta)?;
            self.accumulator = 0.0;
            dirty = true;
        } else {
            let step = rate as f32;
            self.accumulator += delta;
            while self.accumulator >= step {
                self.game.update(step)?;
                self.accumulator -= step;
                dirty = true;
            }
        }

        if dirty || self.config.paint_every_frame {
            let alpha = if rate == 0 { 0.0 } else { self.accumulator / rate as f32 };
            self.game.paint(alpha)?;
        }

        log::trace!("frame {} (delta {delta:.2} ms)", time.frame_index);
        self.count_frame();
        Ok(())
    }

    fn count_frame(&mut self) {
        let Some(fps) = self.fps.as_mut() else {
            return;
        };
        fps.frames += 1;
        let now = self.frames.clock().now_ms();
        let elapsed = now - fps.window_start;
        if elapsed >= 1000.0 {
            log::info!("{:.1} fps", f64::from(fps.frames) * 1000.0 / elapsed);
            fps.window_start = now;
            fps.frames = 0;
        }
    }

    /// Starts the loop and ticks until stopped or the game fails.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.run_with(|_| Ok(()))
    }

    /// Like [`run`](Self::run), calling `after_tick` after every frame.
    ///
    /// `after_tick` may stop the loop through [`stop`](Self::stop) or a
    /// [`LoopHandle`]. An error from either side stops the loop and is returned.
    pub fn run_with<F>(&mut self, mut after_tick: F) -> anyhow::Result<()>
    where
        F: FnMut(&mut Self) -> anyhow::Result<()>,
    {
        self.start()?;
        let interval = match self.config.target_fps {
            0 => Duration::ZERO,
            fps => Duration::from_secs_f64(1.0 / f64::from(fps)),
        };

        while self.is_running() {
            let begin = Instant::now();
            let mut result = self.tick();
            if result.is_ok() {
                result = after_tick(self);
            }
            if let Err(e) = result {
                self.stop();
                return Err(e);
            }
            if let Some(rest) = interval.checked_sub(begin.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        self.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    #[derive(Default)]
    struct Recorder {
        rate: u32,
        inits: u32,
        updates: Vec<f32>,
        paints: Vec<f32>,
        fail_update: bool,
    }

    impl Game for Recorder {
        fn init(&mut self, _platform: &mut Platform) -> anyhow::Result<()> {
            self.inits += 1;
            Ok(())
        }

        fn update(&mut self, delta_ms: f32) -> anyhow::Result<()> {
            if self.fail_update {
                anyhow::bail!("update exploded");
            }
            self.updates.push(delta_ms);
            Ok(())
        }

        fn paint(&mut self, alpha: f32) -> anyhow::Result<()> {
            self.paints.push(alpha);
            Ok(())
        }

        fn update_rate(&self) -> u32 {
            self.rate
        }
    }

    fn started(rate: u32, config: LoopConfig) -> (GameLoop<Recorder, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let game = Recorder { rate, ..Recorder::default() };
        let mut lp = GameLoop::with_clock(game, Platform::default(), clock.clone(), config);
        lp.start().unwrap();
        (lp, clock)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ── fixed step ────────────────────────────────────────────────────────

    #[test]
    fn fixed_step_carries_remainder() {
        let (mut lp, clock) = started(20, LoopConfig::default());

        let mut accumulators = Vec::new();
        for _ in 0..3 {
            clock.advance(25.0);
            lp.tick().unwrap();
            accumulators.push(lp.accumulator());
        }

        assert!(close(accumulators[0], 5.0));
        assert!(close(accumulators[1], 10.0));
        assert!(close(accumulators[2], 15.0));
        assert_eq!(lp.game().updates, vec![20.0, 20.0, 20.0]);
        assert_eq!(lp.game().paints.len(), 3);
        assert!(close(lp.game().paints[2], 0.75));
    }

    #[test]
    fn short_ticks_skip_update_and_paint() {
        let (mut lp, clock) = started(20, LoopConfig::default());
        clock.advance(10.0);
        lp.tick().unwrap();
        assert!(lp.game().updates.is_empty());
        assert!(lp.game().paints.is_empty());

        clock.advance(10.0);
        lp.tick().unwrap();
        assert_eq!(lp.game().updates.len(), 1);
        assert_eq!(lp.game().paints, vec![0.0]);
    }

    #[test]
    fn paint_every_frame_paints_without_updates() {
        let config = LoopConfig { paint_every_frame: true, ..LoopConfig::default() };
        let (mut lp, clock) = started(20, config);
        clock.advance(5.0);
        lp.tick().unwrap();
        assert!(lp.game().updates.is_empty());
        assert_eq!(lp.game().paints.len(), 1);
        assert!(close(lp.game().paints[0], 0.25));
    }

    #[test]
    fn long_stall_is_clamped() {
        let (mut lp, clock) = started(20, LoopConfig::default());
        clock.advance(10_000.0);
        lp.tick().unwrap();
        assert_eq!(lp.game().updates.len(), 5);
        assert!(close(lp.accumulator(), 0.0));
    }

    // ── variable step ─────────────────────────────────────────────────────

    #[test]
    fn variable_step_updates_once_per_tick() {
        let (mut lp, clock) = started(0, LoopConfig::default());
        clock.advance(7.5);
        lp.tick().unwrap();
        clock.advance(250.0);
        lp.tick().unwrap();

        assert_eq!(lp.game().updates, vec![7.5, 100.0]);
        assert_eq!(lp.game().paints, vec![0.0, 0.0]);
        assert_eq!(lp.accumulator(), 0.0);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn stopped_loop_does_not_tick() {
        let (mut lp, clock) = started(0, LoopConfig::default());
        lp.handle().stop();
        clock.advance(16.0);
        lp.tick().unwrap();
        assert!(lp.game().updates.is_empty());

        // Restarting does not run init again.
        lp.start().unwrap();
        clock.advance(16.0);
        lp.tick().unwrap();
        assert_eq!(lp.game().updates, vec![16.0]);
        assert_eq!(lp.game().inits, 1);
    }

    #[test]
    fn update_errors_propagate() {
        let (mut lp, clock) = started(0, LoopConfig::default());
        lp.game_mut().fail_update = true;
        clock.advance(16.0);
        let err = lp.tick().unwrap_err();
        assert!(err.to_string().contains("update exploded"));
        assert!(lp.game().paints.is_empty());
    }

    #[test]
    fn run_with_stops_from_callback() {
        let clock = ManualClock::new();
        let game = Recorder { rate: 10, ..Recorder::default() };
        let config = LoopConfig { target_fps: 0, ..LoopConfig::default() };
        let mut lp = GameLoop::with_clock(game, Platform::default(), clock.clone(), config);

        let mut ticks = 0;
        lp.run_with(|lp| {
            ticks += 1;
            clock.advance(10.0);
            if ticks == 4 {
                lp.stop();
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(ticks, 4);
        assert!(!lp.is_running());
        // The first tick sees no elapsed time.
        assert_eq!(lp.game().updates.len(), 3);
    }

    #[test]
    fn run_with_returns_callback_errors() {
        let config = LoopConfig { target_fps: 0, ..LoopConfig::default() };
        let mut lp = GameLoop::with_clock(Recorder::default(), Platform::default(), ManualClock::new(), config);
        let err = lp.run_with(|_| anyhow::bail!("disk full")).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert!(!lp.is_running());
    }
}
