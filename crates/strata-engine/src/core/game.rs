use super::platform::Platform;

/// Game contract driven by [`GameLoop`](crate::time::GameLoop).
///
/// Every callback runs on the render thread. Errors are not swallowed: they
/// stop the tick in flight and surface to the host.
pub trait Game {
    /// Called once before the first tick. Load assets and build the scene here.
    fn init(&mut self, platform: &mut Platform) -> anyhow::Result<()> {
        let _ = platform;
        Ok(())
    }

    /// Advances the simulation by `delta_ms` milliseconds.
    ///
    /// With a fixed update rate `delta_ms` always equals [`update_rate`](Self::update_rate).
    fn update(&mut self, delta_ms: f32) -> anyhow::Result<()>;

    /// Draws the current state.
    ///
    /// `alpha` is the fraction of the next fixed step already elapsed, in
    /// `[0, 1)`, for interpolating between the last two updates. Always 0 in
    /// variable-step mode.
    fn paint(&mut self, alpha: f32) -> anyhow::Result<()>;

    /// Fixed update interval in milliseconds; 0 selects variable step.
    fn update_rate(&self) -> u32 {
        0
    }
}
