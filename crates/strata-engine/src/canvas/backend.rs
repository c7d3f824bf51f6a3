use crate::paint::PaintState;

use super::DrawCmd;

/// The drawing seam every platform implements.
///
/// A canvas is generic over its backend, so the concrete backend is fixed at
/// compile time and commands never need a runtime type check. Backends draw
/// immediately; they never hold on to the state they were given.
pub trait Backend {
    /// Target size in device pixels.
    fn size(&self) -> (u32, u32);

    /// Draws one command with the given attributes.
    fn draw(&mut self, cmd: &DrawCmd, state: &PaintState);
}
