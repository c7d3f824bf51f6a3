use crate::paint::PaintState;

use super::{Backend, DrawCmd};

/// A single recorded item: the command plus the state it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub cmd: DrawCmd,
    pub state: PaintState,
}

/// Recording backend.
///
/// Captures the command stream a canvas produces, in issue order. Used to
/// observe paint traversals in tests and as the per-frame surface behind
/// `SurfaceLayer`, which replays it into its parent canvas.
///
/// Performance characteristics:
/// - `draw()` is O(1) plus a clone of the state (gradients, patterns and
///   clips are `Rc`-shared)
/// - `reset()` keeps allocated capacity for reuse across frames
#[derive(Debug, Default)]
pub struct DrawList {
    width: u32,
    height: u32,
    items: Vec<DrawItem>,
}

impl DrawList {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, items: Vec::new() }
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Returns items in issue order (back to front).
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the recorded commands without their states.
    pub fn cmds(&self) -> impl Iterator<Item = &DrawCmd> {
        self.items.iter().map(|i| &i.cmd)
    }
}

impl Backend for DrawList {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&mut self, cmd: &DrawCmd, state: &PaintState) {
        // Everything before a clear is invisible.
        if matches!(cmd, DrawCmd::Clear) {
            self.items.clear();
        }
        self.items.push(DrawItem { cmd: cmd.clone(), state: state.clone() });
    }
}
