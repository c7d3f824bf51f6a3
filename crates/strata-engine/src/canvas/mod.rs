//! Immediate-mode drawing.
//!
//! Responsibilities:
//! - the stateful `Canvas` with its save/restore attribute stack
//! - the value-type `Path`
//! - the `Backend` seam and the renderer-agnostic `DrawCmd` stream
//! - `DrawList`, a backend that records instead of drawing

mod backend;
mod canvas;
mod cmd;
mod list;
mod path;

pub use backend::Backend;
pub use canvas::{Canvas, CanvasStats};
pub use cmd::DrawCmd;
pub use list::{DrawItem, DrawList};
pub use path::{Contour, Path, PathCmd};
