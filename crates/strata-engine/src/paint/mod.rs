//! Paint model shared by the canvas and its backends.
//!
//! Scope:
//! - color representation (packed ARGB in, premultiplied float for blending)
//! - fill sources (solid, gradients, image patterns)
//! - composite operators and stroke styling
//! - the saved/restored `PaintState`
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod composite;
pub mod gradient;
pub mod pattern;
pub mod state;
pub mod stroke;

pub use color::{Color, PremulColor};
pub use composite::Composite;
pub use gradient::{ColorStop, Gradient, GradientShape, SpreadMode};
pub use pattern::Pattern;
pub use state::{ClipRegion, Fill, PaintState, TextStyle};
pub use stroke::{LineCap, LineJoin};
