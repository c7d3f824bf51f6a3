//! Coordinate and geometry types shared by the canvas, the scene graph and backends.
//!
//! Canonical space:
//! - canvas units (one unit is one pixel on an untransformed raster target)
//! - origin top-left
//! - +X right, +Y down

mod rect;
mod transform;
mod vec2;

pub use rect::Rect;
pub use transform::Transform2D;
pub use vec2::Vec2;
