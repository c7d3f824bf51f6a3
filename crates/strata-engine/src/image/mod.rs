//! Image resources.
//!
//! - `Pixmap`: owned premultiplied RGBA8 pixels
//! - `Image`: shared handle that is pending, ready, or failed
//! - `ImageLoader`: single-use handle the asset collaborator settles

mod image;
mod pixmap;

pub use image::{Image, ImageLoader, LoadError};
pub use pixmap::{Pixmap, PremulRgba8};
