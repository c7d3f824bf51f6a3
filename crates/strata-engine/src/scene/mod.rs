//! Retained layer tree.
//!
//! Responsibilities:
//! - own layers in a generational arena (`SceneGraph`)
//! - keep parent/child links acyclic and single-parented
//! - paint back to front through a `Canvas`, nesting transform, alpha and clip
//! - report the topmost leaf under a point

mod canvas_layer;
mod graph;
mod image_layer;
mod layer;
mod surface_layer;

pub use canvas_layer::CanvasLayer;
pub use graph::{SceneError, SceneGraph};
pub use image_layer::ImageLayer;
pub use layer::{GroupLayer, Layer, LayerHooks, LayerId, LayerKind};
pub use surface_layer::SurfaceLayer;
