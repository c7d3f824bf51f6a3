use std::fmt;

use crate::coords::{Transform2D, Vec2};

use super::{CanvasLayer, ImageLayer, SurfaceLayer};

/// Generational handle to a layer stored in a [`SceneGraph`](super::SceneGraph).
///
/// Handles are plain values. Once the layer is destroyed its slot may be
/// reused, but the generation no longer matches, so a stale handle is
/// detected instead of silently addressing the new occupant.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct LayerId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}v{})", self.index, self.generation)
    }
}

/// Container layer: owns an ordered list of children.
///
/// List order is paint order, back to front.
#[derive(Debug, Default)]
pub struct GroupLayer {
    pub(crate) children: Vec<LayerId>,
    /// Optional clip size; children are clipped to `(0, 0, w, h)` in local space.
    pub clip: Option<Vec2>,
}

impl GroupLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A group whose children are clipped to `width × height`.
    pub fn clipped(width: f32, height: f32) -> Self {
        Self { children: Vec::new(), clip: Some(Vec2::new(width, height)) }
    }

    #[inline]
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }
}

/// What a layer draws.
#[derive(Debug)]
pub enum LayerKind {
    Group(GroupLayer),
    Image(ImageLayer),
    Canvas(CanvasLayer),
    Surface(SurfaceLayer),
}

impl LayerKind {
    /// Leaves whose content is still loading are skipped by paint traversal.
    pub fn is_ready(&self) -> bool {
        match self {
            LayerKind::Group(_) => true,
            LayerKind::Image(l) => l.is_ready(),
            LayerKind::Canvas(_) | LayerKind::Surface(_) => true,
        }
    }

    /// Hit-testable extent in local space; `None` for groups.
    pub fn size(&self) -> Option<Vec2> {
        match self {
            LayerKind::Group(_) => None,
            LayerKind::Image(l) => Some(Vec2::new(l.width(), l.height())),
            LayerKind::Canvas(l) => Some(Vec2::new(l.width(), l.height())),
            LayerKind::Surface(l) => Some(Vec2::new(l.width(), l.height())),
        }
    }
}

impl From<GroupLayer> for LayerKind {
    fn from(g: GroupLayer) -> Self {
        LayerKind::Group(g)
    }
}

impl From<ImageLayer> for LayerKind {
    fn from(l: ImageLayer) -> Self {
        LayerKind::Image(l)
    }
}

impl From<CanvasLayer> for LayerKind {
    fn from(l: CanvasLayer) -> Self {
        LayerKind::Canvas(l)
    }
}

impl From<SurfaceLayer> for LayerKind {
    fn from(l: SurfaceLayer) -> Self {
        LayerKind::Surface(l)
    }
}

/// A node of the scene graph.
///
/// `transform` places the layer in its parent's space; `origin` is the pivot
/// that rotation and scale act around. With origin `o` and translation `t`,
/// local point `o` lands on `t` in the parent.
#[derive(Debug)]
pub struct Layer {
    pub(crate) transform: Transform2D,
    pub(crate) origin: Vec2,
    pub(crate) alpha: f32,
    pub(crate) visible: bool,
    pub(crate) parent: Option<LayerId>,
    pub(crate) kind: LayerKind,
}

impl Layer {
    pub(crate) fn new(kind: LayerKind) -> Self {
        Self {
            transform: Transform2D::identity(),
            origin: Vec2::zero(),
            alpha: 1.0,
            visible: true,
            parent: None,
            kind,
        }
    }

    #[inline]
    pub fn transform(&self) -> Transform2D {
        self.transform
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    #[inline]
    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    #[inline]
    pub fn kind_mut(&mut self) -> &mut LayerKind {
        &mut self.kind
    }

    pub fn set_transform(&mut self, transform: Transform2D) -> &mut Self {
        self.transform = transform;
        self
    }

    /// Moves the layer within its parent.
    pub fn translate(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.transform.tx += dx;
        self.transform.ty += dy;
        self
    }

    pub fn set_translation(&mut self, x: f32, y: f32) -> &mut Self {
        self.transform.tx = x;
        self.transform.ty = y;
        self
    }

    /// Rotates about the origin pivot.
    pub fn rotate(&mut self, radians: f32) -> &mut Self {
        self.transform = self.transform.rotate(radians);
        self
    }

    /// Scales about the origin pivot.
    pub fn scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        self.transform = self.transform.scale(sx, sy);
        self
    }

    pub fn set_origin(&mut self, x: f32, y: f32) -> &mut Self {
        self.origin = Vec2::new(x, y);
        self
    }

    /// # Panics
    /// Panics unless `0 <= alpha <= 1`.
    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        assert!((0.0..=1.0).contains(&alpha), "layer alpha must be in [0, 1], got {alpha}");
        self.alpha = alpha;
        self
    }

    /// Hidden layers and their subtrees are skipped entirely when painting.
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    pub fn as_group(&self) -> Option<&GroupLayer> {
        match &self.kind {
            LayerKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupLayer> {
        match &mut self.kind {
            LayerKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageLayer> {
        match &mut self.kind {
            LayerKind::Image(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_canvas_mut(&mut self) -> Option<&mut CanvasLayer> {
        match &mut self.kind {
            LayerKind::Canvas(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_surface_mut(&mut self) -> Option<&mut SurfaceLayer> {
        match &mut self.kind {
            LayerKind::Surface(l) => Some(l),
            _ => None,
        }
    }

    /// Maps a point from the parent's space into this layer's local space.
    pub fn parent_to_local(&self, p: Vec2) -> Option<Vec2> {
        let t = self.transform;
        let linear = Transform2D::new(t.m00, t.m01, t.m10, t.m11, 0.0, 0.0).invert()?;
        Some(linear.apply(p - t.translation_part()) + self.origin)
    }
}

/// Attachment seam for platform backends that mirror the scene with native objects.
///
/// Each hook fires for the layer it names only, once per event.
pub trait LayerHooks {
    fn on_add(&mut self, layer: LayerId, parent: LayerId) {
        let _ = (layer, parent);
    }

    fn on_remove(&mut self, layer: LayerId, parent: LayerId) {
        let _ = (layer, parent);
    }

    fn on_destroy(&mut self, layer: LayerId) {
        let _ = layer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn translate_moves_in_parent_space() {
        let mut l = Layer::new(GroupLayer::new().into());
        l.scale(2.0, 2.0).translate(3.0, 4.0);
        assert_eq!(l.transform().translation_part(), Vec2::new(3.0, 4.0));
    }

    #[test]
    #[should_panic(expected = "layer alpha must be in [0, 1]")]
    fn alpha_out_of_range_panics() {
        Layer::new(GroupLayer::new().into()).set_alpha(1.5);
    }

    #[test]
    fn parent_to_local_undoes_pivoted_rotation() {
        let mut l = Layer::new(GroupLayer::new().into());
        l.set_origin(5.0, 5.0).set_translation(20.0, 20.0).rotate(FRAC_PI_2);
        // The pivot lands on the translation.
        assert!(close(l.parent_to_local(Vec2::new(20.0, 20.0)).unwrap(), Vec2::new(5.0, 5.0)));
        // A quarter turn maps local +x to parent +y.
        assert!(close(l.parent_to_local(Vec2::new(20.0, 21.0)).unwrap(), Vec2::new(6.0, 5.0)));
    }

    #[test]
    fn singular_layer_has_no_local_space() {
        let mut l = Layer::new(GroupLayer::new().into());
        l.scale(0.0, 1.0);
        assert!(l.parent_to_local(Vec2::zero()).is_none());
    }
}
