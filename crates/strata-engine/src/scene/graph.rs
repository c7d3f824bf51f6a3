use std::fmt;

use crate::canvas::{Backend, Canvas};
use crate::coords::{Rect, Vec2};
use crate::image::Image;

use super::{
    CanvasLayer, GroupLayer, ImageLayer, Layer, LayerHooks, LayerId, LayerKind, SurfaceLayer,
};

/// Scene mutation that violates the tree invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The layer already has a parent; remove it first.
    AlreadyParented { layer: LayerId, parent: LayerId },
    /// Adding the layer would make a group its own ancestor.
    Cycle { layer: LayerId, group: LayerId },
    /// The root layer cannot be added, removed or destroyed.
    Root,
    NotAGroup(LayerId),
    NotAChild { layer: LayerId, group: LayerId },
    IndexOutOfBounds { index: usize, len: usize },
    /// The handle refers to a destroyed layer.
    Destroyed(LayerId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::AlreadyParented { layer, parent } => {
                write!(f, "layer {layer:?} already has parent {parent:?}; remove it first")
            }
            SceneError::Cycle { layer, group } => {
                write!(f, "adding {layer:?} to {group:?} would create a cycle")
            }
            SceneError::Root => f.write_str("the root layer cannot be re-parented or destroyed"),
            SceneError::NotAGroup(id) => write!(f, "layer {id:?} is not a group"),
            SceneError::NotAChild { layer, group } => {
                write!(f, "layer {layer:?} is not a child of {group:?}")
            }
            SceneError::IndexOutOfBounds { index, len } => {
                write!(f, "child index {index} out of bounds for group of {len}")
            }
            SceneError::Destroyed(id) => write!(f, "layer {id:?} was destroyed"),
        }
    }
}

impl std::error::Error for SceneError {}

#[derive(Debug)]
struct Slot {
    generation: u32,
    layer: Option<Layer>,
}

/// Arena-backed layer tree with a permanent root group.
///
/// Layers are created detached and join the tree through [`add`](Self::add).
/// A group owns its children: destroying it destroys the whole subtree.
/// Parent links are handles used only to detach a layer, never for ownership.
///
/// Confined to the render thread; nothing here locks.
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: LayerId,
    hooks: Option<Box<dyn LayerHooks>>,
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("root", &self.root)
            .field("live", &self.live_count())
            .finish()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = LayerId { index: 0, generation: 0 };
        Self {
            slots: vec![Slot { generation: 0, layer: Some(Layer::new(GroupLayer::new().into())) }],
            free: Vec::new(),
            root,
            hooks: None,
        }
    }

    #[inline]
    pub fn root(&self) -> LayerId {
        self.root
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn LayerHooks>) {
        self.hooks = Some(hooks);
    }

    /// Number of live layers, root included.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.layer.is_some()).count()
    }

    // ── creation ──────────────────────────────────────────────────────────

    /// Stores a new detached layer.
    pub fn create(&mut self, kind: impl Into<LayerKind>) -> LayerId {
        let layer = Layer::new(kind.into());
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.layer = Some(layer);
                LayerId { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, layer: Some(layer) });
                LayerId { index, generation: 0 }
            }
        }
    }

    pub fn create_group(&mut self) -> LayerId {
        self.create(GroupLayer::new())
    }

    pub fn create_image(&mut self, image: Image) -> LayerId {
        self.create(ImageLayer::new(image))
    }

    pub fn create_canvas(&mut self, width: u32, height: u32) -> LayerId {
        self.create(CanvasLayer::new(width, height))
    }

    pub fn create_surface(&mut self, width: u32, height: u32) -> LayerId {
        self.create(SurfaceLayer::new(width, height))
    }

    // ── access ────────────────────────────────────────────────────────────

    /// Returns true while `id` refers to a live layer.
    pub fn contains(&self, id: LayerId) -> bool {
        self.try_layer(id).is_ok()
    }

    pub fn try_layer(&self, id: LayerId) -> Result<&Layer, SceneError> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.layer.as_ref())
            .ok_or(SceneError::Destroyed(id))
    }

    pub fn try_layer_mut(&mut self, id: LayerId) -> Result<&mut Layer, SceneError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.layer.as_mut())
            .ok_or(SceneError::Destroyed(id))
    }

    /// # Panics
    /// Panics when the layer was destroyed.
    pub fn layer(&self, id: LayerId) -> &Layer {
        self.try_layer(id).unwrap_or_else(|e| panic!("{e}"))
    }

    /// # Panics
    /// Panics when the layer was destroyed.
    pub fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        self.try_layer_mut(id).unwrap_or_else(|e| panic!("{e}"))
    }

    fn group(&self, id: LayerId) -> Result<&GroupLayer, SceneError> {
        self.try_layer(id)?.as_group().ok_or(SceneError::NotAGroup(id))
    }

    fn group_mut(&mut self, id: LayerId) -> Result<&mut GroupLayer, SceneError> {
        self.try_layer_mut(id)?.as_group_mut().ok_or(SceneError::NotAGroup(id))
    }

    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.layer(id).parent
    }

    /// Children of `group` in paint order.
    pub fn children(&self, group: LayerId) -> &[LayerId] {
        self.group(group).map(GroupLayer::children).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn size(&self, group: LayerId) -> usize {
        self.children(group).len()
    }

    pub fn get(&self, group: LayerId, index: usize) -> Option<LayerId> {
        self.children(group).get(index).copied()
    }

    // ── tree mutation ─────────────────────────────────────────────────────

    /// Appends `layer` to `group`.
    ///
    /// # Panics
    /// Panics on any [`SceneError`]; see [`try_add_at`](Self::try_add_at).
    pub fn add(&mut self, group: LayerId, layer: LayerId) {
        if let Err(e) = self.try_add(group, layer) {
            panic!("{e}");
        }
    }

    /// Inserts `layer` at `index` among `group`'s children.
    pub fn add_at(&mut self, group: LayerId, index: usize, layer: LayerId) {
        if let Err(e) = self.try_add_at(group, index, layer) {
            panic!("{e}");
        }
    }

    /// Sets the layer's translation, then appends it.
    pub fn add_translated(&mut self, group: LayerId, layer: LayerId, tx: f32, ty: f32) {
        self.layer_mut(layer).set_translation(tx, ty);
        self.add(group, layer);
    }

    pub fn try_add(&mut self, group: LayerId, layer: LayerId) -> Result<(), SceneError> {
        let len = self.group(group)?.children.len();
        self.try_add_at(group, len, layer)
    }

    /// Inserts `layer` into `group`.
    ///
    /// Fails when the layer already has a parent (even `group` itself), when it
    /// is the root, when it is `group` or one of its ancestors, or when either
    /// handle is stale.
    pub fn try_add_at(&mut self, group: LayerId, index: usize, layer: LayerId) -> Result<(), SceneError> {
        if layer == self.root {
            return Err(SceneError::Root);
        }
        let len = self.group(group)?.children.len();
        if let Some(parent) = self.try_layer(layer)?.parent {
            return Err(SceneError::AlreadyParented { layer, parent });
        }
        if index > len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }
        let mut cursor = Some(group);
        while let Some(id) = cursor {
            if id == layer {
                return Err(SceneError::Cycle { layer, group });
            }
            cursor = self.try_layer(id)?.parent;
        }

        self.group_mut(group)?.children.insert(index, layer);
        self.layer_mut(layer).parent = Some(group);
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_add(layer, group);
        }
        Ok(())
    }

    /// Detaches `layer` from `group`. The layer stays alive.
    pub fn remove(&mut self, group: LayerId, layer: LayerId) {
        if let Err(e) = self.try_remove(group, layer) {
            panic!("{e}");
        }
    }

    pub fn try_remove(&mut self, group: LayerId, layer: LayerId) -> Result<(), SceneError> {
        let index = self
            .group(group)?
            .children
            .iter()
            .position(|&c| c == layer)
            .ok_or(SceneError::NotAChild { layer, group })?;
        self.detach_at(group, index).map(|_| ())
    }

    /// Detaches and returns the child at `index`.
    pub fn remove_at(&mut self, group: LayerId, index: usize) -> LayerId {
        self.detach_at(group, index).unwrap_or_else(|e| panic!("{e}"))
    }

    fn detach_at(&mut self, group: LayerId, index: usize) -> Result<LayerId, SceneError> {
        let children = &mut self.group_mut(group)?.children;
        if index >= children.len() {
            return Err(SceneError::IndexOutOfBounds { index, len: children.len() });
        }
        let layer = children.remove(index);
        if let Ok(l) = self.try_layer_mut(layer) {
            l.parent = None;
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_remove(layer, group);
        }
        Ok(layer)
    }

    /// Detaches every child of `group`, last first. The children stay alive.
    pub fn clear(&mut self, group: LayerId) {
        while let Some(last) = self.size(group).checked_sub(1) {
            self.remove_at(group, last);
        }
    }

    /// Destroys `layer` and, for a group, its whole subtree.
    ///
    /// The layer is detached from its parent first; children are destroyed
    /// before their container. The handle (and every handle into the subtree)
    /// is dead afterwards.
    ///
    /// # Panics
    /// Panics for the root or a destroyed handle.
    pub fn destroy(&mut self, layer: LayerId) {
        assert!(layer != self.root, "{}", SceneError::Root);
        if let Some(parent) = self.layer(layer).parent {
            self.remove(parent, layer);
        }
        self.destroy_subtree(layer);
    }

    /// Destroys every child of `group` but keeps the group.
    pub fn destroy_all(&mut self, group: LayerId) {
        let children = std::mem::take(&mut self.group_mut(group).unwrap_or_else(|e| panic!("{e}")).children);
        for child in children.into_iter().rev() {
            self.destroy_subtree(child);
        }
    }

    fn destroy_subtree(&mut self, layer: LayerId) {
        let children = match self.layer_mut(layer).as_group_mut() {
            Some(g) => std::mem::take(&mut g.children),
            None => Vec::new(),
        };
        for child in children.into_iter().rev() {
            self.destroy_subtree(child);
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_destroy(layer);
        }
        let slot = &mut self.slots[layer.index as usize];
        // Dropping the layer releases whatever it owns (offscreen bitmaps, recordings).
        slot.layer = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(layer.index);
        log::trace!("destroyed layer {layer:?}");
    }

    // ── painting ──────────────────────────────────────────────────────────

    /// Paints the whole tree, back to front.
    pub fn paint<B: Backend>(&self, canvas: &mut Canvas<B>) {
        self.paint_layer(self.root, canvas);
    }

    /// Paints one layer and its subtree.
    pub fn paint_layer<B: Backend>(&self, id: LayerId, canvas: &mut Canvas<B>) {
        let layer = self.layer(id);
        if !layer.visible || !layer.kind.is_ready() {
            return;
        }

        canvas.save();
        let t = layer.transform;
        let o = layer.origin;
        canvas
            .translate(o.x, o.y)
            .transform(t.m00, t.m01, t.m10, t.m11, t.tx - o.x, t.ty - o.y)
            .translate(-o.x, -o.y);
        let alpha = canvas.alpha() * layer.alpha;
        canvas.set_alpha(alpha);

        match &layer.kind {
            LayerKind::Group(g) => {
                if let Some(clip) = g.clip {
                    canvas.clip_rect(0.0, 0.0, clip.x, clip.y);
                }
                for &child in &g.children {
                    self.paint_layer(child, canvas);
                }
            }
            LayerKind::Image(l) => l.paint(canvas),
            LayerKind::Canvas(l) => l.paint(canvas),
            LayerKind::Surface(l) => l.paint(canvas),
        }
        canvas.restore();
    }

    // ── hit testing ───────────────────────────────────────────────────────

    /// Topmost visible leaf under `point` (root space).
    pub fn hit_test(&self, point: Vec2) -> Option<LayerId> {
        self.hit_layer(self.root, point)
    }

    fn hit_layer(&self, id: LayerId, point: Vec2) -> Option<LayerId> {
        let layer = self.try_layer(id).ok()?;
        if !layer.visible {
            return None;
        }
        let local = layer.parent_to_local(point)?;
        match &layer.kind {
            LayerKind::Group(g) => {
                if let Some(clip) = g.clip {
                    if !Rect::new(0.0, 0.0, clip.x, clip.y).contains(local) {
                        return None;
                    }
                }
                g.children.iter().rev().find_map(|&c| self.hit_layer(c, local))
            }
            kind => {
                let size = kind.size()?;
                Rect::new(0.0, 0.0, size.x, size.y).contains(local).then_some(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCmd, DrawList};
    use crate::image::Pixmap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn canvas() -> Canvas<DrawList> {
        Canvas::new(DrawList::new(200, 200))
    }

    fn image(w: u32, h: u32) -> Image {
        Image::ready(Pixmap::new(w, h))
    }

    /// A surface layer that fills one rect whose x is its tag.
    fn tagged(scene: &mut SceneGraph, tag: f32) -> LayerId {
        let id = scene.create_surface(10, 10);
        if let Some(s) = scene.layer_mut(id).as_surface_mut() {
            s.begin().fill_rect(tag, 0.0, 1.0, 1.0);
        }
        id
    }

    fn tags(c: &Canvas<DrawList>) -> Vec<f32> {
        c.backend()
            .cmds()
            .filter_map(|cmd| match cmd {
                DrawCmd::FillRect(r) => Some(r.x()),
                _ => None,
            })
            .collect()
    }

    #[derive(Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl LayerHooks for Recorder {
        fn on_add(&mut self, layer: LayerId, _parent: LayerId) {
            self.0.borrow_mut().push(format!("add {}", layer.index));
        }
        fn on_remove(&mut self, layer: LayerId, _parent: LayerId) {
            self.0.borrow_mut().push(format!("remove {}", layer.index));
        }
        fn on_destroy(&mut self, layer: LayerId) {
            self.0.borrow_mut().push(format!("destroy {}", layer.index));
        }
    }

    // ── paint order ───────────────────────────────────────────────────────

    #[test]
    fn children_paint_in_list_order() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        for tag in [1.0, 2.0, 3.0] {
            let id = tagged(&mut scene, tag);
            scene.add(root, id);
        }
        // Child transforms do not affect ordering.
        let last = scene.get(root, 2).unwrap();
        scene.layer_mut(last).translate(-50.0, 0.0).rotate(1.0);

        let mut c = canvas();
        scene.paint(&mut c);
        assert_eq!(tags(&c), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn add_at_inserts_before() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = tagged(&mut scene, 1.0);
        let b = tagged(&mut scene, 2.0);
        scene.add(root, a);
        scene.add_at(root, 0, b);

        let mut c = canvas();
        scene.paint(&mut c);
        assert_eq!(tags(&c), vec![2.0, 1.0]);
    }

    // ── transforms and alpha ──────────────────────────────────────────────

    #[test]
    fn alpha_multiplies_down_the_tree() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let outer = scene.create_group();
        let inner = scene.create_group();
        let leaf = tagged(&mut scene, 0.0);
        scene.add(root, outer);
        scene.add(outer, inner);
        scene.add(inner, leaf);
        scene.layer_mut(outer).set_alpha(0.8);
        scene.layer_mut(inner).set_alpha(0.5);
        scene.layer_mut(leaf).set_alpha(0.5);

        let mut c = canvas();
        scene.paint(&mut c);
        let alpha = c.backend().items()[0].state.alpha;
        assert!((alpha - 0.2).abs() < 1e-6, "alpha was {alpha}");
    }

    #[test]
    fn siblings_are_isolated() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = tagged(&mut scene, 0.0);
        let b = tagged(&mut scene, 0.0);
        scene.add_translated(root, a, 40.0, 0.0);
        scene.add(root, b);
        scene.layer_mut(a).set_alpha(0.5);

        let mut c = canvas();
        scene.paint(&mut c);
        let items = c.backend().items();
        assert_eq!(items[0].state.transform.translation_part(), Vec2::new(40.0, 0.0));
        assert!(items[1].state.transform.is_identity());
        assert_eq!(items[1].state.alpha, 1.0);
        assert_eq!(c.depth(), 0);
        assert_eq!(c.stats().saves, c.stats().restores);
    }

    #[test]
    fn origin_is_the_rotation_pivot() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let leaf = tagged(&mut scene, 0.0);
        scene.add(root, leaf);
        scene
            .layer_mut(leaf)
            .set_origin(5.0, 5.0)
            .set_translation(50.0, 50.0)
            .rotate(std::f32::consts::PI);

        let mut c = canvas();
        scene.paint(&mut c);
        let t = c.backend().items()[0].state.transform;
        let pivot = t.apply(Vec2::new(5.0, 5.0));
        let corner = t.apply(Vec2::new(0.0, 0.0));
        assert!((pivot.x - 50.0).abs() < 1e-4 && (pivot.y - 50.0).abs() < 1e-4);
        assert!((corner.x - 55.0).abs() < 1e-4 && (corner.y - 55.0).abs() < 1e-4);
    }

    // ── visibility and readiness ──────────────────────────────────────────

    #[test]
    fn hidden_group_issues_no_canvas_calls() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let group = scene.create_group();
        scene.add(root, group);
        for tag in [1.0, 2.0] {
            let id = tagged(&mut scene, tag);
            scene.add(group, id);
        }
        scene.layer_mut(group).set_visible(false);

        let mut c = canvas();
        scene.paint_layer(group, &mut c);
        assert_eq!(c.stats().calls, 0);

        // Hidden state remains mutable.
        scene.layer_mut(group).translate(1.0, 1.0);
        scene.layer_mut(group).set_visible(true);
        scene.paint_layer(group, &mut c);
        assert_eq!(tags(&c), vec![1.0, 2.0]);
    }

    #[test]
    fn pending_image_layer_is_skipped() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let (pending, loader) = Image::pending();
        let id = scene.create_image(pending);
        scene.add(root, id);

        let mut c = canvas();
        scene.paint_layer(id, &mut c);
        assert_eq!(c.stats().calls, 0);

        loader.complete(Pixmap::new(2, 2));
        scene.paint_layer(id, &mut c);
        assert_eq!(c.stats().draws, 1);
    }

    #[test]
    fn failed_image_layer_keeps_skipping() {
        let mut scene = SceneGraph::new();
        let (pending, loader) = Image::pending();
        let id = scene.create_image(pending);
        drop(loader);

        let mut c = canvas();
        scene.paint_layer(id, &mut c);
        assert_eq!(c.stats().calls, 0);
    }

    // ── tree invariants ───────────────────────────────────────────────────

    #[test]
    fn clear_is_idempotent() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        for tag in [1.0, 2.0, 3.0, 4.0] {
            let id = tagged(&mut scene, tag);
            scene.add(root, id);
        }
        scene.clear(root);
        assert_eq!(scene.size(root), 0);
        scene.clear(root);
        assert_eq!(scene.size(root), 0);

        let mut c = canvas();
        scene.paint(&mut c);
        assert_eq!(c.stats().draws, 0);
    }

    #[test]
    fn clear_removes_from_the_end() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = SceneGraph::new();
        scene.set_hooks(Box::new(Recorder(Rc::clone(&log))));
        let root = scene.root();
        let a = scene.create_group();
        let b = scene.create_group();
        scene.add(root, a);
        scene.add(root, b);
        scene.clear(root);

        let log = log.borrow();
        assert_eq!(
            *log,
            vec![
                format!("add {}", a.index),
                format!("add {}", b.index),
                format!("remove {}", b.index),
                format!("remove {}", a.index),
            ]
        );
        assert!(scene.parent(a).is_none());
    }

    #[test]
    #[should_panic(expected = "already has parent")]
    fn reparent_without_remove_panics() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let g1 = scene.create_group();
        let g2 = scene.create_group();
        let leaf = scene.create_group();
        scene.add(root, g1);
        scene.add(root, g2);
        scene.add(g1, leaf);
        scene.add(g2, leaf);
    }

    #[test]
    fn reparent_after_remove_succeeds() {
        let mut scene = SceneGraph::new();
        let g1 = scene.create_group();
        let g2 = scene.create_group();
        let leaf = scene.create_group();
        scene.add(g1, leaf);
        scene.remove(g1, leaf);
        scene.add(g2, leaf);
        assert_eq!(scene.parent(leaf), Some(g2));
        assert_eq!(scene.size(g1), 0);
    }

    #[test]
    fn cycles_and_root_are_rejected() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let outer = scene.create_group();
        let inner = scene.create_group();
        scene.add(outer, inner);

        assert_eq!(scene.try_add(inner, outer), Err(SceneError::Cycle { layer: outer, group: inner }));
        assert_eq!(scene.try_add(outer, outer), Err(SceneError::Cycle { layer: outer, group: outer }));
        assert_eq!(scene.try_add(outer, root), Err(SceneError::Root));
    }

    #[test]
    fn leaves_are_not_groups() {
        let mut scene = SceneGraph::new();
        let leaf = scene.create_image(image(1, 1));
        let other = scene.create_group();
        assert_eq!(scene.try_add(leaf, other), Err(SceneError::NotAGroup(leaf)));
    }

    #[test]
    fn removing_a_stranger_fails() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let stray = scene.create_group();
        assert_eq!(
            scene.try_remove(root, stray),
            Err(SceneError::NotAChild { layer: stray, group: root })
        );
    }

    // ── destroy ───────────────────────────────────────────────────────────

    #[test]
    fn destroy_is_post_order_and_detaches() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let group = scene.create_group();
        let child = scene.create_canvas(4, 4);
        scene.add(root, group);
        scene.add(group, child);
        scene.set_hooks(Box::new(Recorder(Rc::clone(&log))));

        scene.destroy(group);

        assert_eq!(
            *log.borrow(),
            vec![
                format!("remove {}", group.index),
                format!("destroy {}", child.index),
                format!("destroy {}", group.index),
            ]
        );
        assert_eq!(scene.size(root), 0);
        assert!(!scene.contains(group));
        assert!(!scene.contains(child));
        assert_eq!(scene.live_count(), 1);
    }

    #[test]
    fn stale_handles_are_detected_after_slot_reuse() {
        let mut scene = SceneGraph::new();
        let old = scene.create_group();
        scene.destroy(old);
        let new = scene.create_group();
        assert_eq!(old.index, new.index);
        assert_ne!(old, new);
        assert_eq!(scene.try_layer(old).err(), Some(SceneError::Destroyed(old)));
        assert!(scene.contains(new));
    }

    #[test]
    #[should_panic(expected = "was destroyed")]
    fn using_a_destroyed_layer_panics() {
        let mut scene = SceneGraph::new();
        let id = scene.create_group();
        scene.destroy(id);
        scene.layer_mut(id).set_alpha(0.5);
    }

    #[test]
    fn destroy_all_keeps_the_group() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = scene.create_group();
        let b = scene.create_surface(2, 2);
        scene.add(root, a);
        scene.add(a, b);
        scene.destroy_all(root);
        assert_eq!(scene.size(root), 0);
        assert!(!scene.contains(a) && !scene.contains(b));
        assert!(scene.contains(root));
    }

    // ── hit testing ───────────────────────────────────────────────────────

    #[test]
    fn hit_test_prefers_topmost() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let below = scene.create_image(image(10, 10));
        let above = scene.create_image(image(10, 10));
        scene.add_translated(root, below, 0.0, 0.0);
        scene.add_translated(root, above, 5.0, 5.0);

        assert_eq!(scene.hit_test(Vec2::new(7.0, 7.0)), Some(above));
        assert_eq!(scene.hit_test(Vec2::new(2.0, 2.0)), Some(below));
        assert_eq!(scene.hit_test(Vec2::new(50.0, 50.0)), None);

        scene.layer_mut(above).set_visible(false);
        assert_eq!(scene.hit_test(Vec2::new(7.0, 7.0)), Some(below));
    }

    #[test]
    fn hit_test_respects_scale_and_group_clip() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let group = scene.create(GroupLayer::clipped(15.0, 15.0));
        let leaf = scene.create_image(image(10, 10));
        scene.add(root, group);
        scene.add(group, leaf);
        scene.layer_mut(leaf).scale(2.0, 2.0);

        assert_eq!(scene.hit_test(Vec2::new(12.0, 12.0)), Some(leaf));
        // Inside the scaled leaf but outside the group's clip.
        assert_eq!(scene.hit_test(Vec2::new(18.0, 18.0)), None);
    }
}
