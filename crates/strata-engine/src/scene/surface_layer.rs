use crate::canvas::{Backend, Canvas, DrawList};

/// Leaf layer the caller redraws every frame.
///
/// Commands drawn between [`begin`](Self::begin) calls are recorded and
/// replayed into the parent canvas when the layer is painted, nested in the
/// layer's transform, alpha and clip. Nothing is rasterized offscreen.
#[derive(Debug)]
pub struct SurfaceLayer {
    surface: Canvas<DrawList>,
}

impl SurfaceLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { surface: Canvas::new(DrawList::new(width, height)) }
    }

    /// Discards the previous frame and returns a fresh surface to draw on.
    pub fn begin(&mut self) -> &mut Canvas<DrawList> {
        let mut list = std::mem::take(self.surface.backend_mut());
        list.reset();
        self.surface = Canvas::new(list);
        &mut self.surface
    }

    /// The surface as currently recorded.
    #[inline]
    pub fn surface(&self) -> &Canvas<DrawList> {
        &self.surface
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.surface.width()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.surface.height()
    }

    pub fn paint<B: Backend>(&self, canvas: &mut Canvas<B>) {
        canvas.replay(self.surface.backend());
    }
}
