use std::rc::Rc;

use crate::canvas::{Backend, Canvas};
use crate::coords::Rect;
use crate::raster::RasterBackend;
use crate::text::FontSystem;

/// Leaf layer backed by a persistent offscreen bitmap.
///
/// Draw into it through [`canvas_mut`](Self::canvas_mut) whenever its content
/// changes; painting the layer blits a snapshot of the bitmap. The bitmap is
/// released when the layer is destroyed.
#[derive(Debug)]
pub struct CanvasLayer {
    canvas: Canvas<RasterBackend>,
}

impl CanvasLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { canvas: Canvas::new(RasterBackend::new(width, height)) }
    }

    /// An offscreen canvas that can draw text with `fonts`.
    pub fn with_fonts(width: u32, height: u32, fonts: Rc<FontSystem>) -> Self {
        Self { canvas: Canvas::new(RasterBackend::new(width, height).with_fonts(fonts)) }
    }

    #[inline]
    pub fn canvas(&self) -> &Canvas<RasterBackend> {
        &self.canvas
    }

    #[inline]
    pub fn canvas_mut(&mut self) -> &mut Canvas<RasterBackend> {
        &mut self.canvas
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.canvas.width()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.canvas.height()
    }

    pub fn paint<B: Backend>(&self, canvas: &mut Canvas<B>) {
        let bounds = Rect::new(0.0, 0.0, self.width(), self.height());
        canvas.draw_pixmap(self.canvas.backend().snapshot(), bounds, bounds);
    }
}
