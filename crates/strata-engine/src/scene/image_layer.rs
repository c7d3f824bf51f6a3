use std::rc::Rc;

use crate::canvas::{Backend, Canvas};
use crate::coords::Rect;
use crate::image::Image;
use crate::paint::Pattern;

/// Leaf layer that draws an image, possibly still loading.
///
/// Sizing: an explicit width or height wins; otherwise the image's natural
/// size is used. Drawing modes are exclusive: either a source sub-rectangle
/// is stretched over the layer, or the image is tiled along the repeated
/// axes. A repeated axis tiles at the image's natural size; an axis that is
/// not repeated stretches the image over the layer.
#[derive(Debug)]
pub struct ImageLayer {
    image: Image,
    width: Option<f32>,
    height: Option<f32>,
    source_rect: Option<Rect>,
    repeat_x: bool,
    repeat_y: bool,
}

impl ImageLayer {
    pub fn new(image: Image) -> Self {
        Self { image, width: None, height: None, source_rect: None, repeat_x: false, repeat_y: false }
    }

    #[inline]
    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn set_image(&mut self, image: Image) -> &mut Self {
        self.image = image;
        self
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.image.is_ready()
    }

    /// Explicit width, else the natural width (0 while loading).
    pub fn width(&self) -> f32 {
        self.width.unwrap_or_else(|| self.image.width())
    }

    /// Explicit height, else the natural height (0 while loading).
    pub fn height(&self) -> f32 {
        self.height.unwrap_or_else(|| self.image.height())
    }

    /// # Panics
    /// Panics unless `width > 0`.
    pub fn set_width(&mut self, width: f32) -> &mut Self {
        assert!(width > 0.0, "image layer width must be > 0, got {width}");
        self.width = Some(width);
        self
    }

    /// # Panics
    /// Panics unless `height > 0`.
    pub fn set_height(&mut self, height: f32) -> &mut Self {
        assert!(height > 0.0, "image layer height must be > 0, got {height}");
        self.height = Some(height);
        self
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> &mut Self {
        self.set_width(width).set_height(height)
    }

    /// Returns to the image's natural size.
    pub fn clear_size(&mut self) -> &mut Self {
        self.width = None;
        self.height = None;
        self
    }

    #[inline]
    pub fn source_rect(&self) -> Option<Rect> {
        self.source_rect
    }

    /// Draws only `rect` (image pixels) of the image.
    ///
    /// # Panics
    /// Panics while either repeat flag is set.
    pub fn set_source_rect(&mut self, rect: Rect) -> &mut Self {
        assert!(
            !self.repeat_x && !self.repeat_y,
            "image layer source rect cannot be combined with repeat"
        );
        self.source_rect = Some(rect);
        self
    }

    pub fn clear_source_rect(&mut self) -> &mut Self {
        self.source_rect = None;
        self
    }

    #[inline]
    pub fn repeat_x(&self) -> bool {
        self.repeat_x
    }

    #[inline]
    pub fn repeat_y(&self) -> bool {
        self.repeat_y
    }

    /// # Panics
    /// Panics when enabling repeat while a source rect is set.
    pub fn set_repeat_x(&mut self, repeat: bool) -> &mut Self {
        assert!(
            !repeat || self.source_rect.is_none(),
            "image layer repeat cannot be combined with a source rect"
        );
        self.repeat_x = repeat;
        self
    }

    /// # Panics
    /// Panics when enabling repeat while a source rect is set.
    pub fn set_repeat_y(&mut self, repeat: bool) -> &mut Self {
        assert!(
            !repeat || self.source_rect.is_none(),
            "image layer repeat cannot be combined with a source rect"
        );
        self.repeat_y = repeat;
        self
    }

    /// Draws into local space. A layer whose image is not ready draws nothing.
    pub fn paint<B: Backend>(&self, canvas: &mut Canvas<B>) {
        let Some(pixmap) = self.image.pixmap() else {
            return;
        };
        let (iw, ih) = (pixmap.width() as f32, pixmap.height() as f32);
        let (w, h) = (self.width(), self.height());
        if iw <= 0.0 || ih <= 0.0 || w <= 0.0 || h <= 0.0 {
            return;
        }

        if self.repeat_x || self.repeat_y {
            let sx = if self.repeat_x { 1.0 } else { w / iw };
            let sy = if self.repeat_y { 1.0 } else { h / ih };
            canvas
                .set_fill_pattern(Rc::new(Pattern::new(pixmap, self.repeat_x, self.repeat_y)))
                .scale(sx, sy)
                .fill_rect(0.0, 0.0, w / sx, h / sy);
        } else {
            let src = self.source_rect.unwrap_or(Rect::new(0.0, 0.0, iw, ih));
            canvas.draw_pixmap(pixmap, src, Rect::new(0.0, 0.0, w, h));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCmd, DrawList};
    use crate::image::Pixmap;
    use crate::paint::Fill;

    fn ready(w: u32, h: u32) -> Image {
        Image::ready(Pixmap::new(w, h))
    }

    fn record(layer: &ImageLayer) -> Canvas<DrawList> {
        let mut c = Canvas::new(DrawList::new(64, 64));
        layer.paint(&mut c);
        c
    }

    // ── sizing ────────────────────────────────────────────────────────────

    #[test]
    fn size_falls_back_to_natural() {
        let mut l = ImageLayer::new(ready(8, 4));
        assert_eq!((l.width(), l.height()), (8.0, 4.0));
        l.set_width(20.0);
        assert_eq!((l.width(), l.height()), (20.0, 4.0));
        l.clear_size();
        assert_eq!(l.width(), 8.0);
    }

    #[test]
    #[should_panic(expected = "width must be > 0")]
    fn zero_width_panics() {
        ImageLayer::new(ready(1, 1)).set_width(0.0);
    }

    #[test]
    #[should_panic(expected = "height must be > 0")]
    fn negative_height_panics() {
        ImageLayer::new(ready(1, 1)).set_height(-3.0);
    }

    // ── exclusive modes ───────────────────────────────────────────────────

    #[test]
    #[should_panic(expected = "cannot be combined with repeat")]
    fn source_rect_while_repeating_panics() {
        let mut l = ImageLayer::new(ready(4, 4));
        l.set_repeat_x(true).set_source_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
    }

    #[test]
    #[should_panic(expected = "cannot be combined with a source rect")]
    fn repeat_while_source_rect_panics() {
        let mut l = ImageLayer::new(ready(4, 4));
        l.set_source_rect(Rect::new(0.0, 0.0, 2.0, 2.0)).set_repeat_y(true);
    }

    // ── paint ─────────────────────────────────────────────────────────────

    #[test]
    fn pending_image_paints_nothing() {
        let (image, _loader) = Image::pending();
        let c = record(&ImageLayer::new(image));
        assert!(c.backend().is_empty());
    }

    #[test]
    fn source_rect_stretches_over_layer() {
        let mut l = ImageLayer::new(ready(8, 8));
        l.set_source_rect(Rect::new(2.0, 2.0, 4.0, 4.0)).set_size(16.0, 16.0);
        let c = record(&l);
        assert_eq!(
            c.backend().items()[0].cmd,
            DrawCmd::Image {
                pixmap: l.image().pixmap().unwrap(),
                src: Rect::new(2.0, 2.0, 4.0, 4.0),
                dst: Rect::new(0.0, 0.0, 16.0, 16.0),
            }
        );
    }

    #[test]
    fn repeat_x_tiles_horizontally_and_stretches_vertically() {
        let mut l = ImageLayer::new(ready(4, 2));
        l.set_repeat_x(true).set_size(10.0, 6.0);
        let c = record(&l);
        let item = &c.backend().items()[0];
        assert!(matches!(item.state.fill, Fill::Pattern(ref p) if p.repeat_x && !p.repeat_y));
        // y is stretched 3×, x stays at natural size.
        assert_eq!(item.state.transform.m00, 1.0);
        assert_eq!(item.state.transform.m11, 3.0);
        assert_eq!(item.cmd, DrawCmd::FillRect(Rect::new(0.0, 0.0, 10.0, 2.0)));
    }
}
