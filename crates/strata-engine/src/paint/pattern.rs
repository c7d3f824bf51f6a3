use std::rc::Rc;

use crate::coords::Vec2;
use crate::image::Pixmap;

use super::PremulColor;

/// Image fill that tiles along the enabled axes.
///
/// Along a repeated axis the image tiles at its natural size. Along a
/// non-repeated axis the image covers `[0, size)` once and is transparent
/// outside of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pixmap: Rc<Pixmap>,
    pub repeat_x: bool,
    pub repeat_y: bool,
}

impl Pattern {
    pub fn new(pixmap: Rc<Pixmap>, repeat_x: bool, repeat_y: bool) -> Self {
        Self { pixmap, repeat_x, repeat_y }
    }

    #[inline]
    pub fn pixmap(&self) -> &Rc<Pixmap> {
        &self.pixmap
    }

    /// Premultiplied color at a user-space point.
    pub fn color_at(&self, p: Vec2) -> PremulColor {
        let (w, h) = (self.pixmap.width() as f32, self.pixmap.height() as f32);
        if w <= 0.0 || h <= 0.0 {
            return PremulColor::transparent();
        }
        let x = if self.repeat_x { p.x.rem_euclid(w) } else { p.x };
        let y = if self.repeat_y { p.y.rem_euclid(h) } else { p.y };
        self.pixmap.sample_nearest(x, y).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PremulRgba8;

    fn checker() -> Rc<Pixmap> {
        let mut pm = Pixmap::new(2, 1);
        pm.set_pixel(0, 0, PremulRgba8::new(255, 0, 0, 255));
        pm.set_pixel(1, 0, PremulRgba8::new(0, 0, 255, 255));
        Rc::new(pm)
    }

    #[test]
    fn repeated_axis_wraps() {
        let pat = Pattern::new(checker(), true, false);
        assert_eq!(pat.color_at(Vec2::new(2.5, 0.5)).r, 1.0);
        assert_eq!(pat.color_at(Vec2::new(-0.5, 0.5)).b, 1.0);
    }

    #[test]
    fn unrepeated_axis_is_transparent_outside() {
        let pat = Pattern::new(checker(), true, false);
        assert_eq!(pat.color_at(Vec2::new(0.5, 1.5)), PremulColor::transparent());
    }
}
