use std::rc::Rc;

use crate::coords::{Rect, Transform2D, Vec2};
use crate::image::Pixmap;
use crate::paint::{Fill, Gradient, PaintState, Pattern, PremulColor};

/// Color source sampled at device-space pixel centers.
///
/// Non-solid sources carry the inverse of their user-to-device mapping, so
/// sampling walks back into the space the gradient, pattern or image was
/// defined in.
pub(crate) enum Source {
    Solid(PremulColor),
    Gradient { gradient: Rc<Gradient>, inverse: Transform2D, alpha: f32 },
    Pattern { pattern: Rc<Pattern>, inverse: Transform2D, alpha: f32 },
    Image { pixmap: Rc<Pixmap>, inverse: Transform2D, src: Rect, alpha: f32 },
}

impl Source {
    /// Source for fills and text. `None` when the transform is singular.
    pub fn fill(state: &PaintState) -> Option<Source> {
        Some(match &state.fill {
            Fill::Color(c) => Source::Solid(c.to_premul().scaled(state.alpha)),
            Fill::Gradient(g) => Source::Gradient {
                gradient: Rc::clone(g),
                inverse: state.transform.invert()?,
                alpha: state.alpha,
            },
            Fill::Pattern(p) => Source::Pattern {
                pattern: Rc::clone(p),
                inverse: state.transform.invert()?,
                alpha: state.alpha,
            },
        })
    }

    pub fn stroke(state: &PaintState) -> Source {
        Source::Solid(state.stroke_color.to_premul().scaled(state.alpha))
    }

    /// Source that maps `src` (image pixels) onto `dst` (user space).
    pub fn image(pixmap: Rc<Pixmap>, src: Rect, dst: Rect, state: &PaintState) -> Option<Source> {
        if src.width() == 0.0 || src.height() == 0.0 {
            return None;
        }
        let to_user = Transform2D::translation(-src.x(), -src.y())
            .compose(&Transform2D::scaling(dst.width() / src.width(), dst.height() / src.height()))
            .compose(&Transform2D::translation(dst.x(), dst.y()));
        let inverse = to_user.compose(&state.transform).invert()?;
        Some(Source::Image { pixmap, inverse, src: src.normalized(), alpha: state.alpha })
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(self, Source::Solid(_))
    }

    pub fn sample(&self, p: Vec2) -> PremulColor {
        match self {
            Source::Solid(c) => *c,
            Source::Gradient { gradient, inverse, alpha } => {
                gradient.color_at(inverse.apply(p)).scaled(*alpha)
            }
            Source::Pattern { pattern, inverse, alpha } => {
                pattern.color_at(inverse.apply(p)).scaled(*alpha)
            }
            Source::Image { pixmap, inverse, src, alpha } => {
                let q = inverse.apply(p);
                if !src.contains(q) {
                    return PremulColor::transparent();
                }
                pixmap.sample_nearest(q.x, q.y).unwrap_or_default().scaled(*alpha)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PremulRgba8;
    use crate::paint::Color;

    #[test]
    fn solid_fill_scales_color_alpha() {
        let state = PaintState {
            fill: Fill::Color(Color::argb(255, 255, 0, 0)),
            alpha: 0.25,
            ..PaintState::default()
        };
        let c = Source::fill(&state).unwrap().sample(Vec2::zero());
        assert!((c.a - 0.25).abs() < 1e-6);
        assert!((c.r - 0.25).abs() < 1e-6);
    }

    #[test]
    fn image_source_maps_region_into_destination() {
        let mut pm = Pixmap::new(4, 1);
        pm.set_pixel(2, 0, PremulRgba8::new(0, 255, 0, 255));
        let state = PaintState::default();
        // Pixel 2 of the image stretched over x ∈ [10, 20).
        let src = Source::image(Rc::new(pm), Rect::new(2.0, 0.0, 1.0, 1.0), Rect::new(10.0, 0.0, 10.0, 1.0), &state)
            .unwrap();
        assert_eq!(src.sample(Vec2::new(15.5, 0.5)).g, 1.0);
        assert_eq!(src.sample(Vec2::new(9.5, 0.5)), PremulColor::transparent());
    }

    #[test]
    fn singular_transform_has_no_gradient_source() {
        let g = Gradient::linear(0.0, 0.0, 1.0, 0.0, &[Color::BLACK], &[0.0]);
        let state = PaintState {
            fill: Fill::Gradient(Rc::new(g)),
            transform: Transform2D::scaling(0.0, 1.0),
            ..PaintState::default()
        };
        assert!(Source::fill(&state).is_none());
    }
}
