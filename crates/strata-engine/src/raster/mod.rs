//! CPU raster backend.
//!
//! Renders canvas commands into a premultiplied RGBA8 [`Pixmap`]:
//! - nonzero scan conversion with anti-aliased coverage (`coverage`)
//! - stroke expansion with caps, joins and miter limit (`stroker`)
//! - solid, gradient, pattern and image sources (`source`)
//! - glyph coverage from `fontdue` (`text`)
//!
//! Every pixel is combined through [`Composite::blend_with_coverage`], with
//! clip coverage multiplied in.
//!
//! [`Composite::blend_with_coverage`]: crate::paint::Composite::blend_with_coverage

mod coverage;
mod source;
mod stroker;
mod text;

use std::rc::Rc;

use crate::canvas::{Backend, DrawCmd};
use crate::coords::Vec2;
use crate::image::{Pixmap, PremulRgba8};
use crate::paint::PaintState;
use crate::text::FontSystem;

use coverage::{rasterize, Mask, PixelBounds};
use source::Source;
use stroker::StrokeStyle;

/// Maximum curve flattening error, in device pixels.
const TOLERANCE: f32 = 0.2;

/// Backend that draws into an owned pixmap.
///
/// The pixmap sits behind an `Rc`: [`snapshot`](Self::snapshot) hands out a
/// cheap shared copy, and the next draw copies the pixels only if that
/// snapshot is still alive.
#[derive(Debug, Clone)]
pub struct RasterBackend {
    pixmap: Rc<Pixmap>,
    fonts: Option<Rc<FontSystem>>,
}

impl RasterBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixmap: Rc::new(Pixmap::new(width, height)), fonts: None }
    }

    pub fn with_fonts(mut self, fonts: Rc<FontSystem>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn set_fonts(&mut self, fonts: Option<Rc<FontSystem>>) {
        self.fonts = fonts;
    }

    #[inline]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Shared view of the current pixels.
    #[inline]
    pub fn snapshot(&self) -> Rc<Pixmap> {
        Rc::clone(&self.pixmap)
    }

    fn fill_polygons(&mut self, polygons: &[Vec<Vec2>], source: &Source, state: &PaintState) {
        let (w, h) = self.size();
        let Some(bounds) = PixelBounds::covering(polygons.iter().flatten(), w, h) else {
            return;
        };
        let mask = rasterize(polygons, bounds);
        self.composite(mask, source, state);
    }

    fn composite(&mut self, mut mask: Mask, source: &Source, state: &PaintState) {
        let bounds = mask.bounds();
        for clip in &state.clips {
            mask.multiply(&rasterize(&clip.contours, bounds));
        }

        let op = state.composite;
        let pixmap = Rc::make_mut(&mut self.pixmap);
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                let cov = mask.get(x, y);
                if cov <= 0.0 {
                    continue;
                }
                let (ux, uy) = (x as u32, y as u32);
                let Some(dst) = pixmap.pixel(ux, uy) else {
                    continue;
                };
                let src = source.sample(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let out = op.blend_with_coverage(src, dst.to_color(), cov);
                pixmap.set_pixel(ux, uy, PremulRgba8::from_color(out));
            }
        }
    }

    fn fill_shape(&mut self, cmd: &DrawCmd, state: &PaintState, source: &Source) {
        let Some(path) = cmd.to_path() else {
            return;
        };
        let t = state.transform;
        let tol = TOLERANCE / t.uniform_scale().max(1e-3);
        let user: Vec<Vec<Vec2>> = if cmd.is_stroke() {
            let style = StrokeStyle {
                width: state.stroke_width,
                cap: state.line_cap,
                join: state.line_join,
                miter_limit: state.miter_limit,
                tolerance: tol,
            };
            stroker::stroke(&path.flatten(tol), &style)
        } else {
            path.flatten(tol).into_iter().map(|c| c.points).collect()
        };
        let device: Vec<Vec<Vec2>> =
            user.into_iter().map(|poly| poly.into_iter().map(|p| t.apply(p)).collect()).collect();
        self.fill_polygons(&device, source, state);
    }

    fn draw_text(&mut self, text: &str, origin: Vec2, state: &PaintState) {
        let Some(style) = state.font else {
            log::warn!("draw_text skipped: no font set");
            return;
        };
        let Some(fonts) = self.fonts.clone() else {
            log::warn!("draw_text skipped: backend has no font system");
            return;
        };
        let Some(source) = Source::fill(state) else {
            return;
        };
        let (w, h) = self.size();
        if let Some(mask) = text::text_mask(&fonts, style, text, origin, &state.transform, w, h) {
            self.composite(mask, &source, state);
        }
    }
}

impl Backend for RasterBackend {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn draw(&mut self, cmd: &DrawCmd, state: &PaintState) {
        match cmd {
            DrawCmd::Clear => Rc::make_mut(&mut self.pixmap).fill(PremulRgba8::TRANSPARENT),
            DrawCmd::Text { text, origin } => self.draw_text(text, *origin, state),
            DrawCmd::Image { pixmap, src, dst } => {
                if let Some(source) = Source::image(Rc::clone(pixmap), *src, *dst, state) {
                    self.fill_shape(cmd, state, &source);
                }
            }
            DrawCmd::Point(_) => self.fill_shape(cmd, state, &Source::stroke(state)),
            _ if cmd.is_stroke() => self.fill_shape(cmd, state, &Source::stroke(state)),
            _ => {
                if let Some(source) = Source::fill(state) {
                    self.fill_shape(cmd, state, &source);
                }
            }
        }
    }
}
