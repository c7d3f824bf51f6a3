use std::fmt;
use std::rc::Rc;

use crate::coords::{Rect, Transform2D, Vec2};
use crate::image::{Image, Pixmap};
use crate::paint::{
    ClipRegion, Color, Composite, Fill, Gradient, LineCap, LineJoin, PaintState, Pattern, TextStyle,
};
use crate::text::FontId;

use super::{Backend, DrawCmd, DrawList, Path};

/// Flattening tolerance for clip paths, in device pixels.
const CLIP_TOLERANCE: f32 = 0.1;

/// Counters of canvas calls, for diagnostics and tests.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CanvasStats {
    /// Every public drawing, state or transform call.
    pub calls: u64,
    pub saves: u64,
    pub restores: u64,
    /// Commands handed to the backend.
    pub draws: u64,
}

/// Stateful 2D drawing surface.
///
/// A canvas owns a stack of [`PaintState`] (never empty) and forwards each
/// primitive to its backend together with the top state. All coordinates are
/// in user space, mapped to device space by the state's transform.
pub struct Canvas<B: Backend> {
    backend: B,
    states: Vec<PaintState>,
    dirty: bool,
    stats: CanvasStats,
}

impl<B: Backend> fmt::Debug for Canvas<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.backend.size();
        f.debug_struct("Canvas")
            .field("width", &w)
            .field("height", &h)
            .field("depth", &self.depth())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<B: Backend> Canvas<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            states: vec![PaintState::default()],
            dirty: false,
            stats: CanvasStats::default(),
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.backend.size().0 as f32
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.backend.size().1 as f32
    }

    /// The attributes the next primitive will be drawn with.
    #[inline]
    pub fn state(&self) -> &PaintState {
        // The stack is never empty: `restore` refuses to pop the base state.
        &self.states[self.states.len() - 1]
    }

    #[inline]
    fn state_mut(&mut self) -> &mut PaintState {
        self.stats.calls += 1;
        let top = self.states.len() - 1;
        &mut self.states[top]
    }

    /// Number of unmatched `save` calls.
    #[inline]
    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.state().alpha
    }

    #[inline]
    pub fn current_transform(&self) -> Transform2D {
        self.state().transform
    }

    #[inline]
    pub fn stats(&self) -> CanvasStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CanvasStats::default();
    }

    /// Returns true when something was drawn since the last [`clear_dirty`](Self::clear_dirty).
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn emit(&mut self, cmd: DrawCmd) -> &mut Self {
        self.stats.calls += 1;
        self.stats.draws += 1;
        self.dirty = true;
        let top = self.states.len() - 1;
        self.backend.draw(&cmd, &self.states[top]);
        self
    }

    // ── state stack ───────────────────────────────────────────────────────

    /// Pushes a copy of the current state.
    pub fn save(&mut self) -> &mut Self {
        self.stats.calls += 1;
        self.stats.saves += 1;
        let copy = self.state().clone();
        self.states.push(copy);
        self
    }

    /// Pops the state pushed by the matching [`save`](Self::save).
    ///
    /// # Panics
    /// Panics when there is no matching `save`.
    pub fn restore(&mut self) -> &mut Self {
        assert!(self.states.len() > 1, "unbalanced save/restore");
        self.stats.calls += 1;
        self.stats.restores += 1;
        self.states.pop();
        self
    }

    // ── transform ─────────────────────────────────────────────────────────

    pub fn translate(&mut self, dx: f32, dy: f32) -> &mut Self {
        let s = self.state_mut();
        s.transform = s.transform.translate(dx, dy);
        self
    }

    pub fn scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        let s = self.state_mut();
        s.transform = s.transform.scale(sx, sy);
        self
    }

    pub fn rotate(&mut self, radians: f32) -> &mut Self {
        let s = self.state_mut();
        s.transform = s.transform.rotate(radians);
        self
    }

    /// Multiplies the current transform by the given matrix, applied in local space.
    pub fn transform(&mut self, m00: f32, m01: f32, m10: f32, m11: f32, tx: f32, ty: f32) -> &mut Self {
        let s = self.state_mut();
        s.transform = Transform2D::new(m00, m01, m10, m11, tx, ty).compose(&s.transform);
        self
    }

    /// Replaces the current transform.
    pub fn set_transform(&mut self, m00: f32, m01: f32, m10: f32, m11: f32, tx: f32, ty: f32) -> &mut Self {
        self.state_mut().transform = Transform2D::new(m00, m01, m10, m11, tx, ty);
        self
    }

    // ── paint attributes ──────────────────────────────────────────────────

    pub fn set_fill_color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.state_mut().fill = Fill::Color(color.into());
        self
    }

    pub fn set_fill_gradient(&mut self, gradient: Rc<Gradient>) -> &mut Self {
        self.state_mut().fill = Fill::Gradient(gradient);
        self
    }

    pub fn set_fill_pattern(&mut self, pattern: Rc<Pattern>) -> &mut Self {
        self.state_mut().fill = Fill::Pattern(pattern);
        self
    }

    pub fn set_stroke_color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.state_mut().stroke_color = color.into();
        self
    }

    pub fn set_stroke_width(&mut self, width: f32) -> &mut Self {
        self.state_mut().stroke_width = width;
        self
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        self.state_mut().line_cap = cap;
        self
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        self.state_mut().line_join = join;
        self
    }

    pub fn set_miter_limit(&mut self, limit: f32) -> &mut Self {
        self.state_mut().miter_limit = limit;
        self
    }

    pub fn set_composite_operation(&mut self, op: Composite) -> &mut Self {
        self.state_mut().composite = op;
        self
    }

    /// Sets the ambient alpha, which scales every subsequent fill and stroke.
    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        self.state_mut().alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn set_font(&mut self, font: FontId, size: f32) -> &mut Self {
        self.state_mut().font = Some(TextStyle { font, size });
        self
    }

    // ── clipping ──────────────────────────────────────────────────────────

    /// Intersects the clip with a user-space rectangle.
    pub fn clip_rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        let mut p = Path::new();
        p.rect(Rect::new(x, y, w, h));
        self.clip(&p)
    }

    /// Intersects the clip with a user-space path (nonzero fill rule).
    pub fn clip(&mut self, path: &Path) -> &mut Self {
        let s = self.state_mut();
        let t = s.transform;
        let contours = path
            .flatten(CLIP_TOLERANCE / t.uniform_scale().max(1e-3))
            .into_iter()
            .map(|c| c.points.into_iter().map(|p| t.apply(p)).collect())
            .collect();
        s.clips.push(Rc::new(ClipRegion::new(contours)));
        self
    }

    // ── primitives ────────────────────────────────────────────────────────

    pub fn clear(&mut self) -> &mut Self {
        self.emit(DrawCmd::Clear)
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        self.emit(DrawCmd::FillRect(Rect::new(x, y, w, h)))
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        self.emit(DrawCmd::StrokeRect(Rect::new(x, y, w, h)))
    }

    pub fn fill_round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) -> &mut Self {
        self.emit(DrawCmd::FillRoundRect { rect: Rect::new(x, y, w, h), radius })
    }

    pub fn stroke_round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) -> &mut Self {
        self.emit(DrawCmd::StrokeRoundRect { rect: Rect::new(x, y, w, h), radius })
    }

    pub fn fill_circle(&mut self, x: f32, y: f32, radius: f32) -> &mut Self {
        self.emit(DrawCmd::FillCircle { center: Vec2::new(x, y), radius })
    }

    pub fn stroke_circle(&mut self, x: f32, y: f32, radius: f32) -> &mut Self {
        self.emit(DrawCmd::StrokeCircle { center: Vec2::new(x, y), radius })
    }

    pub fn fill_path(&mut self, path: &Path) -> &mut Self {
        self.emit(DrawCmd::FillPath(path.clone()))
    }

    pub fn stroke_path(&mut self, path: &Path) -> &mut Self {
        self.emit(DrawCmd::StrokePath(path.clone()))
    }

    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> &mut Self {
        self.emit(DrawCmd::Line { from: Vec2::new(x0, y0), to: Vec2::new(x1, y1) })
    }

    pub fn draw_point(&mut self, x: f32, y: f32) -> &mut Self {
        self.emit(DrawCmd::Point(Vec2::new(x, y)))
    }

    /// Draws `text` with its baseline starting at `(x, y)` in the current font.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32) -> &mut Self {
        self.emit(DrawCmd::Text { text: text.to_owned(), origin: Vec2::new(x, y) })
    }

    // ── images ────────────────────────────────────────────────────────────
    //
    // Images that are still loading (or failed to load) are skipped silently.

    /// Draws the whole image at its natural size with its top-left at `(x, y)`.
    pub fn draw_image(&mut self, image: &Image, x: f32, y: f32) -> &mut Self {
        match image.pixmap() {
            Some(pm) => {
                let (w, h) = (pm.width() as f32, pm.height() as f32);
                self.draw_pixmap(pm, Rect::new(0.0, 0.0, w, h), Rect::new(x, y, w, h))
            }
            None => self,
        }
    }

    /// Draws the whole image centered on `(x, y)`.
    pub fn draw_image_centered(&mut self, image: &Image, x: f32, y: f32) -> &mut Self {
        let (w, h) = (image.width(), image.height());
        self.draw_image(image, x - w * 0.5, y - h * 0.5)
    }

    /// Draws the whole image scaled into the destination rectangle.
    pub fn draw_image_scaled(&mut self, image: &Image, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        match image.pixmap() {
            Some(pm) => {
                let src = Rect::new(0.0, 0.0, pm.width() as f32, pm.height() as f32);
                self.draw_pixmap(pm, src, Rect::new(x, y, w, h))
            }
            None => self,
        }
    }

    /// Draws the source sub-rectangle of the image into the destination rectangle.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_region(
        &mut self,
        image: &Image,
        sx: f32,
        sy: f32,
        sw: f32,
        sh: f32,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) -> &mut Self {
        match image.pixmap() {
            Some(pm) => self.draw_pixmap(pm, Rect::new(sx, sy, sw, sh), Rect::new(dx, dy, dw, dh)),
            None => self,
        }
    }

    /// Blits raw pixels; the ready-image paths end here.
    pub fn draw_pixmap(&mut self, pixmap: Rc<Pixmap>, src: Rect, dst: Rect) -> &mut Self {
        self.emit(DrawCmd::Image { pixmap, src, dst })
    }

    // ── replay ────────────────────────────────────────────────────────────

    /// Draws a recorded command list on top of this canvas.
    ///
    /// Each item keeps its own attributes, nested inside the current state:
    /// its transform is applied after the current one, its alpha is scaled by
    /// the current alpha and the current clips still apply. A recorded clear
    /// only discards what was recorded before it, so it is not replayed.
    pub fn replay(&mut self, list: &DrawList) -> &mut Self {
        self.stats.calls += 1;
        let outer = self.state().clone();
        for item in list.items() {
            if matches!(item.cmd, DrawCmd::Clear) {
                continue;
            }
            let mut state = item.state.clone();
            state.transform = item.state.transform.compose(&outer.transform);
            state.alpha *= outer.alpha;
            state.clips = item
                .state
                .clips
                .iter()
                .map(|c| Rc::new(c.transformed(&outer.transform)))
                .chain(outer.clips.iter().cloned())
                .collect();
            self.stats.draws += 1;
            self.dirty = true;
            self.backend.draw(&item.cmd, &state);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PremulRgba8;

    fn canvas() -> Canvas<DrawList> {
        Canvas::new(DrawList::new(100, 100))
    }

    // ── save / restore ────────────────────────────────────────────────────

    #[test]
    fn balanced_save_restore_returns_to_start() {
        let mut c = canvas();
        c.set_fill_color(0xFF11_2233u32).translate(5.0, 5.0);
        let before = c.state().clone();

        for i in 0..4 {
            c.save();
            c.set_alpha(0.1 * i as f32)
                .rotate(0.3)
                .set_stroke_width(7.0)
                .set_composite_operation(Composite::Xor)
                .clip_rect(0.0, 0.0, 10.0, 10.0);
        }
        assert_eq!(c.depth(), 4);
        for _ in 0..4 {
            c.restore();
        }

        assert_eq!(c.depth(), 0);
        assert_eq!(c.state(), &before);
    }

    #[test]
    #[should_panic(expected = "unbalanced save/restore")]
    fn restore_without_save_panics() {
        canvas().restore();
    }

    #[test]
    fn save_shares_gradient() {
        let mut c = canvas();
        let g = Rc::new(Gradient::linear(0.0, 0.0, 1.0, 0.0, &[Color::BLACK], &[0.0]));
        c.set_fill_gradient(Rc::clone(&g)).save();
        assert_eq!(Rc::strong_count(&g), 3);
        c.restore();
        assert_eq!(Rc::strong_count(&g), 2);
    }

    // ── fills ─────────────────────────────────────────────────────────────

    #[test]
    fn fill_kinds_are_mutually_exclusive() {
        let mut c = canvas();
        let pm = Rc::new(Pixmap::new(1, 1));
        c.set_fill_pattern(Rc::new(Pattern::new(pm, true, true)));
        c.set_fill_color(Color::WHITE);
        assert_eq!(c.state().fill, Fill::Color(Color::WHITE));
    }

    #[test]
    fn draw_records_current_state() {
        let mut c = canvas();
        c.translate(10.0, 20.0).set_fill_color(0x80FF_0000u32).fill_rect(0.0, 0.0, 5.0, 5.0);
        let item = &c.backend().items()[0];
        assert_eq!(item.state.transform.translation_part(), Vec2::new(10.0, 20.0));
        assert_eq!(item.state.fill, Fill::Color(Color(0x80FF_0000)));
        assert!(c.is_dirty());
        assert_eq!(c.stats().draws, 1);
    }

    #[test]
    fn transform_composes_in_local_space() {
        let mut c = canvas();
        c.scale(2.0, 2.0).transform(1.0, 0.0, 0.0, 1.0, 3.0, 0.0);
        let p = c.current_transform().apply(Vec2::zero());
        assert_eq!(p, Vec2::new(6.0, 0.0));

        c.set_transform(1.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        assert_eq!(c.current_transform().apply(Vec2::zero()), Vec2::new(1.0, 1.0));
    }

    // ── images ────────────────────────────────────────────────────────────

    #[test]
    fn pending_image_draws_nothing() {
        let mut c = canvas();
        let (image, _loader) = Image::pending();
        c.draw_image(&image, 0.0, 0.0)
            .draw_image_scaled(&image, 0.0, 0.0, 4.0, 4.0)
            .draw_image_region(&image, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0);
        assert!(c.backend().is_empty());
        assert!(!c.is_dirty());
    }

    #[test]
    fn ready_image_uses_natural_size() {
        let mut c = canvas();
        let mut pm = Pixmap::new(4, 3);
        pm.fill(PremulRgba8::new(0, 0, 0, 255));
        c.draw_image_centered(&Image::ready(pm), 10.0, 10.0);
        match &c.backend().items()[0].cmd {
            DrawCmd::Image { src, dst, .. } => {
                assert_eq!(*src, Rect::new(0.0, 0.0, 4.0, 3.0));
                assert_eq!(*dst, Rect::new(8.0, 8.5, 4.0, 3.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // ── replay ────────────────────────────────────────────────────────────

    #[test]
    fn replay_nests_recorded_state() {
        let mut surface = canvas();
        surface.set_alpha(0.5).translate(1.0, 0.0).fill_rect(0.0, 0.0, 1.0, 1.0);

        let mut c = canvas();
        c.translate(10.0, 0.0).set_alpha(0.5).replay(surface.backend());

        let item = &c.backend().items()[0];
        assert!((item.state.alpha - 0.25).abs() < 1e-6);
        assert_eq!(item.state.transform.apply(Vec2::zero()), Vec2::new(11.0, 0.0));
    }
}
