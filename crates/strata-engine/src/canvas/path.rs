use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::coords::{Rect, Vec2};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCmd {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// A polyline produced by flattening one subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

/// Vector path in user space.
///
/// Paths are plain values: every backend consumes the same type, so a path
/// built for one canvas can be drawn by any other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cmds: Vec<PathCmd>,
    start: Option<Vec2>,
    current: Option<Vec2>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cmds(&self) -> &[PathCmd] {
        &self.cmds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    #[inline]
    pub fn current_point(&self) -> Option<Vec2> {
        self.current
    }

    pub fn reset(&mut self) -> &mut Self {
        self.cmds.clear();
        self.start = None;
        self.current = None;
        self
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        let p = Vec2::new(x, y);
        self.cmds.push(PathCmd::MoveTo(p));
        self.start = Some(p);
        self.current = Some(p);
        self
    }

    /// Line to `(x, y)`; starts a subpath there when none is open.
    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        if self.current.is_none() {
            return self.move_to(x, y);
        }
        let p = Vec2::new(x, y);
        self.cmds.push(PathCmd::LineTo(p));
        self.current = Some(p);
        self
    }

    pub fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) -> &mut Self {
        if self.current.is_none() {
            self.move_to(cpx, cpy);
        }
        let p = Vec2::new(x, y);
        self.cmds.push(PathCmd::QuadTo(Vec2::new(cpx, cpy), p));
        self.current = Some(p);
        self
    }

    pub fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> &mut Self {
        if self.current.is_none() {
            self.move_to(c1x, c1y);
        }
        let p = Vec2::new(x, y);
        self.cmds.push(PathCmd::CubicTo(Vec2::new(c1x, c1y), Vec2::new(c2x, c2y), p));
        self.current = Some(p);
        self
    }

    /// Circular arc of `radius` from the current point to `(x, y)`.
    ///
    /// The shorter of the two arcs is taken, sweeping towards increasing
    /// angles (clockwise on a y-down screen). A radius smaller than half the
    /// chord is enlarged to exactly half the chord (a half circle).
    pub fn arc_to(&mut self, radius: f32, x: f32, y: f32) -> &mut Self {
        let Some(from) = self.current else {
            return self.move_to(x, y);
        };
        let to = Vec2::new(x, y);
        let chord = to - from;
        let Some(dir) = chord.normalized() else {
            return self;
        };
        let half = chord.length() * 0.5;
        let r = radius.abs().max(half);
        let h = (r * r - half * half).max(0.0).sqrt();
        let center = from.lerp(to, 0.5) + dir.perp() * h;

        let a0 = (from.y - center.y).atan2(from.x - center.x);
        let a1 = (to.y - center.y).atan2(to.x - center.x);
        let mut sweep = a1 - a0;
        if sweep < 0.0 {
            sweep += TAU;
        }
        self.push_arc(center, r, a0, sweep);
        self.current = Some(to);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if self.current.is_some() {
            self.cmds.push(PathCmd::Close);
            self.current = self.start;
        }
        self
    }

    /// Closed rectangle subpath.
    pub fn rect(&mut self, r: Rect) -> &mut Self {
        let [a, b, c, d] = r.corners();
        self.move_to(a.x, a.y)
            .line_to(b.x, b.y)
            .line_to(c.x, c.y)
            .line_to(d.x, d.y)
            .close()
    }

    /// Closed rectangle subpath with circular corners.
    pub fn round_rect(&mut self, r: Rect, radius: f32) -> &mut Self {
        let r = r.normalized();
        let rad = radius.max(0.0).min(r.width() * 0.5).min(r.height() * 0.5);
        if rad <= 0.0 {
            return self.rect(r);
        }
        let (x0, y0) = (r.x(), r.y());
        let (x1, y1) = (x0 + r.width(), y0 + r.height());
        self.move_to(x0 + rad, y0);
        self.line_to(x1 - rad, y0);
        self.push_arc(Vec2::new(x1 - rad, y0 + rad), rad, -FRAC_PI_2, FRAC_PI_2);
        self.line_to(x1, y1 - rad);
        self.push_arc(Vec2::new(x1 - rad, y1 - rad), rad, 0.0, FRAC_PI_2);
        self.line_to(x0 + rad, y1);
        self.push_arc(Vec2::new(x0 + rad, y1 - rad), rad, FRAC_PI_2, FRAC_PI_2);
        self.line_to(x0, y0 + rad);
        self.push_arc(Vec2::new(x0 + rad, y0 + rad), rad, PI, FRAC_PI_2);
        self.close()
    }

    /// Closed circle subpath.
    pub fn circle(&mut self, center: Vec2, radius: f32) -> &mut Self {
        let r = radius.abs();
        self.move_to(center.x + r, center.y);
        self.push_arc(center, r, 0.0, TAU);
        self.close()
    }

    /// Appends cubic segments approximating an arc that starts at the current point.
    fn push_arc(&mut self, center: Vec2, r: f32, start: f32, sweep: f32) {
        let n = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / n as f32;
        let k = 4.0 / 3.0 * (step / 4.0).tan();
        let mut a = start;
        for _ in 0..n {
            let b = a + step;
            let (s0, c0) = a.sin_cos();
            let (s1, c1) = b.sin_cos();
            let p0 = center + Vec2::new(c0, s0) * r;
            let p3 = center + Vec2::new(c1, s1) * r;
            let p1 = p0 + Vec2::new(-s0, c0) * (r * k);
            let p2 = p3 - Vec2::new(-s1, c1) * (r * k);
            self.cmds.push(PathCmd::CubicTo(p1, p2, p3));
            a = b;
        }
        let end = center + Vec2::new(a.cos(), a.sin()) * r;
        self.current = Some(end);
    }

    /// Flattens every subpath into polylines.
    ///
    /// `tolerance` is the maximum deviation from the true curve, in the units
    /// the points are expressed in.
    pub fn flatten(&self, tolerance: f32) -> Vec<Contour> {
        let tol = tolerance.max(1e-3);
        let mut out = Vec::new();
        let mut cur: Vec<Vec2> = Vec::new();
        let mut last = Vec2::zero();

        let flush = |cur: &mut Vec<Vec2>, out: &mut Vec<Contour>, closed: bool| {
            // A lone point is not a subpath.
            if cur.len() > 1 {
                out.push(Contour { points: std::mem::take(cur), closed });
            }
            cur.clear();
        };

        for cmd in &self.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => {
                    flush(&mut cur, &mut out, false);
                    cur.push(p);
                    last = p;
                }
                PathCmd::LineTo(p) => {
                    cur.push(p);
                    last = p;
                }
                PathCmd::QuadTo(c, p) => {
                    let n = segments_for(last.lerp(c, 0.5).lerp(c.lerp(p, 0.5), 0.5), last.lerp(p, 0.5), tol);
                    for i in 1..=n {
                        let t = i as f32 / n as f32;
                        cur.push(last.lerp(c, t).lerp(c.lerp(p, t), t));
                    }
                    last = p;
                }
                PathCmd::CubicTo(c1, c2, p) => {
                    let dev = (c1 - last.lerp(p, 1.0 / 3.0)).length().max((c2 - last.lerp(p, 2.0 / 3.0)).length());
                    let n = ((dev / tol).sqrt().ceil() as usize).clamp(1, 256);
                    for i in 1..=n {
                        cur.push(cubic_at(last, c1, c2, p, i as f32 / n as f32));
                    }
                    last = p;
                }
                PathCmd::Close => {
                    let first = cur.first().copied();
                    flush(&mut cur, &mut out, true);
                    if let Some(first) = first {
                        cur.push(first);
                        last = first;
                    }
                }
            }
        }
        flush(&mut cur, &mut out, false);
        out
    }

    /// Bounds of all control points, or `None` for an empty path.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.cmds.iter().flat_map(|c| {
            let pts: [Option<Vec2>; 3] = match *c {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => [Some(p), None, None],
                PathCmd::QuadTo(a, b) => [Some(a), Some(b), None],
                PathCmd::CubicTo(a, b, p) => [Some(a), Some(b), Some(p)],
                PathCmd::Close => [None, None, None],
            };
            pts.into_iter().flatten()
        }))
    }
}

fn segments_for(curve_mid: Vec2, chord_mid: Vec2, tol: f32) -> usize {
    let dev = (curve_mid - chord_mid).length();
    ((dev / tol).sqrt().ceil() as usize).clamp(1, 256)
}

fn cubic_at(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    let c = p2.lerp(p3, t);
    a.lerp(b, t).lerp(b.lerp(c, t), t)
}
