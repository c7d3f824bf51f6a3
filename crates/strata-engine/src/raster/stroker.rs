use std::f32::consts::PI;

use crate::canvas::Contour;
use crate::coords::Vec2;
use crate::paint::{LineCap, LineJoin};

/// Stroke geometry parameters, in the same space as the contours.
#[derive(Debug, Copy, Clone)]
pub(crate) struct StrokeStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    /// Maximum deviation allowed when approximating round caps and joins.
    pub tolerance: f32,
}

/// Expands polylines into polygons covering their stroke.
///
/// The outline is a union of pieces (one quad per segment plus caps and
/// joins). Every piece is given the same orientation, so filling the result
/// with the nonzero rule yields the union without seams.
pub(crate) fn stroke(contours: &[Contour], style: &StrokeStyle) -> Vec<Vec<Vec2>> {
    let hw = style.width * 0.5;
    let mut out = Vec::new();
    if !(hw > 0.0) || !hw.is_finite() {
        return out;
    }

    for contour in contours {
        let pts = dedup(&contour.points, contour.closed);
        if pts.len() < 2 {
            // Zero-length subpath: only caps that extend past the end show up.
            if let Some(&p) = pts.first() {
                match style.cap {
                    LineCap::Round => out.push(disc(p, hw, style.tolerance)),
                    LineCap::Square => out.push(vec![
                        p + Vec2::new(-hw, -hw),
                        p + Vec2::new(hw, -hw),
                        p + Vec2::new(hw, hw),
                        p + Vec2::new(-hw, hw),
                    ]),
                    LineCap::Butt => {}
                }
            }
            continue;
        }

        let n = pts.len();
        let closed = contour.closed && n > 2;
        let segments = if closed { n } else { n - 1 };
        for i in 0..segments {
            out.push(segment(pts[i], pts[(i + 1) % n], hw));
        }

        let joints: Box<dyn Iterator<Item = usize>> =
            if closed { Box::new(0..n) } else { Box::new(1..n - 1) };
        for i in joints {
            let prev = pts[(i + n - 1) % n];
            let next = pts[(i + 1) % n];
            if let Some(piece) = join(prev, pts[i], next, hw, style) {
                out.push(piece);
            }
        }

        if !closed {
            out.extend(cap(pts[0], pts[0] - pts[1], hw, style));
            out.extend(cap(pts[n - 1], pts[n - 1] - pts[n - 2], hw, style));
        }
    }

    for poly in &mut out {
        orient(poly);
    }
    out
}

fn dedup(points: &[Vec2], closed: bool) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|&q| (p - q).length() > 1e-6) {
            out.push(p);
        }
    }
    if closed && out.len() > 1 && (out[0] - out[out.len() - 1]).length() <= 1e-6 {
        out.pop();
    }
    out
}

fn segment(a: Vec2, b: Vec2, hw: f32) -> Vec<Vec2> {
    let n = (b - a).normalized().unwrap_or(Vec2::new(1.0, 0.0)).perp() * hw;
    vec![a + n, b + n, b - n, a - n]
}

fn join(prev: Vec2, v: Vec2, next: Vec2, hw: f32, style: &StrokeStyle) -> Option<Vec<Vec2>> {
    let d0 = (v - prev).normalized()?;
    let d1 = (next - v).normalized()?;
    let cos_turn = d0.dot(d1);
    if d0.cross(d1).abs() < 1e-6 && cos_turn > 0.0 {
        return None;
    }
    if style.join == LineJoin::Round {
        return Some(disc(v, hw, style.tolerance));
    }

    let (n0, n1) = (d0.perp() * hw, d1.perp() * hw);
    // The gap to fill is on the side away from the turn.
    let side = if n0.dot(d1) > 0.0 { -1.0 } else { 1.0 };
    let p0 = v + n0 * side;
    let p1 = v + n1 * side;

    if style.join == LineJoin::Miter && 1.0 + cos_turn > 1e-6 {
        let ratio = (2.0 / (1.0 + cos_turn)).sqrt();
        if ratio <= style.miter_limit {
            if let Some(bisector) = (n0 + n1).normalized() {
                let tip = v + bisector * (side * hw * ratio);
                return Some(vec![v, p0, tip, p1]);
            }
        }
    }
    Some(vec![v, p0, p1])
}

/// Cap at `end`, where `outward` points away from the line.
fn cap(end: Vec2, outward: Vec2, hw: f32, style: &StrokeStyle) -> Option<Vec<Vec2>> {
    let d = outward.normalized()?;
    match style.cap {
        LineCap::Butt => None,
        LineCap::Round => Some(disc(end, hw, style.tolerance)),
        LineCap::Square => {
            let n = d.perp() * hw;
            let ext = d * hw;
            Some(vec![end + n, end + n + ext, end - n + ext, end - n])
        }
    }
}

fn disc(center: Vec2, r: f32, tolerance: f32) -> Vec<Vec2> {
    let tol = tolerance.clamp(1e-3, r.max(1e-3));
    let step = 2.0 * (1.0 - tol / r).clamp(-1.0, 1.0).acos();
    let n = if step > 0.0 { ((2.0 * PI) / step).ceil() as usize } else { 8 }.clamp(8, 128);
    (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * 2.0 * PI;
            center + Vec2::new(a.cos(), a.sin()) * r
        })
        .collect()
}

fn orient(poly: &mut [Vec2]) {
    let n = poly.len();
    let area: f32 = (0..n).map(|i| poly[i].cross(poly[(i + 1) % n])).sum();
    if area < 0.0 {
        poly.reverse();
    }
}
