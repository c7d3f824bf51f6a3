use crate::coords::Vec2;

/// Vertical samples per pixel row.
const SUBSAMPLES: usize = 4;

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)` inside a target.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct PixelBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBounds {
    /// Pixels touched by `points`, cropped to a `width × height` target.
    pub fn covering<'a>(points: impl IntoIterator<Item = &'a Vec2>, width: u32, height: u32) -> Option<Self> {
        let (mut min, mut max) = (Vec2::new(f32::MAX, f32::MAX), Vec2::new(f32::MIN, f32::MIN));
        let mut any = false;
        for p in points {
            if !p.is_finite() {
                continue;
            }
            any = true;
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        if !any {
            return None;
        }
        let b = PixelBounds {
            x0: (min.x.floor() as i32).max(0),
            y0: (min.y.floor() as i32).max(0),
            x1: (max.x.ceil() as i32).min(width as i32),
            y1: (max.y.ceil() as i32).min(height as i32),
        };
        (!b.is_empty()).then_some(b)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    #[inline]
    pub fn width(&self) -> usize {
        (self.x1 - self.x0).max(0) as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        (self.y1 - self.y0).max(0) as usize
    }
}

/// Per-pixel coverage in `[0, 1]` over a pixel rectangle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mask {
    bounds: PixelBounds,
    data: Vec<f32>,
}

impl Mask {
    pub fn new(bounds: PixelBounds) -> Self {
        Self { bounds, data: vec![0.0; bounds.width() * bounds.height()] }
    }

    #[inline]
    pub fn bounds(&self) -> PixelBounds {
        self.bounds
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let b = self.bounds;
        if x < b.x0 || x >= b.x1 || y < b.y0 || y >= b.y1 {
            return None;
        }
        Some((y - b.y0) as usize * b.width() + (x - b.x0) as usize)
    }

    /// Coverage at an absolute pixel; 0 outside the mask.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(0.0, |i| self.data[i])
    }

    #[inline]
    pub fn add(&mut self, x: i32, y: i32, v: f32) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = (self.data[i] + v).min(1.0);
        }
    }

    /// Intersects with another mask over the same bounds.
    pub fn multiply(&mut self, other: &Mask) {
        debug_assert_eq!(self.bounds, other.bounds);
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a *= *b;
        }
    }
}

/// Scan-converts closed polygons with the nonzero winding rule.
///
/// Each polygon is implicitly closed. Anti-aliasing uses `SUBSAMPLES`
/// scanlines per pixel row and exact horizontal span coverage.
pub(crate) fn rasterize(polygons: &[Vec<Vec2>], bounds: PixelBounds) -> Mask {
    let mut mask = Mask::new(bounds);
    let width = bounds.width();
    if width == 0 {
        return mask;
    }

    let weight = 1.0 / SUBSAMPLES as f32;
    let mut crossings: Vec<(f32, i32)> = Vec::new();

    for (row_index, y) in (bounds.y0..bounds.y1).enumerate() {
        let row = &mut mask.data[row_index * width..(row_index + 1) * width];
        for s in 0..SUBSAMPLES {
            let sy = y as f32 + (s as f32 + 0.5) * weight;
            crossings.clear();

            for poly in polygons {
                let n = poly.len();
                if n < 3 {
                    continue;
                }
                for i in 0..n {
                    let (a, b) = (poly[i], poly[(i + 1) % n]);
                    let dir = if a.y <= sy && b.y > sy {
                        1
                    } else if b.y <= sy && a.y > sy {
                        -1
                    } else {
                        continue;
                    };
                    let x = a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y);
                    crossings.push((x, dir));
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            let mut start = 0.0;
            for &(x, dir) in &crossings {
                let prev = winding;
                winding += dir;
                if prev == 0 && winding != 0 {
                    start = x;
                } else if prev != 0 && winding == 0 {
                    add_span(row, start - bounds.x0 as f32, x - bounds.x0 as f32, weight);
                }
            }
        }
        for v in row.iter_mut() {
            *v = v.min(1.0);
        }
    }
    mask
}

/// Adds `weight × (covered fraction)` to every pixel of `[a, b)` in row-local x.
fn add_span(row: &mut [f32], a: f32, b: f32, weight: f32) {
    let len = row.len() as f32;
    let (a, b) = (a.clamp(0.0, len), b.clamp(0.0, len));
    if b <= a {
        return;
    }
    let (ia, ib) = (a.floor() as usize, b.floor() as usize);
    if ia == ib {
        row[ia] += (b - a) * weight;
        return;
    }
    row[ia] += (ia as f32 + 1.0 - a) * weight;
    for v in &mut row[ia + 1..ib] {
        *v += weight;
    }
    if ib < row.len() {
        row[ib] += (b - ib as f32) * weight;
    }
}
