use crate::coords::Vec2;

use super::{Color, PremulColor};

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    #[default]
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

impl SpreadMode {
    /// Maps an unbounded gradient parameter into [0, 1].
    #[inline]
    pub fn resolve(self, t: f32) -> f32 {
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

/// A single gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Gradient geometry, in the user space active when the gradient is used as a fill.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GradientShape {
    Linear { start: Vec2, end: Vec2 },
    Radial { center: Vec2, radius: f32 },
}

/// Linear or radial gradient fill.
///
/// Canvases hold gradients behind `Rc`, so saving the paint state shares the
/// definition instead of cloning stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub shape: GradientShape,
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMode,
}

impl Gradient {
    /// Linear gradient from `(x0, y0)` to `(x1, y1)`.
    ///
    /// # Panics
    /// Panics when `colors` and `positions` differ in length.
    pub fn linear(x0: f32, y0: f32, x1: f32, y1: f32, colors: &[Color], positions: &[f32]) -> Self {
        Self {
            shape: GradientShape::Linear { start: Vec2::new(x0, y0), end: Vec2::new(x1, y1) },
            stops: zip_stops(colors, positions),
            spread: SpreadMode::Pad,
        }
    }

    /// Radial gradient centered on `(x, y)` reaching the last stop at `radius`.
    ///
    /// # Panics
    /// Panics when `colors` and `positions` differ in length.
    pub fn radial(x: f32, y: f32, radius: f32, colors: &[Color], positions: &[f32]) -> Self {
        Self {
            shape: GradientShape::Radial { center: Vec2::new(x, y), radius },
            stops: zip_stops(colors, positions),
            spread: SpreadMode::Pad,
        }
    }

    pub fn with_spread(mut self, spread: SpreadMode) -> Self {
        self.spread = spread;
        self
    }

    /// Returns true when the gradient definition is structurally usable.
    pub fn is_valid(&self) -> bool {
        let shape_ok = match self.shape {
            GradientShape::Linear { start, end } => {
                start.is_finite() && end.is_finite() && (end.x != start.x || end.y != start.y)
            }
            GradientShape::Radial { center, radius } => {
                center.is_finite() && radius.is_finite() && radius > 0.0
            }
        };
        shape_ok && !self.stops.is_empty() && self.stops.iter().all(|s| s.t.is_finite())
    }

    /// Gradient parameter at a user-space point, before spread is applied.
    pub fn parameter_at(&self, p: Vec2) -> f32 {
        match self.shape {
            GradientShape::Linear { start, end } => {
                let axis = end - start;
                let len2 = axis.dot(axis);
                if len2 <= 0.0 { 0.0 } else { (p - start).dot(axis) / len2 }
            }
            GradientShape::Radial { center, radius } => {
                if radius <= 0.0 { 1.0 } else { (p - center).length() / radius }
            }
        }
    }

    /// Premultiplied color at a user-space point.
    pub fn color_at(&self, p: Vec2) -> PremulColor {
        let t = self.spread.resolve(self.parameter_at(p));
        self.color_at_parameter(t)
    }

    /// Interpolates stops in premultiplied space. Stops are expected in ascending `t`.
    pub fn color_at_parameter(&self, t: f32) -> PremulColor {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return PremulColor::transparent(),
        };
        if t <= first.t {
            return first.color.to_premul();
        }
        if t >= last.t {
            return last.color.to_premul();
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.t && t <= b.t {
                let span = b.t - a.t;
                let k = if span <= 0.0 { 1.0 } else { (t - a.t) / span };
                return a.color.to_premul().lerp(b.color.to_premul(), k);
            }
        }
        last.color.to_premul()
    }
}

fn zip_stops(colors: &[Color], positions: &[f32]) -> Vec<ColorStop> {
    assert_eq!(
        colors.len(),
        positions.len(),
        "gradient needs one position per color"
    );
    colors
        .iter()
        .zip(positions)
        .map(|(&color, &t)| ColorStop::new(t, color))
        .collect()
}
