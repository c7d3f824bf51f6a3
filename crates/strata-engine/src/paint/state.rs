use std::rc::Rc;

use crate::coords::{Transform2D, Vec2};
use crate::text::FontId;

use super::{Color, Composite, Gradient, LineCap, LineJoin, Pattern};

/// Fill source. Setting one kind replaces the others.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Color(Color),
    Gradient(Rc<Gradient>),
    Pattern(Rc<Pattern>),
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Color(Color::BLACK)
    }
}

/// Clip area in device space, as closed polygons filled with the nonzero rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRegion {
    pub contours: Vec<Vec<Vec2>>,
}

impl ClipRegion {
    pub fn new(contours: Vec<Vec<Vec2>>) -> Self {
        Self { contours }
    }

    /// The same region mapped through `t`.
    pub fn transformed(&self, t: &Transform2D) -> ClipRegion {
        ClipRegion {
            contours: self
                .contours
                .iter()
                .map(|c| c.iter().map(|&p| t.apply(p)).collect())
                .collect(),
        }
    }
}

/// Font selection for text drawing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub font: FontId,
    /// Font size in user-space pixels.
    pub size: f32,
}

/// Drawing attributes saved and restored as a unit by a canvas.
///
/// Gradients, patterns and clips sit behind `Rc`, so pushing a copy of the
/// state shares them rather than cloning their contents.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintState {
    pub fill: Fill,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f32,
    pub composite: Composite,
    /// Ambient alpha; multiplies every fill and stroke.
    pub alpha: f32,
    /// Active clips, all of which must cover a pixel for it to be drawn.
    pub clips: Vec<Rc<ClipRegion>>,
    /// User space to device space.
    pub transform: Transform2D,
    pub font: Option<TextStyle>,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Fill::default(),
            stroke_color: Color::WHITE,
            stroke_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            composite: Composite::default(),
            alpha: 1.0,
            clips: Vec::new(),
            transform: Transform2D::identity(),
            font: None,
        }
    }
}

impl PaintState {
    /// Effective alpha of the fill: for a solid color the color's own alpha
    /// channel is scaled by the ambient alpha, never replaced by it.
    #[inline]
    pub fn fill_alpha(&self) -> f32 {
        match &self.fill {
            Fill::Color(c) => self.alpha * c.alpha_f32(),
            Fill::Gradient(_) | Fill::Pattern(_) => self.alpha,
        }
    }

    #[inline]
    pub fn stroke_alpha(&self) -> f32 {
        self.alpha * self.stroke_color.alpha_f32()
    }

    #[inline]
    pub fn is_clipped(&self) -> bool {
        !self.clips.is_empty()
    }
}
