use std::rc::Rc;

use crate::coords::{Rect, Vec2};
use crate::image::Pixmap;

use super::Path;

/// Backend-agnostic drawing primitive.
///
/// Geometry is in user space; the [`PaintState`](crate::paint::PaintState)
/// passed alongside each command carries the transform, fill, stroke, clip
/// and composite to draw it with.
///
/// Extending the canvas:
/// - add a variant here
/// - add the `Canvas` method that emits it
/// - handle it in every `Backend` (the raster backend and `DrawList`)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Resets every pixel of the target to transparent.
    Clear,
    FillRect(Rect),
    StrokeRect(Rect),
    FillRoundRect { rect: Rect, radius: f32 },
    StrokeRoundRect { rect: Rect, radius: f32 },
    FillCircle { center: Vec2, radius: f32 },
    StrokeCircle { center: Vec2, radius: f32 },
    FillPath(Path),
    StrokePath(Path),
    Line { from: Vec2, to: Vec2 },
    /// A single pixel-sized dot in the stroke color.
    Point(Vec2),
    /// Text with its baseline starting at `origin`, in the state's font.
    Text { text: String, origin: Vec2 },
    /// Blits `src` (image pixels) of `pixmap` into `dst` (user space).
    Image { pixmap: Rc<Pixmap>, src: Rect, dst: Rect },
}

impl DrawCmd {
    #[inline]
    pub fn is_stroke(&self) -> bool {
        matches!(
            self,
            DrawCmd::StrokeRect(_)
                | DrawCmd::StrokeRoundRect { .. }
                | DrawCmd::StrokeCircle { .. }
                | DrawCmd::StrokePath(_)
                | DrawCmd::Line { .. }
        )
    }

    /// Outline to fill (for fills) or stroke (for strokes), in user space.
    ///
    /// `None` for commands that are not described by a path.
    pub fn to_path(&self) -> Option<Path> {
        let mut p = Path::new();
        match self {
            DrawCmd::FillRect(r) | DrawCmd::StrokeRect(r) => {
                p.rect(*r);
            }
            DrawCmd::FillRoundRect { rect, radius } | DrawCmd::StrokeRoundRect { rect, radius } => {
                p.round_rect(*rect, *radius);
            }
            DrawCmd::FillCircle { center, radius } | DrawCmd::StrokeCircle { center, radius } => {
                p.circle(*center, *radius);
            }
            DrawCmd::FillPath(path) | DrawCmd::StrokePath(path) => return Some(path.clone()),
            DrawCmd::Line { from, to } => {
                p.move_to(from.x, from.y).line_to(to.x, to.y);
            }
            DrawCmd::Point(at) => {
                p.rect(Rect::new(at.x, at.y, 1.0, 1.0));
            }
            DrawCmd::Image { dst, .. } => {
                p.rect(*dst);
            }
            DrawCmd::Clear | DrawCmd::Text { .. } => return None,
        }
        Some(p)
    }
}
