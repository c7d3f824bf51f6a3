use crate::coords::{Transform2D, Vec2};
use crate::paint::TextStyle;
use crate::text::FontSystem;

use super::coverage::{Mask, PixelBounds};

struct PlacedGlyph {
    x: i32,
    y: i32,
    width: usize,
    coverage: Vec<u8>,
}

/// Coverage of a single line of text, baseline starting at `origin` (user space).
///
/// Glyphs are rasterized upright at the transform's uniform scale and placed
/// at the transformed pen positions; rotation and skew only move the origin.
pub(crate) fn text_mask(
    fonts: &FontSystem,
    style: TextStyle,
    text: &str,
    origin: Vec2,
    transform: &Transform2D,
    width: u32,
    height: u32,
) -> Option<Mask> {
    let font = fonts.get(style.font)?;
    let px = style.size * transform.uniform_scale();
    if !(px > 0.0) {
        return None;
    }
    let o = transform.apply(origin);
    let (placements, _) = fonts.layout_line(text, style.font, px);

    let mut glyphs = Vec::with_capacity(placements.len());
    let mut corners = Vec::with_capacity(placements.len() * 2);
    for g in placements {
        let (m, coverage) = font.rasterize(g.ch, px);
        if m.width == 0 || m.height == 0 {
            continue;
        }
        let x = (o.x + g.pen_x + m.xmin as f32).round() as i32;
        let y = (o.y - (m.height as i32 + m.ymin) as f32).round() as i32;
        corners.push(Vec2::new(x as f32, y as f32));
        corners.push(Vec2::new((x + m.width as i32) as f32, (y + m.height as i32) as f32));
        glyphs.push(PlacedGlyph { x, y, width: m.width, coverage });
    }

    let bounds = PixelBounds::covering(corners.iter(), width, height)?;
    let mut mask = Mask::new(bounds);
    for g in &glyphs {
        for (i, &c) in g.coverage.iter().enumerate() {
            if c == 0 {
                continue;
            }
            let (gx, gy) = ((i % g.width) as i32, (i / g.width) as i32);
            mask.add(g.x + gx, g.y + gy, c as f32 / 255.0);
        }
    }
    Some(mask)
}
