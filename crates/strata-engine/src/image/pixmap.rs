use bytemuck::{Pod, Zeroable};

use crate::paint::PremulColor;

/// One premultiplied RGBA8 pixel.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Pod, Zeroable)]
pub struct PremulRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PremulRgba8 {
    pub const TRANSPARENT: PremulRgba8 = PremulRgba8 { r: 0, g: 0, b: 0, a: 0 };

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn to_color(self) -> PremulColor {
        PremulColor::from_premul(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }

    #[inline]
    pub fn from_color(c: PremulColor) -> Self {
        let c = c.clamped();
        let q = |v: f32| (v * 255.0).round() as u8;
        Self { r: q(c.r), g: q(c.g), b: q(c.b), a: q(c.a) }
    }
}

/// Owned raster of premultiplied RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    pixels: Vec<PremulRgba8>,
}

impl Pixmap {
    /// Transparent pixmap of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![PremulRgba8::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Builds a pixmap from straight-alpha RGBA8 bytes (the layout image decoders produce).
    ///
    /// Returns `None` when `bytes` does not hold exactly `width * height` pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return None;
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| {
                let a = px[3] as u16;
                let mul = |c: u8| ((c as u16 * a + 127) / 255) as u8;
                PremulRgba8::new(mul(px[0]), mul(px[1]), mul(px[2]), px[3])
            })
            .collect();
        Some(Self { width, height, pixels })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[PremulRgba8] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [PremulRgba8] {
        &mut self.pixels
    }

    /// Raw premultiplied bytes, four per pixel.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, px: PremulRgba8) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = px;
        }
    }

    pub fn fill(&mut self, px: PremulRgba8) {
        self.pixels.fill(px);
    }

    /// Nearest-neighbour sample at a continuous coordinate (pixel centers at +0.5).
    /// Coordinates outside the pixmap yield `None`.
    #[inline]
    pub fn sample_nearest(&self, x: f32, y: f32) -> Option<PremulColor> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        self.pixel(x as u32, y as u32).map(PremulRgba8::to_color)
    }

    /// Straight-alpha RGBA8 bytes, for encoders that expect unpremultiplied data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            if px.a == 0 {
                out.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let a = px.a as u16;
            let un = |c: u8| ((c as u16 * 255 + a / 2) / a).min(255) as u8;
            out.extend_from_slice(&[un(px.r), un(px.g), un(px.b), px.a]);
        }
        out
    }
}
