use super::PremulColor;

/// Porter-Duff composite operation applied when new drawing meets existing pixels.
///
/// Terminology: the *source* is what is being drawn, the *destination* is what the
/// target already holds. Backends map every variant one-to-one onto a native blend
/// mode; [`Composite::blend`] is the reference definition they must agree with.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Composite {
    /// Source replaces destination.
    Src,
    /// Source over destination (the default).
    #[default]
    SrcOver,
    /// Source where destination is present.
    SrcIn,
    /// Source where destination is absent.
    SrcOut,
    /// Source over destination, only where destination is present.
    SrcAtop,
    /// Destination over source.
    DstOver,
    /// Destination where source is present.
    DstIn,
    /// Destination where source is absent.
    DstOut,
    /// Destination over source, only where source is present.
    DstAtop,
    /// Source and destination where they do not overlap.
    Xor,
    /// Channel-wise product, with the non-overlapping parts kept as in source-over.
    Multiply,
}

impl Composite {
    pub const ALL: [Composite; 11] = [
        Composite::Src,
        Composite::SrcOver,
        Composite::SrcIn,
        Composite::SrcOut,
        Composite::SrcAtop,
        Composite::DstOver,
        Composite::DstIn,
        Composite::DstOut,
        Composite::DstAtop,
        Composite::Xor,
        Composite::Multiply,
    ];

    /// Porter-Duff factors `(Fa, Fb)` for source alpha `sa` and destination alpha `da`,
    /// so that `out = src·Fa + dst·Fb`. `Multiply` is not a pure Porter-Duff operator
    /// and returns `None`.
    #[inline]
    pub fn factors(self, sa: f32, da: f32) -> Option<(f32, f32)> {
        let f = match self {
            Composite::Src => (1.0, 0.0),
            Composite::SrcOver => (1.0, 1.0 - sa),
            Composite::SrcIn => (da, 0.0),
            Composite::SrcOut => (1.0 - da, 0.0),
            Composite::SrcAtop => (da, 1.0 - sa),
            Composite::DstOver => (1.0 - da, 1.0),
            Composite::DstIn => (0.0, sa),
            Composite::DstOut => (0.0, 1.0 - sa),
            Composite::DstAtop => (1.0 - da, sa),
            Composite::Xor => (1.0 - da, 1.0 - sa),
            Composite::Multiply => return None,
        };
        Some(f)
    }

    /// Composites premultiplied `src` onto premultiplied `dst`.
    pub fn blend(self, src: PremulColor, dst: PremulColor) -> PremulColor {
        match self.factors(src.a, dst.a) {
            Some((fa, fb)) => PremulColor {
                r: src.r * fa + dst.r * fb,
                g: src.g * fa + dst.g * fb,
                b: src.b * fa + dst.b * fb,
                a: src.a * fa + dst.a * fb,
            },
            None => {
                let (isa, ida) = (1.0 - src.a, 1.0 - dst.a);
                PremulColor {
                    r: src.r * dst.r + src.r * ida + dst.r * isa,
                    g: src.g * dst.g + src.g * ida + dst.g * isa,
                    b: src.b * dst.b + src.b * ida + dst.b * isa,
                    a: src.a + dst.a - src.a * dst.a,
                }
            }
        }
        .clamped()
    }

    /// Composites with partial `coverage` (anti-aliased edges, clip masks):
    /// the result is interpolated between `dst` and the full-coverage blend.
    #[inline]
    pub fn blend_with_coverage(self, src: PremulColor, dst: PremulColor, coverage: f32) -> PremulColor {
        if coverage <= 0.0 {
            return dst;
        }
        let full = self.blend(src, dst);
        if coverage >= 1.0 { full } else { dst.lerp(full, coverage) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(r: f32, a: f32) -> PremulColor {
        PremulColor::from_premul(r, 0.0, 0.0, a)
    }

    #[test]
    fn src_over_opaque_replaces() {
        let out = Composite::SrcOver.blend(c(1.0, 1.0), c(0.2, 1.0));
        assert_eq!(out, c(1.0, 1.0));
    }

    #[test]
    fn src_over_half_alpha_mixes() {
        let out = Composite::SrcOver.blend(c(0.5, 0.5), PremulColor::from_premul(0.0, 1.0, 0.0, 1.0));
        assert!((out.r - 0.5).abs() < 1e-6);
        assert!((out.g - 0.5).abs() < 1e-6);
        assert!((out.a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn dst_operators_keep_destination_color() {
        let src = c(1.0, 1.0);
        let dst = PremulColor::from_premul(0.0, 0.5, 0.0, 0.5);
        assert_eq!(Composite::DstOver.blend(src, dst).g, 0.5);
        assert_eq!(Composite::DstIn.blend(src, dst), dst);
        assert_eq!(Composite::DstOut.blend(src, dst), PremulColor::transparent());
    }

    #[test]
    fn in_and_out_partition_source() {
        let src = c(0.8, 0.8);
        let dst = c(0.0, 0.25);
        let inside = Composite::SrcIn.blend(src, dst);
        let outside = Composite::SrcOut.blend(src, dst);
        assert!((inside.a + outside.a - src.a).abs() < 1e-6);
    }

    #[test]
    fn xor_of_two_opaque_is_empty() {
        let out = Composite::Xor.blend(c(1.0, 1.0), c(1.0, 1.0));
        assert_eq!(out.a, 0.0);
    }

    #[test]
    fn multiply_opaque_is_product() {
        let out = Composite::Multiply.blend(c(0.5, 1.0), c(0.5, 1.0));
        assert!((out.r - 0.25).abs() < 1e-6);
        assert_eq!(out.a, 1.0);
    }

    #[test]
    fn zero_coverage_is_noop() {
        let dst = c(0.3, 0.3);
        for op in Composite::ALL {
            assert_eq!(op.blend_with_coverage(c(1.0, 1.0), dst, 0.0), dst);
        }
    }
}
