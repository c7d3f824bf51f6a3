/// Shape drawn at the open ends of stroked lines.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LineCap {
    /// The stroke ends flush with the endpoint.
    Butt,
    /// A half-disc of the stroke width is added at each end.
    Round,
    /// The stroke extends half its width past each end.
    #[default]
    Square,
}

/// Shape drawn where two stroked segments meet.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LineJoin {
    Bevel,
    /// Sharp corner, falling back to a bevel past the miter limit.
    #[default]
    Miter,
    Round,
}
