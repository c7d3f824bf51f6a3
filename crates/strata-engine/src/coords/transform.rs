use super::Vec2;

/// 2×3 affine transform.
///
/// Points map as:
///
/// ```text
/// x' = m00·x + m10·y + tx
/// y' = m01·x + m11·y + ty
/// ```
///
/// `translate`, `scale` and `rotate` are local-space operations: the new step is
/// applied to points *before* the existing transform, which is what a canvas or a
/// layer expects when it nests coordinate systems.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    pub m00: f32,
    pub m01: f32,
    pub m10: f32,
    pub m11: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    #[inline]
    pub const fn new(m00: f32, m01: f32, m10: f32, m11: f32, tx: f32, ty: f32) -> Self {
        Self { m00, m01, m10, m11, tx, ty }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `radians`; positive angles turn +X towards +Y (clockwise on screen).
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Returns the transform that applies `self` first and then `other`.
    ///
    /// `a.compose(b).apply(p) == b.apply(a.apply(p))`.
    pub fn compose(&self, other: &Transform2D) -> Transform2D {
        let a = self;
        let b = other;
        Transform2D {
            m00: b.m00 * a.m00 + b.m10 * a.m01,
            m01: b.m01 * a.m00 + b.m11 * a.m01,
            m10: b.m00 * a.m10 + b.m10 * a.m11,
            m11: b.m01 * a.m10 + b.m11 * a.m11,
            tx: b.m00 * a.tx + b.m10 * a.ty + b.tx,
            ty: b.m01 * a.tx + b.m11 * a.ty + b.ty,
        }
    }

    /// Local-space translation.
    #[inline]
    pub fn translate(&self, dx: f32, dy: f32) -> Transform2D {
        Transform2D::translation(dx, dy).compose(self)
    }

    /// Local-space scale.
    #[inline]
    pub fn scale(&self, sx: f32, sy: f32) -> Transform2D {
        Transform2D::scaling(sx, sy).compose(self)
    }

    /// Local-space rotation.
    #[inline]
    pub fn rotate(&self, radians: f32) -> Transform2D {
        Transform2D::rotation(radians).compose(self)
    }

    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * p.x + self.m10 * p.y + self.tx,
            self.m01 * p.x + self.m11 * p.y + self.ty,
        )
    }

    /// Applies only the linear part (no translation); used for direction vectors.
    #[inline]
    pub fn apply_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.m00 * v.x + self.m10 * v.y, self.m01 * v.x + self.m11 * v.y)
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    #[inline]
    pub fn translation_part(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }

    /// Geometric mean of the axis scale factors. Approximate for skewed transforms.
    #[inline]
    pub fn uniform_scale(&self) -> f32 {
        self.determinant().abs().sqrt()
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Transform2D> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let m00 = self.m11 * inv;
        let m01 = -self.m01 * inv;
        let m10 = -self.m10 * inv;
        let m11 = self.m00 * inv;
        Some(Transform2D {
            m00,
            m01,
            m10,
            m11,
            tx: -(m00 * self.tx + m10 * self.ty),
            ty: -(m01 * self.tx + m11 * self.ty),
        })
    }
}
