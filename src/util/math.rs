//! Math type re-exports and transform utilities.
//!
//! Re-exports the `glam` types used throughout the pipeline and provides
//! the transform decomposition the document writer emits bone transforms
//! with, plus the floating-point self-check guarding matrix inversion.

// Re-export glam types
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// 3D axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A transform split into the components a COLLADA node emits:
/// translation, XYZ Euler rotation in degrees, and per-axis scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub translation: Vec3,
    /// XYZ Euler angles in degrees, applied in x, y, z order.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

impl Decomposed {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation_deg: Vec3::ZERO,
        scale: Vec3::ONE,
    };
}

/// Compose an affine matrix from translation, XYZ Euler rotation in
/// degrees, and per-axis scale. Rotation is applied in x, y, z order.
pub fn compose_trs(translation: Vec3, rotation_deg: Vec3, scale: Vec3) -> Mat4 {
    let rotation = Quat::from_euler(
        EulerRot::XYZ,
        rotation_deg.x.to_radians(),
        rotation_deg.y.to_radians(),
        rotation_deg.z.to_radians(),
    );
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Decompose an affine matrix into translation, XYZ Euler rotation in
/// degrees, and per-axis scale.
///
/// Scale is the length of each basis column. Rotation comes from
/// orthonormalizing the 3x3 part (Gram-Schmidt fast path, not an SVD)
/// and converting through a quaternion to XYZ Euler angles.
pub fn decompose_transform(matrix: &Mat4) -> Decomposed {
    let translation = matrix.w_axis.truncate();

    let x = matrix.x_axis.truncate();
    let y = matrix.y_axis.truncate();
    let z = matrix.z_axis.truncate();
    let scale = Vec3::new(x.length(), y.length(), z.length());

    let bx = x.normalize_or_zero();
    let by = (y - bx * y.dot(bx)).normalize_or_zero();
    // Cross product keeps the basis right-handed even if z drifted.
    let bz = bx.cross(by);

    let rotation = Quat::from_mat3(&Mat3::from_cols(bx, by, bz));
    let (rx, ry, rz) = rotation.to_euler(EulerRot::XYZ);

    Decomposed {
        translation,
        rotation_deg: Vec3::new(rx.to_degrees(), ry.to_degrees(), rz.to_degrees()),
        scale,
    }
}

/// Flatten a matrix into the 16 row-major values a COLLADA
/// `<matrix>`-style listing expects.
pub fn matrix_row_major(matrix: &Mat4) -> [f32; 16] {
    matrix.transpose().to_cols_array()
}

/// Fixed reference matrix for the precision self-check: a 30-degree Z
/// rotation with uniform scale 2 and translation (1, 2, 3).
pub const PRECISION_TEST_MATRIX: Mat4 = Mat4::from_cols_array(&[
    1.732_050_8, 1.0, 0.0, 0.0, //
    -1.0, 1.732_050_8, 0.0, 0.0, //
    0.0, 0.0, 2.0, 0.0, //
    1.0, 2.0, 3.0, 1.0,
]);

/// Check that a homogeneous component survived inversion within tolerance.
#[inline]
pub fn inverse_precision_ok(m33: f32) -> bool {
    (m33 - 1.0).abs() <= 0.001
}

/// Detect floating-point configurations that silently corrupt matrix
/// inversion. Inverts the fixed reference matrix and checks that the
/// homogeneous component of `M * M^-1` stays within 0.001 of 1.0.
///
/// Returns `true` when inversion is unreliable; the writer must refuse
/// to run in that case.
pub fn floating_point_has_precision_issues() -> bool {
    let product = PRECISION_TEST_MATRIX * PRECISION_TEST_MATRIX.inverse();
    !inverse_precision_ok(product.w_axis.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_decompose_roundtrip() {
        let matrix = compose_trs(
            Vec3::new(1.0, -2.0, 3.5),
            Vec3::new(10.0, 20.0, 30.0),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let d = decompose_transform(&matrix);

        assert!((d.translation - Vec3::new(1.0, -2.0, 3.5)).length() < 1e-5);
        assert!((d.rotation_deg - Vec3::new(10.0, 20.0, 30.0)).length() < 1e-3);
        assert!((d.scale - Vec3::splat(2.0)).length() < 1e-5);
    }

    #[test]
    fn test_decompose_identity() {
        let d = decompose_transform(&Mat4::IDENTITY);
        assert_eq!(d, Decomposed::IDENTITY);
    }

    #[test]
    fn test_decompose_nonuniform_scale() {
        let matrix = compose_trs(Vec3::ZERO, Vec3::new(0.0, 0.0, 45.0), Vec3::new(1.0, 2.0, 3.0));
        let d = decompose_transform(&matrix);
        assert!((d.scale - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!((d.rotation_deg.z - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_precision_guard_bounds() {
        assert!(inverse_precision_ok(1.0));
        assert!(inverse_precision_ok(0.9995));
        assert!(inverse_precision_ok(1.0005));
        assert!(!inverse_precision_ok(0.998));
        assert!(!inverse_precision_ok(1.002));
    }

    #[test]
    fn test_precision_guard_passes_here() {
        assert!(!floating_point_has_precision_issues());
    }

    #[test]
    fn test_bbox_expand() {
        let mut b = BBox::EMPTY;
        assert!(b.is_empty());
        b.expand_by_point(Vec3::new(1.0, 2.0, 3.0));
        b.expand_by_point(Vec3::new(-1.0, 0.0, 5.0));
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 5.0));
    }
}
