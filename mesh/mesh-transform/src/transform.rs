//! 3D transformation matrix operations.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// A 3D affine transformation represented as a 4x4 matrix.
///
/// # Example
///
/// ```
/// use mesh_transform::Transform3D;
/// use nalgebra::{Point3, UnitQuaternion, Vector3};
///
/// let t = Transform3D::from_trs(
///     Vector3::new(1.0, 2.0, 3.0),
///     &UnitQuaternion::identity(),
///     Vector3::new(2.0, 2.0, 2.0),
/// );
///
/// let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
/// assert_eq!(p, Point3::new(3.0, 4.0, 5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    /// The 4x4 transformation matrix in column-major order.
    matrix: Matrix4<f64>,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Create the identity transformation (no change).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation from a vector.
    #[must_use]
    pub fn from_translation(v: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&v),
        }
    }

    /// Create a non-uniform scaling transformation.
    #[must_use]
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)),
        }
    }

    /// Create a rotation from a unit quaternion.
    #[must_use]
    pub fn from_rotation(rotation: &UnitQuaternion<f64>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Compose translation, rotation and scale as `T * R * S`.
    ///
    /// This is the local-to-parent matrix of a scene node: scale first,
    /// then rotate, then translate.
    #[must_use]
    pub fn from_trs(
        translation: Vector3<f64>,
        rotation: &UnitQuaternion<f64>,
        scale: Vector3<f64>,
    ) -> Self {
        Self::scale(scale.x, scale.y, scale.z)
            .then(&Self::from_rotation(rotation))
            .then(&Self::from_translation(translation))
    }

    /// Compose this transformation with another (self then other).
    ///
    /// The result applies `self` first, then `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Whether every matrix entry is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }

    /// Transform a point (applies translation).
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }
}
