//! Placement of a deformation target in world space.

use crate::{Transform3D, TransformError, TransformResult};
use nalgebra::{Point3, UnitQuaternion, Vector3};

/// World placement of a target mesh.
///
/// Carries the full local-to-world matrix, used to move vertices into the
/// world space the interpolation model lives in, and the world rotation,
/// used to bring world-space displacements back into the mesh's local
/// frame. The two are kept separately because hosts report them
/// separately and a displacement must only be rotated, never translated or
/// scaled.
///
/// # Example
///
/// ```
/// use mesh_transform::TargetTransform;
/// use nalgebra::{Point3, UnitQuaternion, Vector3};
///
/// let t = TargetTransform::from_trs(
///     Vector3::new(0.0, 1.0, 0.0),
///     UnitQuaternion::identity(),
///     Vector3::new(1.0, 1.0, 1.0),
/// );
/// assert_eq!(t.to_world(&Point3::origin()), Point3::new(0.0, 1.0, 0.0));
/// assert_eq!(t.displacement_to_local(&Vector3::x()), Vector3::x());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetTransform {
    local_to_world: Transform3D,
    rotation: UnitQuaternion<f64>,
    inverse_rotation: UnitQuaternion<f64>,
}

impl Default for TargetTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl TargetTransform {
    /// Create from a local-to-world matrix and the world rotation.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonFinite`] if the matrix or the rotation
    /// contains NaN or infinite components.
    pub fn new(local_to_world: Transform3D, rotation: UnitQuaternion<f64>) -> TransformResult<Self> {
        if !local_to_world.is_finite() {
            return Err(TransformError::NonFinite {
                what: "local-to-world matrix",
            });
        }
        if !rotation.coords.iter().all(|c| c.is_finite()) {
            return Err(TransformError::NonFinite { what: "rotation" });
        }
        Ok(Self {
            local_to_world,
            rotation,
            inverse_rotation: rotation.inverse(),
        })
    }

    /// Create from world translation, rotation, and scale of a root node.
    #[must_use]
    pub fn from_trs(
        translation: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
        scale: Vector3<f64>,
    ) -> Self {
        Self {
            local_to_world: Transform3D::from_trs(translation, &rotation, scale),
            rotation,
            inverse_rotation: rotation.inverse(),
        }
    }

    /// The identity placement.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            local_to_world: Transform3D::identity(),
            rotation: UnitQuaternion::identity(),
            inverse_rotation: UnitQuaternion::identity(),
        }
    }

    /// The local-to-world matrix.
    #[must_use]
    pub const fn local_to_world(&self) -> &Transform3D {
        &self.local_to_world
    }

    /// The world rotation.
    #[must_use]
    pub const fn rotation(&self) -> &UnitQuaternion<f64> {
        &self.rotation
    }

    /// Map a local vertex position to world space.
    #[inline]
    #[must_use]
    pub fn to_world(&self, local: &Point3<f64>) -> Point3<f64> {
        self.local_to_world.transform_point(local)
    }

    /// Rotate a world-space displacement into the local frame.
    ///
    /// Only the inverse rotation is applied.
    #[inline]
    #[must_use]
    pub fn displacement_to_local(&self, world: &Vector3<f64>) -> Vector3<f64> {
        self.inverse_rotation * world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn displacement_ignores_translation_and_scale() {
        let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let t = TargetTransform::from_trs(
            Vector3::new(5.0, 5.0, 5.0),
            rot,
            Vector3::new(3.0, 3.0, 3.0),
        );

        let world = rot * Vector3::new(0.0, 0.0, 1.0);
        let local = t.displacement_to_local(&world);
        assert_relative_eq!(local.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(local.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn to_world_applies_full_matrix() {
        let t = TargetTransform::from_trs(
            Vector3::new(1.0, 0.0, 0.0),
            UnitQuaternion::identity(),
            Vector3::new(2.0, 2.0, 2.0),
        );
        assert_eq!(t.to_world(&Point3::new(1.0, 1.0, 1.0)), Point3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn new_rejects_non_finite_matrix() {
        let bad = Transform3D::from_translation(Vector3::new(f64::INFINITY, 0.0, 0.0));
        let result = TargetTransform::new(bad, UnitQuaternion::identity());
        assert!(matches!(result, Err(TransformError::NonFinite { .. })));
    }

    #[test]
    fn new_keeps_separate_rotation() {
        let rot = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let t = TargetTransform::new(Transform3D::identity(), rot);
        let t = t.unwrap_or_default();
        assert_eq!(t.to_world(&Point3::new(1.0, 0.0, 0.0)), Point3::new(1.0, 0.0, 0.0));
        let local = t.displacement_to_local(&Vector3::y());
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-12);
    }
}
