//! Vertex types and attributes.

use nalgebra::{Point3, Vector3, Vector4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Optional attributes that can be attached to a vertex.
///
/// - `normal`: Imported from the host or rebuilt from adjacent faces
///   (area-weighted average)
/// - `tangent`: Host tangent; `w` carries the bitangent sign
/// - `uv`: Texture coordinates
///
/// Deformation rewrites `normal` when normal recomputation is enabled and
/// passes `tangent` and `uv` through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexAttributes {
    /// Unit normal vector.
    pub normal: Option<Vector3<f64>>,

    /// Tangent vector with handedness in `w`.
    pub tangent: Option<Vector4<f64>>,

    /// Texture coordinates (U, V).
    pub uv: Option<(f32, f32)>,
}

impl VertexAttributes {
    /// Create empty attributes with no values set.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            normal: None,
            tangent: None,
            uv: None,
        }
    }

}

/// A vertex in 3D space with optional attributes.
///
/// Positions are stored in the mesh's local frame; the deformer moves
/// them to world space only while evaluating the displacement field.
///
/// # Example
///
/// ```
/// use mesh_types::{Vertex, Point3};
///
/// let v1 = Vertex::new(Point3::new(1.0, 2.0, 3.0));
/// let v2 = Vertex::from_coords(1.0, 2.0, 3.0);
///
/// assert_eq!(v1.position, v2.position);
/// assert!(v1.normal().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Optional attributes (normal, tangent, uv).
    pub attributes: VertexAttributes,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: VertexAttributes::empty(),
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Get the normal if set.
    #[inline]
    #[must_use]
    pub const fn normal(&self) -> Option<Vector3<f64>> {
        self.attributes.normal
    }
}
