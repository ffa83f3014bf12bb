//! Indexed triangle mesh.

use crate::{Aabb, BlendShapeLibrary, MeshBounds, MeshTopology, Triangle, Vertex};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a mesh came from.
///
/// Derived meshes are the output of a deformation pass. They must never be
/// adopted as the original of a new pass, otherwise the deformation would
/// be applied on top of itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Provenance {
    /// Authored or imported mesh data.
    #[default]
    Authored,
    /// Produced from the named original by a deformation pass.
    Derived {
        /// Name of the original mesh.
        source: String,
    },
}

/// An indexed triangle mesh with a blend-shape library.
///
/// # Memory Layout
///
/// - `vertices`: `Vec<Vertex>` - Vertex positions and attributes
/// - `faces`: `Vec<[u32; 3]>` - Triangle faces as vertex indices
/// - `blend_shapes`: Morph targets whose deltas are index-aligned with `vertices`
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Display name.
    pub name: String,

    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,

    /// Blend shapes with per-vertex deltas.
    pub blend_shapes: BlendShapeLibrary,

    /// Authored or derived.
    pub provenance: Provenance,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: String::new(),
            vertices: Vec::new(),
            faces: Vec::new(),
            blend_shapes: BlendShapeLibrary::new(),
            provenance: Provenance::Authored,
        }
    }

    /// Create a new empty mesh with a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    /// Whether this mesh is the output of a deformation pass.
    #[inline]
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        matches!(self.provenance, Provenance::Derived { .. })
    }

    /// Clone this mesh as the starting point of a derived mesh.
    ///
    /// The copy is named `<name><suffix>` and tagged [`Provenance::Derived`].
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, Provenance};
    ///
    /// let original = IndexedMesh::named("Body");
    /// let derived = original.derive("_Preview");
    ///
    /// assert_eq!(derived.name, "Body_Preview");
    /// assert!(derived.is_derived());
    /// assert_eq!(derived.provenance, Provenance::Derived { source: "Body".into() });
    /// ```
    #[must_use]
    pub fn derive(&self, suffix: &str) -> Self {
        let mut derived = self.clone();
        derived.name = format!("{}{suffix}", self.name);
        derived.provenance = Provenance::Derived {
            source: self.name.clone(),
        };
        derived
    }

    /// Collect the vertex positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Overwrite vertex positions, keeping attributes.
    ///
    /// Extra positions are ignored; vertices without a matching position
    /// keep their current one.
    pub fn set_positions(&mut self, positions: &[Point3<f64>]) {
        for (vertex, position) in self.vertices.iter_mut().zip(positions) {
            vertex.position = *position;
        }
    }

    /// Rebuild vertex normals from the faces.
    ///
    /// Each vertex normal is the normalized sum of the unnormalized normals
    /// of its incident faces (area weighting). Vertices that touch no
    /// non-degenerate face keep their previous normal. Faces with
    /// out-of-range indices are ignored.
    pub fn recompute_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];

        for face_index in 0..self.faces.len() {
            let Some(tri) = self.triangle(face_index) else {
                continue;
            };
            let face_normal = tri.normal_unnormalized();
            for &idx in &self.faces[face_index] {
                normals[idx as usize] += face_normal;
            }
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(&normals) {
            let len = normal.norm();
            if len > 1e-10 {
                vertex.attributes.normal = Some(normal / len);
            }
        }
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let [i0, i1, i2] = *self.faces.get(face_index)?;
        Some(Triangle {
            v0: self.vertices.get(i0 as usize)?.position,
            v1: self.vertices.get(i1 as usize)?.position,
            v2: self.vertices.get(i2 as usize)?.position,
        })
    }

    fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    fn faces(&self) -> impl Iterator<Item = [u32; 3]> {
        self.faces.iter().copied()
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        if self.vertices.is_empty() {
            return Aabb::empty();
        }

        let positions = self.vertices.iter().map(|v| &v.position);
        Aabb::from_points(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> IndexedMesh {
        let mut mesh = IndexedMesh::named("Quad");
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 2, 3]);
        mesh
    }

    #[test]
    fn mesh_is_empty() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());

        let mut mesh2 = IndexedMesh::new();
        mesh2.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(mesh2.is_empty()); // no faces

        mesh2.faces.push([0, 0, 0]);
        assert!(!mesh2.is_empty());
    }

    #[test]
    fn mesh_bounds() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(10.0, 5.0, 3.0));
        mesh.vertices.push(Vertex::from_coords(-2.0, 8.0, 1.0));

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(10.0, 8.0, 3.0));
        assert!(IndexedMesh::new().bounds().is_empty());
    }

    #[test]
    fn recompute_normals_on_flat_quad() {
        let mut mesh = quad();
        mesh.recompute_normals();
        for v in &mesh.vertices {
            let n = v.normal().unwrap_or_else(Vector3::zeros);
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn recompute_normals_skips_bad_faces() {
        let mut mesh = quad();
        mesh.faces.push([0, 1, 99]);
        mesh.recompute_normals();
        assert!(mesh.vertices.iter().all(|v| v.normal().is_some()));
    }

    #[test]
    fn derive_tags_provenance() {
        let mesh = quad();
        assert!(!mesh.is_derived());

        let derived = mesh.derive("_Preview");
        assert!(derived.is_derived());
        assert_eq!(derived.name, "Quad_Preview");
        assert_eq!(derived.vertices, mesh.vertices);
    }

    #[test]
    fn set_positions_keeps_attributes() {
        let mut mesh = quad();
        mesh.recompute_normals();
        let moved: Vec<_> = mesh
            .positions()
            .iter()
            .map(|p| p + Vector3::new(0.0, 0.0, 2.0))
            .collect();
        mesh.set_positions(&moved);

        assert_relative_eq!(mesh.vertices[2].position.z, 2.0);
        assert!(mesh.vertices[2].normal().is_some());
    }
}
