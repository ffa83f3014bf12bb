//! Deformation result and metrics.
//!
//! This module provides [`DeformOutput`], the deformed mesh together with
//! statistics describing how far the base vertices moved.

use mesh_types::{Aabb, IndexedMesh, MeshBounds, Point3, Vector3};

/// Displacements at or below this length do not count as modifications.
pub const MODIFIED_THRESHOLD: f64 = 1e-10;

/// Result of deforming one mesh.
///
/// # Examples
///
/// ```
/// use mesh_morph::DeformOutput;
/// use mesh_types::IndexedMesh;
///
/// let output = DeformOutput::new(IndexedMesh::named("Body"));
/// assert_eq!(output.vertices_modified, 0);
/// assert!(output.is_unchanged());
/// ```
#[derive(Debug, Clone)]
pub struct DeformOutput {
    /// The deformed mesh, blend shapes rebuilt.
    pub mesh: IndexedMesh,
    /// Bounds of the deformed base vertices, in mesh-local space.
    pub bounds: Aabb,
    /// Number of base vertices that moved.
    pub vertices_modified: usize,
    /// Largest base vertex displacement.
    pub max_displacement: f64,
    /// Mean displacement over the modified base vertices.
    pub average_displacement: f64,
    /// Number of blend shapes rebuilt.
    pub shapes_processed: usize,
    /// Number of blend-shape frames rebuilt.
    pub frames_processed: usize,
}

impl DeformOutput {
    /// Wrap an unchanged mesh.
    #[must_use]
    pub fn new(mesh: IndexedMesh) -> Self {
        let bounds = mesh.bounds();
        Self {
            mesh,
            bounds,
            vertices_modified: 0,
            max_displacement: 0.0,
            average_displacement: 0.0,
            shapes_processed: 0,
            frames_processed: 0,
        }
    }

    /// Fill the displacement statistics from per-vertex local displacements.
    #[must_use]
    pub fn with_displacements(mut self, displacements: &[Vector3<f64>]) -> Self {
        let mut total = 0.0;
        self.vertices_modified = 0;
        self.max_displacement = 0.0;

        for len in displacements.iter().map(|d| d.norm()) {
            if len > MODIFIED_THRESHOLD {
                self.vertices_modified += 1;
                self.max_displacement = self.max_displacement.max(len);
                total += len;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let average = if self.vertices_modified > 0 {
            total / self.vertices_modified as f64
        } else {
            0.0
        };
        self.average_displacement = average;
        self
    }

    /// Whether no base vertex moved.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.vertices_modified == 0
    }

    /// Deformed base vertex positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.mesh.positions()
    }

    /// Publish the deformed geometry into `target`.
    ///
    /// Vertices, faces, and the blend-shape library are replaced wholesale.
    /// The target keeps its own name and provenance.
    pub fn apply_to(self, target: &mut IndexedMesh) {
        let IndexedMesh {
            vertices,
            faces,
            blend_shapes,
            ..
        } = self.mesh;
        target.vertices = vertices;
        target.faces = faces;
        target.blend_shapes = blend_shapes;
    }

    /// One-line description for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "DeformOutput: {} vertices modified, max displacement: {:.6}, \
             avg displacement: {:.6}, {} shapes / {} frames rebuilt",
            self.vertices_modified,
            self.max_displacement,
            self.average_displacement,
            self.shapes_processed,
            self.frames_processed
        )
    }
}
