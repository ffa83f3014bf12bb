//! Core mesh types for RBF retargeting.
//!
//! This crate provides the foundational types shared by the deformation
//! pipeline:
//!
//! - [`Vertex`] - A point in 3D space with optional normal/tangent attributes
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices and a blend-shape library
//! - [`BlendShapeLibrary`] - Named morph targets, each an ordered list of weighted frames
//! - [`Provenance`] - Whether a mesh was authored or produced by a deformation pass
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Coordinate System
//!
//! Meshes are stored in the **target** world convention (left-handed,
//! `+Y` up). Conversion from the authoring convention lives in
//! `mesh-transform`.
//!
//! # Example
//!
//! ```
//! use mesh_types::{BlendShapeFrame, IndexedMesh, MeshTopology, Vector3, Vertex};
//!
//! let mut mesh = IndexedMesh::named("Body");
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let lift = vec![Vector3::new(0.0, 0.1, 0.0); 3];
//! mesh.blend_shapes
//!     .push_frame("Lift", BlendShapeFrame::from_positions(100.0, lift));
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert_eq!(mesh.blend_shapes.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod blend_shape;
mod bounds;
mod mesh;
mod traits;
mod triangle;
mod vertex;

pub use blend_shape::{BlendShape, BlendShapeFrame, BlendShapeLibrary};
pub use bounds::Aabb;
pub use mesh::{IndexedMesh, Provenance};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::{Vertex, VertexAttributes};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3, Vector4};
