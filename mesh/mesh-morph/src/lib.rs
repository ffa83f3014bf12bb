//! RBF deformation of meshes and blend shapes.
//!
//! This crate applies a precomputed interpolation model to a mesh:
//!
//! - [`InterpolationModel`]: basis centers, weights, polynomial rows, and the
//!   kernel shape parameter, loaded from JSON and converted to the runtime
//!   convention once
//! - [`RbfEvaluator`]: the multiquadric displacement field
//! - [`deform_mesh`]: per-vertex deformation of the base mesh plus rebuilt
//!   blend-shape deltas
//!
//! # Dependencies
//!
//! Builds on `mesh-types` and `mesh-transform`. It depends on no engine or
//! host and never installs a tracing subscriber.
//!
//! # Quick Start
//!
//! ```
//! use mesh_morph::{deform_mesh, DeformParams, InterpolationModel};
//! use mesh_transform::TargetTransform;
//! use mesh_types::{BlendShapeFrame, IndexedMesh, Vertex};
//! use nalgebra::Vector3;
//!
//! let json = r#"{
//!     "epsilon": 1.0,
//!     "centers": [[0.0, 0.0, 0.0]],
//!     "weights": [[0.0, 0.0, 0.01]],
//!     "poly_weights": [[0, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0]]
//! }"#;
//! let model = InterpolationModel::from_json(json).unwrap();
//!
//! let mut mesh = IndexedMesh::named("Body");
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//! mesh.blend_shapes.push_frame(
//!     "Smile",
//!     BlendShapeFrame::from_positions(100.0, vec![Vector3::new(0.0, 0.1, 0.0); 3]),
//! );
//!
//! let output = deform_mesh(&mesh, &TargetTransform::identity(), &model, &DeformParams::default()).unwrap();
//! assert_eq!(output.frames_processed, 1);
//! println!("{}", output.summary());
//! ```
//!
//! # Parallelism
//!
//! Per-vertex evaluation runs on the rayon pool in chunks of
//! [`DeformParams::chunk_size`] vertices. Blend-shape frames are processed
//! one after another.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod deform;
mod error;
mod model;
mod params;
mod rbf;
mod result;

pub use deform::{
    BaseDeformation, deform_base, deform_blend_shapes, deform_mesh, deform_positions,
    displacement_at, local_displacements, validate_binding,
};
pub use error::{DeformError, DeformResult, ModelLoadError, ModelResult};
pub use model::{InterpolationModel, MODEL_AXIS_MAPPING, ModelFile, ModelSource};
pub use params::{DEFAULT_CHUNK_SIZE, DEFAULT_PARALLEL_THRESHOLD, DeformParams};
pub use rbf::{RbfEvaluator, evaluate, multiquadric};
pub use result::{DeformOutput, MODIFIED_THRESHOLD};
