//! Retarget a posed mesh library onto runtime targets.
//!
//! A [`DeformationSession`] owns an interpolation model and a set of
//! [`MeshBinding`]s. Each run regenerates every target's derived mesh from
//! its authored original using [`mesh_morph::deform_mesh`], isolating
//! per-target failures and reporting them in a [`SessionReport`].
//!
//! The pose collaborator ([`PoseLibrary`], [`Skeleton`], [`apply_pose`])
//! applies the authoring tool's bone poses to a transform hierarchy using
//! the same coordinate conventions.
//!
//! # Example
//!
//! ```
//! use mesh_morph::ModelSource;
//! use mesh_retarget::{DeformationSession, MeshHost, Scene, SessionConfig};
//! use mesh_transform::TargetTransform;
//! use mesh_types::{IndexedMesh, Vertex};
//!
//! let mut scene = Scene::new();
//! let mut body = IndexedMesh::named("Body");
//! body.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! let target = scene.add_target("Body", Some(body), TargetTransform::identity());
//! scene.add_target("Empty", None, TargetTransform::identity());
//!
//! let model = r#"{"epsilon": 0.5, "centers": [], "weights": [],
//!     "poly_weights": [[0, 0, 0.1], [0, 0, 0], [0, 0, 0], [0, 0, 0]]}"#;
//!
//! let mut session = DeformationSession::new(SessionConfig::default());
//! let report = session.run(&mut scene, &ModelSource::Inline(model.into())).unwrap();
//!
//! assert_eq!(report.deformed.len(), 1);
//! assert_eq!(report.skipped.len(), 1);
//! assert!(scene.shared_mesh(target).unwrap().is_derived());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod binding;
mod config;
mod error;
mod pose;
mod session;
mod skeleton;

pub use binding::{MeshBinding, MeshHost, Scene, SceneNode, TargetId};
pub use config::{DEFAULT_DERIVED_SUFFIX, SessionConfig};
pub use error::{RetargetError, RetargetResult};
pub use pose::{POSE_AXIS_MAPPING, PoseLibrary, PoseRecord, PoseReport, apply_pose, reset_pose};
pub use session::{DeformationSession, SessionReport, SkippedTarget, TargetSummary};
pub use skeleton::{BoneId, BoneTransform, RestState, Skeleton, WorldPose};
