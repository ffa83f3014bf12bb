//! Error types for retargeting sessions and pose application.

use crate::TargetId;
use mesh_morph::{DeformError, ModelLoadError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a deformation session or the pose collaborator.
///
/// Model and configuration errors abort a run. Per-target errors
/// ([`RetargetError::NoOriginalMesh`], [`RetargetError::AlreadyDerived`],
/// [`RetargetError::TargetMissing`], [`RetargetError::Deform`]) are collected
/// in the session report instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RetargetError {
    /// The interpolation model could not be loaded.
    #[error("failed to load interpolation model: {0}")]
    ModelLoad(#[from] ModelLoadError),

    /// A run was requested with no model loaded.
    #[error("no interpolation model loaded")]
    NoModel,

    /// A session configuration document could not be parsed.
    #[error("invalid session config: {0}")]
    Config(#[source] serde_json::Error),

    /// A target has no mesh to adopt.
    #[error("target {target} has no mesh")]
    NoOriginalMesh {
        /// The target.
        target: TargetId,
    },

    /// A target's mesh is already the output of a deformation.
    #[error("target {target} already shows derived mesh '{mesh}'")]
    AlreadyDerived {
        /// The target.
        target: TargetId,
        /// Name of the derived mesh.
        mesh: String,
    },

    /// A bound target no longer exists in the host.
    #[error("target {target} is no longer present")]
    TargetMissing {
        /// The target.
        target: TargetId,
    },

    /// A target's mesh data cannot be deformed.
    #[error("cannot deform target {target}: {source}")]
    Deform {
        /// The target.
        target: TargetId,
        /// Underlying binding error.
        #[source]
        source: DeformError,
    },

    /// A pose file could not be read.
    #[error("cannot read pose file {path}: {source}")]
    PoseIo {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A pose document could not be parsed.
    #[error("malformed pose document: {0}")]
    PoseParse(#[source] serde_json::Error),

    /// A bone name is already present in the skeleton.
    #[error("duplicate bone '{name}'")]
    DuplicateBone {
        /// The bone name.
        name: String,
    },

    /// A bone refers to a parent that has not been added yet.
    #[error("bone '{bone}' refers to unknown parent index {parent}")]
    UnknownParent {
        /// The bone name.
        bone: String,
        /// The parent index given.
        parent: usize,
    },
}

/// Result type for retargeting operations.
pub type RetargetResult<T> = Result<T, RetargetError>;
