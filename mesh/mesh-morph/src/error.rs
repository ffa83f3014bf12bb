//! Error types for model loading and mesh deformation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an interpolation model.
///
/// Any of these aborts a deformation run before a mesh is touched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelLoadError {
    /// The model file could not be read.
    #[error("cannot read model file {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid model JSON (syntax error, missing field,
    /// wrong type).
    #[error("malformed model document: {0}")]
    Parse(#[from] serde_json::Error),

    /// `centers` and `weights` have different lengths.
    #[error("model has {centers} centers but {weights} weights")]
    LengthMismatch {
        /// Number of centers.
        centers: usize,
        /// Number of weights.
        weights: usize,
    },

    /// `poly_weights` does not have exactly four rows.
    #[error("model has {found} polynomial rows, expected 4")]
    PolynomialRows {
        /// Number of rows found.
        found: usize,
    },

    /// The shape parameter is negative or not finite.
    #[error("model epsilon must be finite and non-negative, got {value}")]
    InvalidEpsilon {
        /// The rejected value.
        value: f64,
    },

    /// A row does not hold exactly three numbers.
    #[error("{field}[{index}] has {len} components, expected 3")]
    MalformedVector {
        /// Field name in the document.
        field: &'static str,
        /// Row index.
        index: usize,
        /// Number of components found.
        len: usize,
    },

    /// A row holds NaN or infinite components.
    #[error("{field}[{index}] contains non-finite values")]
    NonFiniteValue {
        /// Field name in the document.
        field: &'static str,
        /// Row index.
        index: usize,
    },
}

/// Result type for model loading.
pub type ModelResult<T> = Result<T, ModelLoadError>;

/// Errors that make a single mesh binding undeformable.
///
/// These are recoverable per target: the caller skips the target and keeps
/// processing the others.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeformError {
    /// A blend-shape frame's position deltas do not match the vertex count.
    #[error(
        "blend shape '{shape}' frame {frame} has {found} position deltas, mesh has {expected} vertices"
    )]
    DeltaLengthMismatch {
        /// Shape name.
        shape: String,
        /// Frame index within the shape.
        frame: usize,
        /// Mesh vertex count.
        expected: usize,
        /// Number of deltas found.
        found: usize,
    },

    /// The deformed base does not match the mesh's vertex count.
    #[error("deformed base has {found} positions, mesh has {expected} vertices")]
    BaseLengthMismatch {
        /// Mesh vertex count.
        expected: usize,
        /// Number of deformed base positions.
        found: usize,
    },

    /// A blend-shape frame's normal or tangent deltas do not match the vertex count.
    #[error("blend shape '{shape}' frame {frame} has normal/tangent deltas of the wrong length")]
    FrameAttributeMismatch {
        /// Shape name.
        shape: String,
        /// Frame index within the shape.
        frame: usize,
    },

    /// A blend shape has no frames.
    #[error("blend shape '{shape}' has no frames")]
    EmptyShape {
        /// Shape name.
        shape: String,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    InvalidFaceIndex {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: u32,
        /// Mesh vertex count.
        vertex_count: usize,
    },
}

/// Result type for deformation.
pub type DeformResult<T> = Result<T, DeformError>;
