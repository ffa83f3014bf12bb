//! Deformation parameters.
//!
//! This module provides [`DeformParams`], which controls how per-vertex
//! evaluation is scheduled and how the output mesh is finalized. None of the
//! parameters change the displacement computed for a vertex.

use serde::Deserialize;

/// Default number of vertices per parallel work unit.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Default vertex count below which evaluation stays on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// Parameters for mesh deformation.
///
/// Deserializes from partial JSON; missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use mesh_morph::DeformParams;
///
/// let params = DeformParams::default()
///     .with_chunk_size(256)
///     .with_recompute_normals(false);
///
/// assert_eq!(params.chunk_size, 256);
/// assert!(params.parallel);
/// ```
///
/// ```
/// use mesh_morph::DeformParams;
///
/// let params: DeformParams = serde_json::from_str(r#"{"parallel": false}"#).unwrap();
/// assert_eq!(params.chunk_size, 64);
/// assert!(!params.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeformParams {
    /// Vertices per parallel work unit. Zero is treated as one.
    pub chunk_size: usize,
    /// Whether to evaluate vertices on the rayon thread pool.
    pub parallel: bool,
    /// Meshes with fewer vertices than this are evaluated serially.
    pub parallel_threshold: usize,
    /// Whether to recompute vertex normals on the deformed base mesh.
    pub recompute_normals: bool,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            recompute_normals: true,
        }
    }
}

impl DeformParams {
    /// Parameters that keep all evaluation on the calling thread.
    #[must_use]
    pub fn serial() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Set the chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enable or disable parallel evaluation.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the serial/parallel cutoff.
    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Enable or disable normal recomputation.
    #[must_use]
    pub const fn with_recompute_normals(mut self, recompute: bool) -> Self {
        self.recompute_normals = recompute;
        self
    }

    /// Chunk size clamped to at least one vertex.
    #[inline]
    #[must_use]
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Whether a mesh of `vertex_count` vertices goes to the thread pool.
    #[inline]
    #[must_use]
    pub const fn use_parallel(&self, vertex_count: usize) -> bool {
        self.parallel && vertex_count >= self.parallel_threshold
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DeformParams::default();
        assert_eq!(params.chunk_size, 64);
        assert!(params.parallel);
        assert_eq!(params.parallel_threshold, 1024);
        assert!(params.recompute_normals);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let params = DeformParams::default().with_chunk_size(0);
        assert_eq!(params.effective_chunk_size(), 1);
    }

    #[test]
    fn test_parallel_cutoff() {
        let params = DeformParams::default().with_parallel_threshold(100);
        assert!(!params.use_parallel(99));
        assert!(params.use_parallel(100));
        assert!(!DeformParams::serial().use_parallel(1_000_000));
    }

    #[test]
    fn test_partial_json() {
        let params: DeformParams =
            serde_json::from_str(r#"{"chunk_size": 8, "recompute_normals": false}"#).unwrap();
        assert_eq!(params.chunk_size, 8);
        assert!(!params.recompute_normals);
        assert!(params.parallel);
        assert_eq!(params.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }
}
