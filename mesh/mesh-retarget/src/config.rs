//! Session configuration.
//!
//! # Example
//!
//! ```
//! use mesh_retarget::SessionConfig;
//!
//! let config = SessionConfig::from_json(r#"{"derived_suffix": "_Fitted", "params": {"chunk_size": 128}}"#).unwrap();
//! assert_eq!(config.derived_suffix, "_Fitted");
//! assert_eq!(config.params.chunk_size, 128);
//! assert!(config.params.parallel);
//! ```

use crate::{RetargetError, RetargetResult};
use mesh_morph::DeformParams;
use serde::Deserialize;

/// Default display-name suffix for derived meshes.
pub const DEFAULT_DERIVED_SUFFIX: &str = "_Preview";

/// Configuration for a [`DeformationSession`](crate::DeformationSession).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Scheduling and output options for every deformation.
    pub params: DeformParams,

    /// Appended to an original mesh's name to name its derived mesh.
    ///
    /// Display only; derived meshes are recognized by their provenance tag.
    pub derived_suffix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            params: DeformParams::default(),
            derived_suffix: DEFAULT_DERIVED_SUFFIX.to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RetargetError::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> RetargetResult<Self> {
        serde_json::from_str(json).map_err(RetargetError::Config)
    }

    /// Set the deformation parameters.
    #[must_use]
    pub fn with_params(mut self, params: DeformParams) -> Self {
        self.params = params;
        self
    }

    /// Set the derived-mesh suffix.
    #[must_use]
    pub fn with_derived_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.derived_suffix = suffix.into();
        self
    }
}
