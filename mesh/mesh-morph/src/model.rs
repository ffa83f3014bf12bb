//! The interpolation model consumed at deformation time.
//!
//! A model file is a JSON document authored in the source convention:
//!
//! ```json
//! {
//!   "epsilon": 0.5,
//!   "centers": [[0.0, 0.0, 0.0], [0.1, 0.2, 0.3]],
//!   "weights": [[0.0, 0.0, 0.01], [0.0, 0.02, 0.0]],
//!   "poly_weights": [[0, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0]]
//! }
//! ```
//!
//! Loading validates the document and converts every quantity to the
//! target convention once, so evaluation never has to think about axes.

use crate::{ModelLoadError, ModelResult};
use mesh_transform::{AxisMapping, polynomial_to_target};
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Axis mapping used by interpolation model files.
pub const MODEL_AXIS_MAPPING: AxisMapping = AxisMapping::Mirrored;

/// Raw model document, exactly as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelFile {
    /// Shape parameter of the multiquadric kernel.
    pub epsilon: f64,
    /// Basis centers, source convention.
    pub centers: Vec<Vec<f64>>,
    /// Per-center weights, source convention.
    pub weights: Vec<Vec<f64>>,
    /// Bias row followed by the x, y, z coefficient rows, source convention.
    pub poly_weights: Vec<Vec<f64>>,
}

/// Where to load a model from.
///
/// An in-memory document takes precedence over a path when a caller has
/// both, see [`ModelSource::first_available`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A JSON document already in memory.
    Inline(String),
    /// A JSON file on disk.
    Path(PathBuf),
}

impl ModelSource {
    /// Pick the inline document if present, otherwise the path.
    #[must_use]
    pub fn first_available(inline: Option<String>, path: Option<PathBuf>) -> Option<Self> {
        inline.map(Self::Inline).or_else(|| path.map(Self::Path))
    }

    /// Load and convert the model.
    ///
    /// # Errors
    ///
    /// Any [`ModelLoadError`]; no model is built on failure.
    pub fn load(&self) -> ModelResult<InterpolationModel> {
        match self {
            Self::Inline(json) => InterpolationModel::from_json(json),
            Self::Path(path) => InterpolationModel::load(path),
        }
    }
}

/// Immutable RBF model in target world space.
///
/// Holds `N` basis centers with index-aligned weight vectors, four
/// polynomial rows (bias, then the coefficients of world x, y and z), and
/// the kernel shape parameter. Center order is preserved exactly as loaded.
///
/// # Example
///
/// ```
/// use mesh_morph::InterpolationModel;
/// use nalgebra::{Point3, Vector3};
///
/// let model = InterpolationModel::new(
///     1.0,
///     vec![Point3::origin()],
///     vec![Vector3::new(0.0, 0.0, 1.0)],
///     [Vector3::zeros(); 4],
/// ).unwrap();
///
/// assert_eq!(model.center_count(), 1);
/// assert_eq!(model.epsilon_sq(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationModel {
    epsilon: f64,
    epsilon_sq: f64,
    centers: Vec<Point3<f64>>,
    weights: Vec<Vector3<f64>>,
    poly_weights: [Vector3<f64>; 4],
}

impl InterpolationModel {
    /// Build a model from target-space data.
    ///
    /// # Errors
    ///
    /// - [`ModelLoadError::InvalidEpsilon`] if `epsilon` is negative or not finite
    /// - [`ModelLoadError::LengthMismatch`] if `centers` and `weights` differ in length
    /// - [`ModelLoadError::NonFiniteValue`] if any component is NaN or infinite
    pub fn new(
        epsilon: f64,
        centers: Vec<Point3<f64>>,
        weights: Vec<Vector3<f64>>,
        poly_weights: [Vector3<f64>; 4],
    ) -> ModelResult<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ModelLoadError::InvalidEpsilon { value: epsilon });
        }
        if centers.len() != weights.len() {
            return Err(ModelLoadError::LengthMismatch {
                centers: centers.len(),
                weights: weights.len(),
            });
        }
        check_finite("centers", centers.iter().map(|c| &c.coords))?;
        check_finite("weights", weights.iter())?;
        check_finite("poly_weights", poly_weights.iter())?;

        Ok(Self {
            epsilon,
            epsilon_sq: epsilon * epsilon,
            centers,
            weights,
            poly_weights,
        })
    }

    /// Build a model from a source-convention document.
    ///
    /// # Errors
    ///
    /// Any validation error from [`InterpolationModel::new`], plus
    /// [`ModelLoadError::PolynomialRows`] and [`ModelLoadError::MalformedVector`].
    pub fn from_file_data(file: &ModelFile) -> ModelResult<Self> {
        if file.poly_weights.len() != 4 {
            return Err(ModelLoadError::PolynomialRows {
                found: file.poly_weights.len(),
            });
        }
        if file.centers.len() != file.weights.len() {
            return Err(ModelLoadError::LengthMismatch {
                centers: file.centers.len(),
                weights: file.weights.len(),
            });
        }

        let centers = convert_rows("centers", &file.centers)?
            .into_iter()
            .map(Point3::from)
            .collect();
        let weights = convert_rows("weights", &file.weights)?;

        let rows = parse_rows("poly_weights", &file.poly_weights)?;
        let source_rows = [rows[0], rows[1], rows[2], rows[3]];
        let poly_weights = polynomial_to_target(MODEL_AXIS_MAPPING, &source_rows);

        Self::new(file.epsilon, centers, weights, poly_weights)
    }

    /// Parse and convert a JSON model document.
    ///
    /// # Errors
    ///
    /// [`ModelLoadError::Parse`] for malformed JSON, otherwise as
    /// [`InterpolationModel::from_file_data`].
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        let model = Self::from_file_data(&file)?;
        debug!(
            centers = model.center_count(),
            epsilon = model.epsilon,
            "Loaded interpolation model"
        );
        Ok(model)
    }

    /// Read, parse and convert a JSON model file.
    ///
    /// # Errors
    ///
    /// [`ModelLoadError::Io`] if the file cannot be read, otherwise as
    /// [`InterpolationModel::from_json`].
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Kernel shape parameter.
    #[inline]
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Squared shape parameter, added under the kernel's square root.
    #[inline]
    #[must_use]
    pub const fn epsilon_sq(&self) -> f64 {
        self.epsilon_sq
    }

    /// Basis centers in load order.
    #[inline]
    #[must_use]
    pub fn centers(&self) -> &[Point3<f64>] {
        &self.centers
    }

    /// Weights, index-aligned with [`InterpolationModel::centers`].
    #[inline]
    #[must_use]
    pub fn weights(&self) -> &[Vector3<f64>] {
        &self.weights
    }

    /// Bias row, then the coefficients of world x, y and z.
    #[inline]
    #[must_use]
    pub const fn poly_weights(&self) -> &[Vector3<f64>; 4] {
        &self.poly_weights
    }

    /// Number of basis centers.
    #[inline]
    #[must_use]
    pub fn center_count(&self) -> usize {
        self.centers.len()
    }

    /// Whether every polynomial coefficient is zero.
    #[must_use]
    pub fn polynomial_is_zero(&self) -> bool {
        self.poly_weights.iter().all(|row| *row == Vector3::zeros())
    }

    /// Whether the model produces no displacement anywhere.
    ///
    /// True when there are no centers and the polynomial is zero.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.centers.is_empty() && self.polynomial_is_zero()
    }
}

fn parse_rows(field: &'static str, rows: &[Vec<f64>]) -> ModelResult<Vec<Vector3<f64>>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| match row.as_slice() {
            &[x, y, z] => Ok(Vector3::new(x, y, z)),
            _ => Err(ModelLoadError::MalformedVector {
                field,
                index,
                len: row.len(),
            }),
        })
        .collect()
}

fn convert_rows(field: &'static str, rows: &[Vec<f64>]) -> ModelResult<Vec<Vector3<f64>>> {
    Ok(parse_rows(field, rows)?
        .iter()
        .map(|row| MODEL_AXIS_MAPPING.to_target(row))
        .collect())
}

fn check_finite<'a>(
    field: &'static str,
    rows: impl Iterator<Item = &'a Vector3<f64>>,
) -> ModelResult<()> {
    for (index, row) in rows.enumerate() {
        if !row.iter().all(|c| c.is_finite()) {
            return Err(ModelLoadError::NonFiniteValue { field, index });
        }
    }
    Ok(())
}
