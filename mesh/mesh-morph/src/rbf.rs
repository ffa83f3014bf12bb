//! Multiquadric RBF evaluation.
//!
//! The displacement at a world-space point `p` is
//!
//! ```text
//! d(p) = sum_i w_i * sqrt(|p - c_i|^2 + eps^2) + b + a_x * p.x + a_y * p.y + a_z * p.z
//! ```
//!
//! Centers are summed in load order, so the result is deterministic for a
//! given model.

use crate::InterpolationModel;
use nalgebra::{Point3, Vector3};

/// Multiquadric kernel on a squared distance.
///
/// Always real and at least `sqrt(eps_sq)` for a non-negative `eps_sq`.
///
/// # Example
///
/// ```
/// use mesh_morph::multiquadric;
///
/// assert_eq!(multiquadric(0.0, 1.0), 1.0);
/// assert_eq!(multiquadric(3.0, 1.0), 2.0);
/// ```
#[inline]
#[must_use]
pub fn multiquadric(dist_sq: f64, eps_sq: f64) -> f64 {
    (dist_sq + eps_sq).sqrt()
}

/// Evaluates a model's displacement field.
///
/// Borrows the model immutably and holds no other state, so one evaluator
/// can be shared across worker threads.
#[derive(Debug, Clone, Copy)]
pub struct RbfEvaluator<'a> {
    model: &'a InterpolationModel,
}

impl<'a> RbfEvaluator<'a> {
    /// Create an evaluator for `model`.
    #[inline]
    #[must_use]
    pub const fn new(model: &'a InterpolationModel) -> Self {
        Self { model }
    }

    /// The model being evaluated.
    #[inline]
    #[must_use]
    pub const fn model(&self) -> &'a InterpolationModel {
        self.model
    }

    /// Sum of the weighted kernel terms at `point`.
    #[must_use]
    pub fn radial(&self, point: &Point3<f64>) -> Vector3<f64> {
        let eps_sq = self.model.epsilon_sq();
        self.model
            .centers()
            .iter()
            .zip(self.model.weights())
            .fold(Vector3::zeros(), |acc, (center, weight)| {
                let dist_sq = (point - center).norm_squared();
                acc + weight * multiquadric(dist_sq, eps_sq)
            })
    }

    /// Bias plus the linear term at `point`.
    #[must_use]
    pub fn polynomial(&self, point: &Point3<f64>) -> Vector3<f64> {
        let [bias, coeff_x, coeff_y, coeff_z] = self.model.poly_weights();
        bias + coeff_x * point.x + coeff_y * point.y + coeff_z * point.z
    }

    /// Full displacement at `point`, in target world space.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.radial(point) + self.polynomial(point)
    }
}

/// Displacement of `model` at `point`.
///
/// # Example
///
/// ```
/// use mesh_morph::{evaluate, InterpolationModel};
/// use nalgebra::{Point3, Vector3};
///
/// let model = InterpolationModel::new(
///     1.0,
///     vec![Point3::origin()],
///     vec![Vector3::new(0.0, 0.0, 1.0)],
///     [Vector3::zeros(); 4],
/// ).unwrap();
///
/// let d = evaluate(&Point3::new(0.0, 0.0, 3.0_f64.sqrt()), &model);
/// assert!((d.z - 2.0).abs() < 1e-12);
/// ```
#[inline]
#[must_use]
pub fn evaluate(point: &Point3<f64>, model: &InterpolationModel) -> Vector3<f64> {
    RbfEvaluator::new(model).evaluate(point)
}
