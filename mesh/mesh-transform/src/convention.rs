//! Conversion between the authoring and runtime world conventions.
//!
//! The authoring tool works in a right-handed, `+Z`-up world; the runtime
//! works in a left-handed, `+Y`-up world. Source axis 2 becomes target
//! axis 1, source axis 1 becomes target axis 2 negated, and the polarity of
//! source axis 0 depends on the class of quantity being converted:
//!
//! | Quantity | Mapping | Rule |
//! |----------|---------|------|
//! | Pose points and deltas | `(x, y, z) -> (x, z, -y)` | [`AxisMapping::Direct`] |
//! | Interpolation model centers, weights, polynomial rows | `(x, y, z) -> (-x, z, -y)` | [`AxisMapping::Mirrored`] |
//!
//! Radial terms depend only on distances, so the point rule is all they
//! need. Polynomial coefficients multiply raw input coordinates and have to
//! go through [`polynomial_to_target`], which substitutes the source
//! coordinates expressed in target terms.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Axis mapping from the source convention to the target convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisMapping {
    /// `(x, y, z) -> (x, z, -y)`.
    Direct,
    /// `(x, y, z) -> (-x, z, -y)`.
    Mirrored,
}

impl AxisMapping {
    /// Sign applied to source axis 0.
    #[inline]
    #[must_use]
    pub const fn x_sign(self) -> f64 {
        match self {
            Self::Direct => 1.0,
            Self::Mirrored => -1.0,
        }
    }

    /// Convert a source-convention vector to the target convention.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_transform::AxisMapping;
    /// use nalgebra::Vector3;
    ///
    /// let v = Vector3::new(1.0, 2.0, 3.0);
    /// assert_eq!(AxisMapping::Direct.to_target(&v), Vector3::new(1.0, 3.0, -2.0));
    /// assert_eq!(AxisMapping::Mirrored.to_target(&v), Vector3::new(-1.0, 3.0, -2.0));
    /// ```
    #[inline]
    #[must_use]
    pub fn to_target(self, source: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(self.x_sign() * source.x, source.z, -source.y)
    }

    /// Convert a target-convention vector back to the source convention.
    #[inline]
    #[must_use]
    pub fn from_target(self, target: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(self.x_sign() * target.x, -target.z, target.y)
    }

    /// Convert a raw `[x, y, z]` triple to the target convention.
    #[inline]
    #[must_use]
    pub fn array_to_target(self, source: [f64; 3]) -> Vector3<f64> {
        self.to_target(&Vector3::from(source))
    }
}

/// Convert the four polynomial rows of an interpolation model.
///
/// `rows[0]` is the constant bias; `rows[1..4]` multiply the evaluation
/// point's x, y and z. Each row is first converted as a plain vector with
/// `mapping`, then re-indexed so that the polynomial evaluated on
/// target-convention coordinates yields the converted value of the
/// source-convention polynomial:
///
/// - `x_src = s * x`, so the x row is scaled by `s` (the axis-0 sign)
/// - `y_src = -z`, so the z row is the negated converted y row
/// - `z_src = y`, so the y row is the converted z row
///
/// For [`AxisMapping::Mirrored`] this is `row1' = -row1`, `row2' = row3`,
/// `row3' = -row2`.
///
/// # Example
///
/// ```
/// use mesh_transform::{polynomial_to_target, AxisMapping};
/// use nalgebra::Vector3;
///
/// let zero = Vector3::zeros();
/// let rows = [zero, Vector3::new(1.0, 0.0, 0.0), zero, zero];
/// let converted = polynomial_to_target(AxisMapping::Mirrored, &rows);
/// assert_eq!(converted[1], Vector3::new(1.0, 0.0, 0.0));
/// ```
#[must_use]
pub fn polynomial_to_target(mapping: AxisMapping, rows: &[Vector3<f64>; 4]) -> [Vector3<f64>; 4] {
    let converted = rows.map(|row| mapping.to_target(&row));
    [
        converted[0],
        converted[1] * mapping.x_sign(),
        converted[3],
        -converted[2],
    ]
}

/// Inverse of [`polynomial_to_target`].
#[must_use]
pub fn polynomial_from_target(mapping: AxisMapping, rows: &[Vector3<f64>; 4]) -> [Vector3<f64>; 4] {
    let source_order = [
        rows[0],
        rows[1] * mapping.x_sign(),
        -rows[3],
        rows[2],
    ];
    source_order.map(|row| mapping.from_target(&row))
}

/// Convert a source XYZ Euler rotation (degrees) to a target rotation.
///
/// The source rotation is composed as `Rz * Ry * Rx`; its quaternion
/// components `(x, y, z, w)` map to `(x, -z, y, w)`.
#[must_use]
pub fn euler_degrees_to_target(euler: [f64; 3]) -> UnitQuaternion<f64> {
    let [x, y, z] = euler.map(f64::to_radians);
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z);
    let q = (qz * qy * qx).into_inner();

    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.i, -q.k, q.j))
}

/// Convert per-axis source scale factors to target axes.
///
/// Scale magnitudes carry no sign, so the axis swap is all that applies:
/// `(x, y, z) -> (x, z, y)`.
#[inline]
#[must_use]
pub fn scale_to_target(scale: [f64; 3]) -> Vector3<f64> {
    Vector3::new(scale[0], scale[2], scale[1])
}
