//! Transforms and world-convention conversion for mesh retargeting.
//!
//! This crate provides:
//! - [`Transform3D`] affine matrices (translate, rotate, scale, compose)
//! - [`TargetTransform`], the world placement of a deformation target
//! - Conversion between the authoring convention (right-handed, `+Z` up)
//!   and the runtime convention (left-handed, `+Y` up), see [`AxisMapping`]
//!
//! # Example
//!
//! ```
//! use mesh_transform::{AxisMapping, TargetTransform};
//! use nalgebra::{Point3, Vector3};
//!
//! // A model center authored at source (1, 2, 3)
//! let center = AxisMapping::Mirrored.array_to_target([1.0, 2.0, 3.0]);
//! assert_eq!(center, Vector3::new(-1.0, 3.0, -2.0));
//!
//! let placement = TargetTransform::identity();
//! let world = placement.to_world(&Point3::new(0.0, 1.0, 0.0));
//! assert_eq!(world, Point3::new(0.0, 1.0, 0.0));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod convention;
mod error;
mod target;
mod transform;

pub use convention::{
    AxisMapping, euler_degrees_to_target, polynomial_from_target, polynomial_to_target,
    scale_to_target,
};
pub use error::{TransformError, TransformResult};
pub use target::TargetTransform;
pub use transform::Transform3D;
