//! Pose records exported by the authoring tool and their application to a
//! [`Skeleton`].
//!
//! A pose document maps bone names to [`PoseRecord`]s in the source
//! convention:
//!
//! ```json
//! {
//!   "Armature:Hips": {
//!     "location": [0.0, 0.0, 0.05],
//!     "rotation": [0.0, 0.0, 15.0],
//!     "scale": [1.0, 1.0, 1.0],
//!     "head_world": [0.0, 0.0, 1.0],
//!     "head_world_transformed": [0.0, 0.0, 1.05]
//!   }
//! }
//! ```
//!
//! `location` is the world-space head delta, `rotation` the world-space
//! delta rotation as XYZ Euler degrees, and `scale` the accumulated scale
//! factor.

use crate::{BoneId, RetargetError, RetargetResult, Skeleton};
use hashbrown::HashMap;
use mesh_transform::{AxisMapping, euler_degrees_to_target, scale_to_target};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Axis mapping used by pose positions and deltas.
pub const POSE_AXIS_MAPPING: AxisMapping = AxisMapping::Direct;

/// One bone's pose in the source convention.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoseRecord {
    /// World-space head delta.
    pub location: [f64; 3],
    /// World-space delta rotation, XYZ Euler degrees.
    pub rotation: [f64; 3],
    /// Accumulated scale factor per axis.
    pub scale: [f64; 3],
    /// Rest head position in world space.
    pub head_world: Option<[f64; 3]>,
    /// Posed head position in world space. The location delta is only
    /// applied when this is present.
    pub head_world_transformed: Option<[f64; 3]>,
    /// Full 4x4 delta matrix, row-major. Informational.
    pub delta_matrix: Option<Vec<Vec<f64>>>,
}

impl PoseRecord {
    /// A record that leaves a bone at rest.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            head_world: None,
            head_world_transformed: None,
            delta_matrix: None,
        }
    }
}

/// Pose records keyed by bone name.
///
/// # Example
///
/// ```
/// use mesh_retarget::PoseLibrary;
///
/// let json = r#"{"Rig:Hips": {"location": [0,0,0], "rotation": [0,0,0], "scale": [1,1,1]}}"#;
/// let poses = PoseLibrary::from_json(json).unwrap();
///
/// let (key, _) = poses.lookup("Hips").unwrap();
/// assert_eq!(key, "Rig:Hips");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PoseLibrary {
    records: HashMap<String, PoseRecord>,
}

impl PoseLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a pose document.
    ///
    /// # Errors
    ///
    /// [`RetargetError::PoseParse`] for malformed JSON or records.
    pub fn from_json(json: &str) -> RetargetResult<Self> {
        serde_json::from_str(json).map_err(RetargetError::PoseParse)
    }

    /// Read and parse a pose file.
    ///
    /// # Errors
    ///
    /// [`RetargetError::PoseIo`] if the file cannot be read, otherwise as
    /// [`PoseLibrary::from_json`].
    pub fn load(path: impl AsRef<Path>) -> RetargetResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RetargetError::PoseIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Add or replace a record.
    pub fn insert(&mut self, bone: impl Into<String>, record: PoseRecord) {
        self.records.insert(bone.into(), record);
    }

    /// Record stored under exactly `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PoseRecord> {
        self.records.get(key)
    }

    /// Find the record for a bone.
    ///
    /// An exact key wins. Otherwise a key ending in `":" + bone` matches,
    /// which strips namespace prefixes; if several do, the lexicographically
    /// smallest key is used.
    #[must_use]
    pub fn lookup(&self, bone: &str) -> Option<(&str, &PoseRecord)> {
        if let Some((key, record)) = self.records.get_key_value(bone) {
            return Some((key.as_str(), record));
        }
        let suffix = format!(":{bone}");
        self.records
            .iter()
            .filter(|(key, _)| key.ends_with(&suffix))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(key, record)| (key.as_str(), record))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Which bones a pose touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoseReport {
    /// Bones that received a record.
    pub applied: Vec<BoneId>,
    /// Bones with no matching record; left as they were.
    pub unmatched: Vec<BoneId>,
}

/// Apply a pose to every bone with a matching record, parents first.
///
/// Relative to each bone's rest state:
///
/// - position: `rest world position + location` (only with `head_world_transformed`)
/// - rotation: `delta * rest world rotation`
/// - scale: local scale chosen so the world scale is `rest world scale * scale`;
///   a zero parent scale on an axis gives a local scale of 1 on that axis
pub fn apply_pose(skeleton: &mut Skeleton, poses: &PoseLibrary) -> PoseReport {
    let mut report = PoseReport::default();

    for bone in skeleton.ids().collect::<Vec<_>>() {
        let name = skeleton.name(bone).unwrap_or_default();
        let (Some((key, record)), Some(rest)) = (poses.lookup(name), skeleton.rest(bone).copied())
        else {
            report.unmatched.push(bone);
            continue;
        };
        debug!(bone = name, key, "Applying pose record");

        if record.head_world_transformed.is_some() {
            let delta = POSE_AXIS_MAPPING.array_to_target(record.location);
            skeleton.set_world_position(bone, &(rest.world.position + delta));
        }

        let rotation = euler_degrees_to_target(record.rotation) * rest.world.rotation;
        skeleton.set_world_rotation(bone, &rotation);

        let target_scale = rest
            .world
            .lossy_scale
            .component_mul(&scale_to_target(record.scale));
        let local_scale = match skeleton.parent(bone) {
            Some(parent) => {
                let parent_scale = skeleton.world(parent).lossy_scale;
                target_scale.zip_map(&parent_scale, |t, p| if p == 0.0 { 1.0 } else { t / p })
            }
            None => target_scale,
        };
        skeleton.set_local_scale(bone, local_scale);

        report.applied.push(bone);
    }

    info!(
        applied = report.applied.len(),
        unmatched = report.unmatched.len(),
        "Pose applied"
    );
    report
}

/// Return every bone to its rest state.
pub fn reset_pose(skeleton: &mut Skeleton) {
    skeleton.reset_pose();
    debug!(bones = skeleton.len(), "Pose reset");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::BoneTransform;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, UnitQuaternion, Vector3};

    fn record(location: [f64; 3], rotation: [f64; 3], scale: [f64; 3]) -> PoseRecord {
        PoseRecord {
            location,
            rotation,
            scale,
            head_world_transformed: Some([0.0; 3]),
            ..PoseRecord::identity()
        }
    }

    fn two_bones() -> (Skeleton, BoneId, BoneId) {
        let mut skeleton = Skeleton::new();
        let hips = skeleton
            .add_bone("Hips", None, BoneTransform::from_translation(Vector3::new(0.0, 1.0, 0.0)))
            .unwrap();
        let spine = skeleton
            .add_bone("Spine", Some(hips), BoneTransform::from_translation(Vector3::new(0.0, 0.5, 0.0)))
            .unwrap();
        (skeleton, hips, spine)
    }

    #[test]
    fn test_parse_records() {
        let json = r#"{
            "Hips": {"location": [1, 2, 3], "rotation": [0, 0, 90], "scale": [1, 2, 3],
                     "head_world": [0, 0, 1], "head_world_transformed": [1, 2, 4],
                     "delta_matrix": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]]}
        }"#;
        let poses = PoseLibrary::from_json(json).unwrap();
        let hips = poses.get("Hips").unwrap();
        assert_eq!(hips.location, [1.0, 2.0, 3.0]);
        assert_eq!(hips.head_world_transformed, Some([1.0, 2.0, 4.0]));
        assert_eq!(hips.delta_matrix.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_parse_rejects_short_vectors() {
        let json = r#"{"Hips": {"location": [1, 2], "rotation": [0, 0, 0], "scale": [1, 1, 1]}}"#;
        assert!(matches!(
            PoseLibrary::from_json(json),
            Err(RetargetError::PoseParse(_))
        ));
    }

    #[test]
    fn test_lookup_prefers_exact_then_smallest_suffix_match() {
        let mut poses = PoseLibrary::new();
        poses.insert("B:Spine", PoseRecord::identity());
        poses.insert("A:Spine", PoseRecord::identity());
        assert_eq!(poses.lookup("Spine").unwrap().0, "A:Spine");

        poses.insert("Spine", PoseRecord::identity());
        assert_eq!(poses.lookup("Spine").unwrap().0, "Spine");
        assert!(poses.lookup("Neck").is_none());
        assert!(poses.lookup("ine").is_none());
    }

    #[test]
    fn test_position_delta_converted() {
        let (mut skeleton, hips, spine) = two_bones();
        let mut poses = PoseLibrary::new();
        // Source +Y is target -Z; source +Z is target +Y.
        poses.insert("Hips", record([0.0, 1.0, 0.5], [0.0; 3], [1.0; 3]));

        let report = apply_pose(&mut skeleton, &poses);
        assert_eq!(report.applied, vec![hips]);
        assert_eq!(report.unmatched, vec![spine]);

        assert_relative_eq!(
            skeleton.world(hips).position,
            Point3::new(0.0, 1.5, -1.0),
            epsilon = 1e-12
        );
        // The child follows its parent.
        assert_relative_eq!(
            skeleton.world(spine).position,
            Point3::new(0.0, 2.0, -1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_location_ignored_without_transformed_head() {
        let (mut skeleton, hips, _) = two_bones();
        let mut poses = PoseLibrary::new();
        poses.insert(
            "Hips",
            PoseRecord {
                location: [5.0, 5.0, 5.0],
                ..PoseRecord::identity()
            },
        );
        apply_pose(&mut skeleton, &poses);
        assert_relative_eq!(skeleton.world(hips).position, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotation_applied_in_world_space() {
        let (mut skeleton, hips, _) = two_bones();
        let mut poses = PoseLibrary::new();
        poses.insert("Hips", record([0.0; 3], [0.0, 0.0, 90.0], [1.0; 3]));
        apply_pose(&mut skeleton, &poses);

        // Source Z (up) rotation becomes a rotation about target -Y.
        let expected = UnitQuaternion::from_axis_angle(&-Vector3::y_axis(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(skeleton.world(hips).rotation, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_relative_to_parent() {
        let (mut skeleton, hips, spine) = two_bones();
        let mut poses = PoseLibrary::new();
        poses.insert("Hips", record([0.0; 3], [0.0; 3], [2.0, 2.0, 2.0]));
        poses.insert("Spine", record([0.0; 3], [0.0; 3], [3.0, 1.0, 1.0]));
        apply_pose(&mut skeleton, &poses);

        assert_relative_eq!(skeleton.world(hips).lossy_scale, Vector3::new(2.0, 2.0, 2.0));
        // World scale is rest (1) times the record's factor.
        assert_relative_eq!(skeleton.world(spine).lossy_scale, Vector3::new(3.0, 1.0, 1.0));
        assert_relative_eq!(
            skeleton.local(spine).unwrap().scale,
            Vector3::new(1.5, 0.5, 0.5)
        );
    }

    #[test]
    fn test_zero_parent_scale_falls_back_to_unit() {
        let (mut skeleton, _, spine) = two_bones();
        let mut poses = PoseLibrary::new();
        poses.insert("Hips", record([0.0; 3], [0.0; 3], [0.0, 1.0, 1.0]));
        poses.insert("Spine", record([0.0; 3], [0.0; 3], [4.0, 1.0, 1.0]));
        apply_pose(&mut skeleton, &poses);

        let local = skeleton.local(spine).unwrap().scale;
        assert_relative_eq!(local, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_reset_restores_rest() {
        let (mut skeleton, hips, spine) = two_bones();
        let mut poses = PoseLibrary::new();
        poses.insert("Hips", record([1.0, 1.0, 1.0], [10.0, 20.0, 30.0], [2.0; 3]));
        apply_pose(&mut skeleton, &poses);

        reset_pose(&mut skeleton);
        assert_relative_eq!(skeleton.world(hips).position, Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(skeleton.world(spine).position, Point3::new(0.0, 1.5, 0.0));
        assert_relative_eq!(skeleton.world(hips).lossy_scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_missing_pose_file() {
        assert!(matches!(
            PoseLibrary::load("/nonexistent/pose.json"),
            Err(RetargetError::PoseIo { .. })
        ));
    }
}
