//! A minimal bone hierarchy for the pose collaborator.
//!
//! Bones store local translation, rotation, and scale. World placement is
//! derived by walking up to the root, with world scale approximated as the
//! component-wise product of local scales (the "lossy" scale). Parents are
//! always added before their children, so index order is a valid
//! parent-first traversal.

use crate::{RetargetError, RetargetResult};
use hashbrown::HashMap;
use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Index of a bone within its skeleton.
pub type BoneId = usize;

/// Local transform of a bone relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    /// Translation in parent space.
    pub translation: Vector3<f64>,
    /// Rotation relative to the parent.
    pub rotation: UnitQuaternion<f64>,
    /// Per-axis scale.
    pub scale: Vector3<f64>,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl BoneTransform {
    /// A transform with only a translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }
}

/// World placement of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPose {
    /// Bone origin in world space.
    pub position: Point3<f64>,
    /// World rotation.
    pub rotation: UnitQuaternion<f64>,
    /// Accumulated per-axis scale.
    pub lossy_scale: Vector3<f64>,
}

impl WorldPose {
    fn root() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            lossy_scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Rest state captured for a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestState {
    /// Local transform at rest.
    pub local: BoneTransform,
    /// World placement at rest.
    pub world: WorldPose,
}

#[derive(Debug, Clone)]
struct Bone {
    name: String,
    parent: Option<BoneId>,
    local: BoneTransform,
    rest: RestState,
}

/// Bone hierarchy with captured rest states.
///
/// # Example
///
/// ```
/// use mesh_retarget::{BoneTransform, Skeleton};
/// use nalgebra::{Point3, Vector3};
///
/// let mut skeleton = Skeleton::new();
/// let hips = skeleton.add_bone("Hips", None, BoneTransform::from_translation(Vector3::new(0.0, 1.0, 0.0))).unwrap();
/// let spine = skeleton.add_bone("Spine", Some(hips), BoneTransform::from_translation(Vector3::new(0.0, 0.2, 0.0))).unwrap();
///
/// let world = skeleton.world(spine);
/// assert!((world.position - Point3::new(0.0, 1.2, 0.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: HashMap<String, BoneId>,
}

impl Skeleton {
    /// Create an empty skeleton.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone. Its rest state is captured immediately.
    ///
    /// # Errors
    ///
    /// [`RetargetError::DuplicateBone`] if the name is taken,
    /// [`RetargetError::UnknownParent`] if `parent` is not an existing bone.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        local: BoneTransform,
    ) -> RetargetResult<BoneId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RetargetError::DuplicateBone { name });
        }
        if let Some(p) = parent.filter(|&p| p >= self.bones.len()) {
            return Err(RetargetError::UnknownParent {
                bone: name,
                parent: p,
            });
        }

        let id = self.bones.len();
        let world = compose(&self.parent_world(parent), &local);
        self.bones.push(Bone {
            name: name.clone(),
            parent,
            local,
            rest: RestState { local, world },
        });
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Number of bones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Whether there are no bones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Find a bone by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(name).copied()
    }

    /// Name of a bone.
    #[must_use]
    pub fn name(&self, bone: BoneId) -> Option<&str> {
        self.bones.get(bone).map(|b| b.name.as_str())
    }

    /// Parent of a bone.
    #[must_use]
    pub fn parent(&self, bone: BoneId) -> Option<BoneId> {
        self.bones.get(bone).and_then(|b| b.parent)
    }

    /// Bone ids in parent-first order.
    pub fn ids(&self) -> impl Iterator<Item = BoneId> {
        0..self.bones.len()
    }

    /// Current local transform of a bone.
    #[must_use]
    pub fn local(&self, bone: BoneId) -> Option<&BoneTransform> {
        self.bones.get(bone).map(|b| &b.local)
    }

    /// Captured rest state of a bone.
    #[must_use]
    pub fn rest(&self, bone: BoneId) -> Option<&RestState> {
        self.bones.get(bone).map(|b| &b.rest)
    }

    /// Current world placement. Unknown ids resolve to the world origin.
    #[must_use]
    pub fn world(&self, bone: BoneId) -> WorldPose {
        self.bones.get(bone).map_or_else(WorldPose::root, |b| {
            compose(&self.parent_world(b.parent), &b.local)
        })
    }

    fn parent_world(&self, parent: Option<BoneId>) -> WorldPose {
        parent.map_or_else(WorldPose::root, |p| self.world(p))
    }

    /// Move a bone so its origin lands on `position`.
    ///
    /// A zero parent scale on an axis leaves that local axis at zero.
    pub fn set_world_position(&mut self, bone: BoneId, position: &Point3<f64>) {
        let Some(parent) = self.bones.get(bone).map(|b| b.parent) else {
            return;
        };
        let pw = self.parent_world(parent);
        let unrotated = pw.rotation.inverse_transform_vector(&(position - pw.position));
        let translation = unrotated.zip_map(&pw.lossy_scale, |v, s| if s == 0.0 { 0.0 } else { v / s });
        self.bones[bone].local.translation = translation;
    }

    /// Orient a bone to `rotation` in world space.
    pub fn set_world_rotation(&mut self, bone: BoneId, rotation: &UnitQuaternion<f64>) {
        let Some(parent) = self.bones.get(bone).map(|b| b.parent) else {
            return;
        };
        let pw = self.parent_world(parent);
        self.bones[bone].local.rotation = pw.rotation.inverse() * rotation;
    }

    /// Set a bone's local scale.
    pub fn set_local_scale(&mut self, bone: BoneId, scale: Vector3<f64>) {
        if let Some(b) = self.bones.get_mut(bone) {
            b.local.scale = scale;
        }
    }

    /// Restore every bone's rest local transform.
    pub fn reset_pose(&mut self) {
        for bone in &mut self.bones {
            bone.local = bone.rest.local;
        }
    }
}

fn compose(parent: &WorldPose, local: &BoneTransform) -> WorldPose {
    let scaled = parent.lossy_scale.component_mul(&local.translation);
    WorldPose {
        position: parent.position + parent.rotation * scaled,
        rotation: parent.rotation * local.rotation,
        lossy_scale: parent.lossy_scale.component_mul(&local.scale),
    }
}
