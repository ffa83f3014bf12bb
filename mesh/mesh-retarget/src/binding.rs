//! Deformation targets and the host that owns them.
//!
//! A host is anything that holds renderable targets, each with a mesh slot
//! and a world placement. [`Scene`] is a plain in-memory host.

use mesh_transform::TargetTransform;
use mesh_types::IndexedMesh;
use std::fmt;

/// Stable identifier of a target within its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Access to the targets a session deforms.
pub trait MeshHost {
    /// All targets, in traversal order.
    fn target_ids(&self) -> Vec<TargetId>;

    /// Display name of a target.
    fn target_name(&self, target: TargetId) -> Option<&str>;

    /// The mesh currently assigned to a target.
    fn shared_mesh(&self, target: TargetId) -> Option<&IndexedMesh>;

    /// Mutable access to the mesh currently assigned to a target.
    fn shared_mesh_mut(&mut self, target: TargetId) -> Option<&mut IndexedMesh>;

    /// Assign a mesh to a target. Ignored for unknown targets.
    fn set_shared_mesh(&mut self, target: TargetId, mesh: IndexedMesh);

    /// Current world placement of a target.
    fn transform(&self, target: TargetId) -> Option<TargetTransform>;
}

/// One target in a [`Scene`].
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Display name.
    pub name: String,
    /// Assigned mesh, if any.
    pub mesh: Option<IndexedMesh>,
    /// World placement.
    pub transform: TargetTransform,
}

/// In-memory [`MeshHost`].
///
/// # Example
///
/// ```
/// use mesh_retarget::{MeshHost, Scene};
/// use mesh_transform::TargetTransform;
/// use mesh_types::IndexedMesh;
///
/// let mut scene = Scene::new();
/// let body = scene.add_target("Body", Some(IndexedMesh::named("BodyMesh")), TargetTransform::identity());
///
/// assert_eq!(scene.target_ids(), vec![body]);
/// assert_eq!(scene.shared_mesh(body).unwrap().name, "BodyMesh");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<(TargetId, SceneNode)>,
    next_id: u64,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a target and return its id.
    pub fn add_target(
        &mut self,
        name: impl Into<String>,
        mesh: Option<IndexedMesh>,
        transform: TargetTransform,
    ) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.nodes.push((
            id,
            SceneNode {
                name: name.into(),
                mesh,
                transform,
            },
        ));
        id
    }

    /// Remove a target, returning its node.
    pub fn remove_target(&mut self, target: TargetId) -> Option<SceneNode> {
        let pos = self.nodes.iter().position(|(id, _)| *id == target)?;
        Some(self.nodes.remove(pos).1)
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, target: TargetId) -> Option<&SceneNode> {
        self.nodes
            .iter()
            .find_map(|(id, node)| (*id == target).then_some(node))
    }

    /// Look up a node mutably.
    pub fn node_mut(&mut self, target: TargetId) -> Option<&mut SceneNode> {
        self.nodes
            .iter_mut()
            .find_map(|(id, node)| (*id == target).then_some(node))
    }

    /// Take a target's mesh, leaving the slot empty.
    pub fn take_mesh(&mut self, target: TargetId) -> Option<IndexedMesh> {
        self.node_mut(target)?.mesh.take()
    }

    /// Replace a target's placement.
    pub fn set_transform(&mut self, target: TargetId, transform: TargetTransform) {
        if let Some(node) = self.node_mut(target) {
            node.transform = transform;
        }
    }
}

impl MeshHost for Scene {
    fn target_ids(&self) -> Vec<TargetId> {
        self.nodes.iter().map(|(id, _)| *id).collect()
    }

    fn target_name(&self, target: TargetId) -> Option<&str> {
        self.node(target).map(|n| n.name.as_str())
    }

    fn shared_mesh(&self, target: TargetId) -> Option<&IndexedMesh> {
        self.node(target)?.mesh.as_ref()
    }

    fn shared_mesh_mut(&mut self, target: TargetId) -> Option<&mut IndexedMesh> {
        self.node_mut(target)?.mesh.as_mut()
    }

    fn set_shared_mesh(&mut self, target: TargetId, mesh: IndexedMesh) {
        if let Some(node) = self.node_mut(target) {
            node.mesh = Some(mesh);
        }
    }

    fn transform(&self, target: TargetId) -> Option<TargetTransform> {
        self.node(target).map(|n| n.transform)
    }
}

/// A target adopted by a session, with the authored mesh it deforms from.
///
/// The original is never modified; each run regenerates the target's
/// derived mesh from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBinding {
    target: TargetId,
    original: IndexedMesh,
}

impl MeshBinding {
    /// Bind `original` to `target`.
    #[must_use]
    pub const fn new(target: TargetId, original: IndexedMesh) -> Self {
        Self { target, original }
    }

    /// The bound target.
    #[must_use]
    pub const fn target(&self) -> TargetId {
        self.target
    }

    /// The authored mesh.
    #[must_use]
    pub const fn original(&self) -> &IndexedMesh {
        &self.original
    }

    /// A fresh derived mesh for this binding.
    #[must_use]
    pub fn derive(&self, suffix: &str) -> IndexedMesh {
        self.original.derive(suffix)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_after_removal() {
        let mut scene = Scene::new();
        let a = scene.add_target("A", None, TargetTransform::identity());
        let b = scene.add_target("B", None, TargetTransform::identity());
        scene.remove_target(a);
        let c = scene.add_target("C", None, TargetTransform::identity());

        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(scene.target_ids(), vec![b, c]);
        assert_eq!(scene.target_name(c), Some("C"));
    }

    #[test]
    fn test_mesh_slot() {
        let mut scene = Scene::new();
        let t = scene.add_target("T", None, TargetTransform::identity());
        assert!(scene.shared_mesh(t).is_none());

        scene.set_shared_mesh(t, IndexedMesh::named("M"));
        assert_eq!(scene.shared_mesh(t).unwrap().name, "M");
        scene.shared_mesh_mut(t).unwrap().name = "N".into();
        assert_eq!(scene.take_mesh(t).unwrap().name, "N");
        assert!(scene.shared_mesh(t).is_none());
    }

    #[test]
    fn test_unknown_target_is_ignored() {
        let mut scene = Scene::new();
        scene.set_shared_mesh(TargetId(42), IndexedMesh::new());
        assert!(scene.target_ids().is_empty());
        assert!(scene.transform(TargetId(42)).is_none());
    }

    #[test]
    fn test_binding_derive() {
        let binding = MeshBinding::new(TargetId(0), IndexedMesh::named("Body"));
        let derived = binding.derive("_Preview");
        assert_eq!(derived.name, "Body_Preview");
        assert!(derived.is_derived());
        assert!(!binding.original().is_derived());
    }

    #[test]
    fn test_display() {
        assert_eq!(TargetId(7).to_string(), "#7");
    }
}
