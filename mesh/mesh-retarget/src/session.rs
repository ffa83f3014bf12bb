//! Deformation sessions.
//!
//! A session owns the loaded [`InterpolationModel`] and the list of adopted
//! targets. A run loads the model, rescans the host, and regenerates every
//! target's derived mesh:
//!
//! 1. Load the model. On failure nothing in the host is touched.
//! 2. Rescan: keep existing bindings, adopt new targets, skip targets that
//!    have no mesh or already show a derived mesh.
//! 3. Deform each binding. A target that fails is skipped and reported;
//!    the others still deform.

use crate::{MeshBinding, MeshHost, RetargetError, RetargetResult, SessionConfig, TargetId};
use hashbrown::HashMap;
use mesh_morph::{InterpolationModel, ModelSource, deform_mesh, validate_binding};
use tracing::{debug, info, warn};

/// Outcome for one deformed target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSummary {
    /// The target.
    pub target: TargetId,
    /// Target display name.
    pub name: String,
    /// Base vertices that moved.
    pub vertices_modified: usize,
    /// Largest base vertex displacement.
    pub max_displacement: f64,
    /// Blend shapes rebuilt.
    pub shapes_processed: usize,
    /// Blend-shape frames rebuilt.
    pub frames_processed: usize,
}

/// A target left untouched, and why.
#[derive(Debug)]
pub struct SkippedTarget {
    /// The target.
    pub target: TargetId,
    /// Target display name, if the host still knows it.
    pub name: String,
    /// Why it was skipped.
    pub reason: RetargetError,
}

/// Result of a session run.
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Targets whose derived mesh was regenerated.
    pub deformed: Vec<TargetSummary>,
    /// Targets that were left alone.
    pub skipped: Vec<SkippedTarget>,
}

impl SessionReport {
    /// Whether every target deformed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Look up the skip entry for a target.
    #[must_use]
    pub fn skipped_target(&self, target: TargetId) -> Option<&SkippedTarget> {
        self.skipped.iter().find(|s| s.target == target)
    }
}

/// Orchestrates deformation of every target in a host.
///
/// # Example
///
/// ```
/// use mesh_morph::ModelSource;
/// use mesh_retarget::{DeformationSession, MeshHost, Scene, SessionConfig};
/// use mesh_transform::TargetTransform;
/// use mesh_types::{IndexedMesh, Vertex};
///
/// let mut mesh = IndexedMesh::named("Body");
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
///
/// let mut scene = Scene::new();
/// let body = scene.add_target("Body", Some(mesh), TargetTransform::identity());
///
/// let json = r#"{"epsilon": 1.0, "centers": [[0,0,0]], "weights": [[0,-1,0]],
///     "poly_weights": [[0,0,0],[0,0,0],[0,0,0],[0,0,0]]}"#;
///
/// let mut session = DeformationSession::new(SessionConfig::default());
/// let report = session.run(&mut scene, &ModelSource::Inline(json.into())).unwrap();
///
/// assert_eq!(report.deformed.len(), 1);
/// let derived = scene.shared_mesh(body).unwrap();
/// assert_eq!(derived.name, "Body_Preview");
/// assert!((derived.vertices[0].position.z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Default)]
pub struct DeformationSession {
    config: SessionConfig,
    model: Option<InterpolationModel>,
    bindings: Vec<MeshBinding>,
}

impl DeformationSession {
    /// Create a session with no model and no bindings.
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            config,
            model: None,
            bindings: Vec::new(),
        }
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The loaded model, if any.
    #[must_use]
    pub const fn model(&self) -> Option<&InterpolationModel> {
        self.model.as_ref()
    }

    /// Current bindings, in host traversal order.
    #[must_use]
    pub fn bindings(&self) -> &[MeshBinding] {
        &self.bindings
    }

    /// Load a model, replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns [`RetargetError::ModelLoad`]; the previous model stays loaded.
    pub fn load_model(&mut self, source: &ModelSource) -> RetargetResult<&InterpolationModel> {
        let model = source.load()?;
        info!(
            centers = model.center_count(),
            epsilon = model.epsilon(),
            "Interpolation model loaded"
        );
        Ok(self.model.insert(model))
    }

    /// Install an already-built model.
    pub fn set_model(&mut self, model: InterpolationModel) {
        self.model = Some(model);
    }

    /// Release the loaded model.
    pub fn unload_model(&mut self) -> Option<InterpolationModel> {
        self.model.take()
    }

    /// Reconcile bindings with the host's current targets.
    ///
    /// Existing bindings are kept (matched by target id) and get a fresh
    /// derived mesh if their target no longer shows one. A target that shows
    /// an authored mesh is adopted: the mesh becomes the original and a
    /// derived copy is assigned. This also applies to a bound target whose
    /// mesh was replaced by the user. A mesh that fails validation is left on
    /// its target and reported. Bindings whose target vanished are dropped.
    ///
    /// Returns the targets that could not be adopted.
    pub fn rescan<H: MeshHost>(&mut self, host: &mut H) -> Vec<SkippedTarget> {
        let mut existing: HashMap<TargetId, MeshBinding> =
            self.bindings.drain(..).map(|b| (b.target(), b)).collect();
        let suffix = self.config.derived_suffix.as_str();
        let mut skipped = Vec::new();

        for target in host.target_ids() {
            let kept = existing.remove(&target);
            let name = host.target_name(target).unwrap_or_default().to_string();

            match (host.shared_mesh(target), kept) {
                (None, Some(binding)) => {
                    debug!(id = %target, "Recreating derived mesh");
                    host.set_shared_mesh(target, binding.derive(suffix));
                    self.bindings.push(binding);
                }
                (None, None) => {
                    skipped.push(SkippedTarget {
                        target,
                        name,
                        reason: RetargetError::NoOriginalMesh { target },
                    });
                }
                (Some(current), Some(binding)) if current.is_derived() => {
                    self.bindings.push(binding);
                }
                (Some(current), None) if current.is_derived() => {
                    warn!(
                        id = %target,
                        target_name = %name,
                        mesh = %current.name,
                        "Skipping target: mesh is already a deformation output"
                    );
                    let mesh = current.name.clone();
                    skipped.push(SkippedTarget {
                        target,
                        name,
                        reason: RetargetError::AlreadyDerived { target, mesh },
                    });
                }
                (Some(current), kept) => {
                    if let Some(previous) = kept {
                        info!(
                            id = %target,
                            previous = %previous.original().name,
                            mesh = %current.name,
                            "Re-adopting replaced mesh"
                        );
                    }
                    if let Err(source) = validate_binding(current) {
                        warn!(id = %target, target_name = %name, error = %source, "Skipping target");
                        skipped.push(SkippedTarget {
                            target,
                            name,
                            reason: RetargetError::Deform { target, source },
                        });
                        continue;
                    }
                    let binding = MeshBinding::new(target, current.clone());
                    host.set_shared_mesh(target, binding.derive(suffix));
                    self.bindings.push(binding);
                }
            }
        }

        for target in existing.keys() {
            debug!(id = %target, "Dropping binding for removed target");
        }

        skipped
    }

    /// Load `source`, rescan the host, and deform every binding.
    ///
    /// # Errors
    ///
    /// Returns [`RetargetError::ModelLoad`] before touching the host if the
    /// model cannot be loaded. Per-target problems are reported in
    /// [`SessionReport::skipped`].
    pub fn run<H: MeshHost>(
        &mut self,
        host: &mut H,
        source: &ModelSource,
    ) -> RetargetResult<SessionReport> {
        self.load_model(source)?;
        let mut skipped = self.rescan(host);
        let mut report = self.deform_all(host)?;
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        Ok(report)
    }

    /// Deform every binding with the loaded model.
    ///
    /// # Errors
    ///
    /// Returns [`RetargetError::NoModel`] if no model is loaded.
    pub fn deform_all<H: MeshHost>(&self, host: &mut H) -> RetargetResult<SessionReport> {
        let model = self.model.as_ref().ok_or(RetargetError::NoModel)?;
        let suffix = self.config.derived_suffix.as_str();
        let mut report = SessionReport::default();

        info!(targets = self.bindings.len(), "Deformation run started");

        for binding in &self.bindings {
            let target = binding.target();
            let name = host.target_name(target).unwrap_or_default().to_string();

            let Some(transform) = host.transform(target) else {
                warn!(id = %target, "Skipping target: no longer present");
                report.skipped.push(SkippedTarget {
                    target,
                    name,
                    reason: RetargetError::TargetMissing { target },
                });
                continue;
            };

            let output = match deform_mesh(binding.original(), &transform, model, &self.config.params)
            {
                Ok(output) => output,
                Err(source) => {
                    warn!(id = %target, target_name = %name, error = %source, "Skipping target");
                    report.skipped.push(SkippedTarget {
                        target,
                        name,
                        reason: RetargetError::Deform { target, source },
                    });
                    continue;
                }
            };

            let summary = TargetSummary {
                target,
                name,
                vertices_modified: output.vertices_modified,
                max_displacement: output.max_displacement,
                shapes_processed: output.shapes_processed,
                frames_processed: output.frames_processed,
            };

            match host.shared_mesh_mut(target).filter(|m| m.is_derived()) {
                Some(derived) => output.apply_to(derived),
                None => {
                    let mut derived = binding.derive(suffix);
                    output.apply_to(&mut derived);
                    host.set_shared_mesh(target, derived);
                }
            }

            report.deformed.push(summary);
        }

        info!(
            deformed = report.deformed.len(),
            skipped = report.skipped.len(),
            "Deformation run finished"
        );

        Ok(report)
    }
}
