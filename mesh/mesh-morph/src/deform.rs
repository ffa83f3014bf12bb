//! Mesh and blend-shape deformation.
//!
//! Every vertex goes through the same steps:
//!
//! 1. `world = local_to_world * local`
//! 2. `d_world = evaluate(world)`
//! 3. `d_local = inverse(rotation) * d_world` (no translation or scale)
//! 4. `local' = local + d_local`
//!
//! Blend-shape frames are deformed as absolute shapes (`base + delta`) and
//! their deltas redefined against the deformed base, so a shape applied on
//! top of the deformed mesh lands where the deformed shape would.

use crate::{DeformError, DeformOutput, DeformParams, DeformResult, InterpolationModel, RbfEvaluator};
use mesh_transform::TargetTransform;
use mesh_types::{BlendShape, BlendShapeFrame, BlendShapeLibrary, IndexedMesh};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

/// Deformed base vertices of one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDeformation {
    /// New local vertex positions, index-aligned with the input.
    pub positions: Vec<Point3<f64>>,
    /// Local-space displacement applied to each vertex.
    pub displacements: Vec<Vector3<f64>>,
}

/// Local-space displacement of a single local-space vertex.
#[inline]
#[must_use]
pub fn displacement_at(
    local: &Point3<f64>,
    transform: &TargetTransform,
    evaluator: &RbfEvaluator<'_>,
) -> Vector3<f64> {
    let world = transform.to_world(local);
    transform.displacement_to_local(&evaluator.evaluate(&world))
}

/// Local-space displacements for a vertex set.
///
/// Work is split into chunks of [`DeformParams::effective_chunk_size`]
/// vertices. Each chunk writes a disjoint slice of the output, and the
/// serial and parallel paths run the same per-vertex code, so the result
/// does not depend on scheduling.
#[must_use]
pub fn local_displacements(
    positions: &[Point3<f64>],
    transform: &TargetTransform,
    model: &InterpolationModel,
    params: &DeformParams,
) -> Vec<Vector3<f64>> {
    let evaluator = RbfEvaluator::new(model);
    let chunk = params.effective_chunk_size();
    let mut out = vec![Vector3::zeros(); positions.len()];

    let fill = |(dst, src): (&mut [Vector3<f64>], &[Point3<f64>])| {
        for (d, p) in dst.iter_mut().zip(src) {
            *d = displacement_at(p, transform, &evaluator);
        }
    };

    if params.use_parallel(positions.len()) {
        out.par_chunks_mut(chunk)
            .zip(positions.par_chunks(chunk))
            .for_each(&fill);
    } else {
        out.chunks_mut(chunk).zip(positions.chunks(chunk)).for_each(&fill);
    }

    out
}

/// Deform a vertex set, returning new local positions.
#[must_use]
pub fn deform_positions(
    positions: &[Point3<f64>],
    transform: &TargetTransform,
    model: &InterpolationModel,
    params: &DeformParams,
) -> Vec<Point3<f64>> {
    let displacements = local_displacements(positions, transform, model, params);
    positions
        .iter()
        .zip(&displacements)
        .map(|(p, d)| p + d)
        .collect()
}

/// Deform the base vertices of `original`.
///
/// `original` is only read.
///
/// # Example
///
/// ```
/// use mesh_morph::{deform_base, DeformParams, InterpolationModel};
/// use mesh_transform::TargetTransform;
/// use mesh_types::{IndexedMesh, Vertex};
/// use nalgebra::{Point3, Vector3};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
///
/// let model = InterpolationModel::new(
///     1.0,
///     vec![Point3::origin()],
///     vec![Vector3::new(0.0, 0.0, 1.0)],
///     [Vector3::zeros(); 4],
/// ).unwrap();
///
/// let base = deform_base(&mesh, &TargetTransform::identity(), &model, &DeformParams::default());
/// assert!((base.positions[0].z - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn deform_base(
    original: &IndexedMesh,
    transform: &TargetTransform,
    model: &InterpolationModel,
    params: &DeformParams,
) -> BaseDeformation {
    let local = original.positions();
    let displacements = local_displacements(&local, transform, model, params);
    let positions = local
        .iter()
        .zip(&displacements)
        .map(|(p, d)| p + d)
        .collect();
    BaseDeformation {
        positions,
        displacements,
    }
}

/// Rebuild the blend-shape library of `original` against a deformed base.
///
/// Shape names, frame counts, and frame weights are kept. Position deltas
/// become `deform(original + delta) - deformed_base`; normal and tangent
/// deltas are copied unchanged. Frames are processed in authored order.
///
/// # Errors
///
/// Returns an error if `deformed_base` or a frame's delta arrays do not
/// match the vertex count, or if a shape has no frames. Nothing is returned
/// on failure.
pub fn deform_blend_shapes(
    original: &IndexedMesh,
    deformed_base: &[Point3<f64>],
    transform: &TargetTransform,
    model: &InterpolationModel,
    params: &DeformParams,
) -> DeformResult<BlendShapeLibrary> {
    if deformed_base.len() != original.vertices.len() {
        return Err(DeformError::BaseLengthMismatch {
            expected: original.vertices.len(),
            found: deformed_base.len(),
        });
    }
    validate_blend_shapes(original)?;

    let mut library = BlendShapeLibrary::new();
    let mut shaped = Vec::with_capacity(original.vertices.len());

    for shape in &original.blend_shapes {
        let mut rebuilt = BlendShape::new(shape.name.clone());

        for (frame_index, frame) in shape.frames.iter().enumerate() {
            shaped.clear();
            shaped.extend(
                original
                    .vertices
                    .iter()
                    .zip(&frame.position_deltas)
                    .map(|(v, delta)| v.position + delta),
            );

            let deformed = deform_positions(&shaped, transform, model, params);
            let position_deltas = deformed
                .iter()
                .zip(deformed_base)
                .map(|(shape_pos, base_pos)| shape_pos - base_pos)
                .collect();

            debug!(
                shape = %shape.name,
                frame = frame_index,
                weight = frame.weight,
                "Rebuilt blend-shape frame"
            );

            rebuilt.frames.push(BlendShapeFrame::new(
                frame.weight,
                position_deltas,
                frame.normal_deltas.clone(),
                frame.tangent_deltas.clone(),
            ));
        }

        library.push_shape(rebuilt);
    }

    Ok(library)
}

/// Check that `mesh` can be deformed as a whole.
///
/// # Errors
///
/// - [`DeformError::InvalidFaceIndex`] for a face referencing a missing vertex
/// - [`DeformError::EmptyShape`] for a blend shape with no frames
/// - [`DeformError::DeltaLengthMismatch`] / [`DeformError::FrameAttributeMismatch`]
///   for frames that do not address every vertex
pub fn validate_binding(mesh: &IndexedMesh) -> DeformResult<()> {
    let vertex_count = mesh.vertices.len();
    for (face, indices) in mesh.faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(DeformError::InvalidFaceIndex {
                face,
                index,
                vertex_count,
            });
        }
    }
    validate_blend_shapes(mesh)
}

fn validate_blend_shapes(mesh: &IndexedMesh) -> DeformResult<()> {
    let expected = mesh.vertices.len();
    for shape in &mesh.blend_shapes {
        if shape.frames.is_empty() {
            return Err(DeformError::EmptyShape {
                shape: shape.name.clone(),
            });
        }
        for (frame, data) in shape.frames.iter().enumerate() {
            if data.position_deltas.len() != expected {
                return Err(DeformError::DeltaLengthMismatch {
                    shape: shape.name.clone(),
                    frame,
                    expected,
                    found: data.position_deltas.len(),
                });
            }
            if !data.is_consistent_with(expected) {
                return Err(DeformError::FrameAttributeMismatch {
                    shape: shape.name.clone(),
                    frame,
                });
            }
        }
    }
    Ok(())
}

/// Deform a mesh and its blend shapes.
///
/// The returned mesh carries the name and provenance of `original`; use
/// [`DeformOutput::apply_to`] to publish it into a derived mesh. If the mesh
/// has no vertices or the model is inert, the input comes back unchanged.
///
/// # Errors
///
/// Any error from [`validate_binding`]. Validation runs before any
/// evaluation, so a bad binding costs nothing.
///
/// # Example
///
/// ```
/// use mesh_morph::{deform_mesh, DeformParams, InterpolationModel};
/// use mesh_transform::TargetTransform;
/// use mesh_types::{IndexedMesh, Vertex};
/// use nalgebra::{Point3, Vector3};
///
/// let mut mesh = IndexedMesh::named("Body");
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// let bias = Vector3::new(0.0, 0.5, 0.0);
/// let model = InterpolationModel::new(1.0, vec![], vec![], [bias, Vector3::zeros(), Vector3::zeros(), Vector3::zeros()]).unwrap();
///
/// let output = deform_mesh(&mesh, &TargetTransform::identity(), &model, &DeformParams::default()).unwrap();
/// assert_eq!(output.vertices_modified, 3);
/// assert!((output.mesh.vertices[1].position.y - 0.5).abs() < 1e-12);
/// ```
pub fn deform_mesh(
    original: &IndexedMesh,
    transform: &TargetTransform,
    model: &InterpolationModel,
    params: &DeformParams,
) -> DeformResult<DeformOutput> {
    validate_binding(original)?;

    if original.vertices.is_empty() || model.is_inert() {
        debug!(
            mesh = %original.name,
            vertices = original.vertices.len(),
            "Nothing to deform"
        );
        return Ok(DeformOutput::new(original.clone()));
    }

    info!(
        mesh = %original.name,
        vertices = original.vertices.len(),
        centers = model.center_count(),
        shapes = original.blend_shapes.len(),
        frames = original.blend_shapes.frame_count(),
        "Deforming mesh"
    );

    let base = deform_base(original, transform, model, params);
    let blend_shapes = deform_blend_shapes(original, &base.positions, transform, model, params)?;

    let shapes_processed = blend_shapes.len();
    let frames_processed = blend_shapes.frame_count();

    let mut mesh = IndexedMesh {
        name: original.name.clone(),
        vertices: original.vertices.clone(),
        faces: original.faces.clone(),
        blend_shapes,
        provenance: original.provenance.clone(),
    };
    mesh.set_positions(&base.positions);
    if params.recompute_normals {
        mesh.recompute_normals();
    }

    let mut output = DeformOutput::new(mesh).with_displacements(&base.displacements);
    output.shapes_processed = shapes_processed;
    output.frames_processed = frames_processed;

    info!(
        mesh = %output.mesh.name,
        modified = output.vertices_modified,
        max_displacement = output.max_displacement,
        "Mesh deformed"
    );

    Ok(output)
}
