//! End-to-end tests for deformation sessions.

use approx::assert_relative_eq;
use mesh_morph::{DeformParams, InterpolationModel, ModelSource, deform_mesh};
use mesh_retarget::{DeformationSession, MeshHost, RetargetError, Scene, SessionConfig};
use mesh_transform::TargetTransform;
use mesh_types::{BlendShapeFrame, IndexedMesh, Vertex};
use nalgebra::{UnitQuaternion, Vector3};

const MODEL: &str = r#"{
    "epsilon": 0.5,
    "centers": [[0.0, 0.0, 0.0], [0.5, 0.5, 1.0]],
    "weights": [[0.01, 0.0, 0.02], [0.0, -0.03, 0.0]],
    "poly_weights": [[0.0, 0.0, 0.05], [0.01, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.02, 0.0]]
}"#;

fn model_source() -> ModelSource {
    ModelSource::Inline(MODEL.to_string())
}

fn quad(name: &str) -> IndexedMesh {
    let mut mesh = IndexedMesh::named(name);
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
    mesh.faces.push([0, 1, 2]);
    mesh.faces.push([0, 2, 3]);
    mesh.blend_shapes.push_frame(
        "Raise",
        BlendShapeFrame::from_positions(100.0, vec![Vector3::new(0.0, 0.0, 0.2); 4]),
    );
    mesh
}

fn placed(x: f64, angle: f64) -> TargetTransform {
    TargetTransform::from_trs(
        Vector3::new(x, 0.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle),
        Vector3::new(1.0, 1.0, 1.0),
    )
}

#[test]
fn run_matches_direct_deformation() {
    let mut scene = Scene::new();
    let a = scene.add_target("A", Some(quad("QuadA")), placed(0.0, 0.0));
    let b = scene.add_target("B", Some(quad("QuadB")), placed(2.0, 0.5));

    let mut session = DeformationSession::new(SessionConfig::default());
    let report = session.run(&mut scene, &model_source()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.deformed.len(), 2);

    let model = InterpolationModel::from_json(MODEL).unwrap();
    for (target, name) in [(a, "QuadA"), (b, "QuadB")] {
        let transform = scene.transform(target).unwrap();
        let expected = deform_mesh(&quad(name), &transform, &model, &DeformParams::default()).unwrap();
        let derived = scene.shared_mesh(target).unwrap();

        assert_eq!(derived.name, format!("{name}_Preview"));
        assert!(derived.is_derived());
        for (got, want) in derived.vertices.iter().zip(&expected.mesh.vertices) {
            assert_relative_eq!(got.position, want.position, epsilon = 1e-12);
        }
        let got = &derived.blend_shapes.get("Raise").unwrap().frames[0];
        let want = &expected.mesh.blend_shapes.get("Raise").unwrap().frames[0];
        assert_eq!(got.position_deltas, want.position_deltas);
    }

    let summary = report.deformed.iter().find(|s| s.target == b).unwrap();
    assert_eq!(summary.name, "B");
    assert_eq!(summary.shapes_processed, 1);
    assert_eq!(summary.frames_processed, 1);
    assert_eq!(summary.vertices_modified, 4);
}

#[test]
fn bad_target_is_skipped_and_reported() {
    let mut broken = quad("Broken");
    broken.blend_shapes.push_frame(
        "Short",
        BlendShapeFrame::from_positions(100.0, vec![Vector3::zeros(); 2]),
    );

    let mut scene = Scene::new();
    let good = scene.add_target("Good", Some(quad("Good")), placed(0.0, 0.0));
    let bad = scene.add_target("Bad", Some(broken.clone()), placed(0.0, 0.0));
    let empty = scene.add_target("Empty", None, placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    let report = session.run(&mut scene, &model_source()).unwrap();

    assert_eq!(report.deformed.len(), 1);
    assert_eq!(report.deformed[0].target, good);
    assert_eq!(report.skipped.len(), 2);

    assert!(matches!(
        report.skipped_target(empty).unwrap().reason,
        RetargetError::NoOriginalMesh { .. }
    ));
    let skip = report.skipped_target(bad).unwrap();
    assert_eq!(skip.name, "Bad");
    assert!(matches!(skip.reason, RetargetError::Deform { target, .. } if target == bad));
    assert!(skip.reason.to_string().contains("Short"));

    // The bad target keeps showing its authored mesh.
    assert_eq!(scene.shared_mesh(bad).unwrap(), &broken);
    assert!(session.bindings().iter().all(|b| b.target() != bad));
}

#[test]
fn derived_mesh_is_never_adopted_as_original() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));

    let mut first = DeformationSession::default();
    first.run(&mut scene, &model_source()).unwrap();
    let after_first = scene.shared_mesh(t).unwrap().clone();

    // A second, independent session must not treat the output as authored.
    let mut second = DeformationSession::default();
    let report = second.run(&mut scene, &model_source()).unwrap();
    assert!(report.deformed.is_empty());
    assert!(matches!(
        &report.skipped[0].reason,
        RetargetError::AlreadyDerived { mesh, .. } if mesh == "Body_Preview"
    ));
    assert_eq!(scene.shared_mesh(t).unwrap(), &after_first);
}

#[test]
fn renamed_derived_mesh_is_still_recognized() {
    let mut scene = Scene::new();
    let mut derived = quad("Body").derive("_Preview");
    derived.name = "Body".to_string();
    scene.add_target("Body", Some(derived), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    let report = session.run(&mut scene, &model_source()).unwrap();
    assert!(report.deformed.is_empty());
    assert_eq!(report.skipped.len(), 1);
}

#[test]
fn repeated_runs_do_not_compound() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    session.run(&mut scene, &model_source()).unwrap();
    let once = scene.shared_mesh(t).unwrap().clone();
    session.run(&mut scene, &model_source()).unwrap();

    assert_eq!(session.bindings().len(), 1);
    assert_eq!(scene.shared_mesh(t).unwrap(), &once);
}

#[test]
fn failed_load_leaves_scene_untouched() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    let bad = ModelSource::Inline(r#"{"epsilon": 1.0, "centers": [[0,0,0]], "weights": [],
        "poly_weights": [[0,0,0],[0,0,0],[0,0,0],[0,0,0]]}"#.to_string());
    let err = session.run(&mut scene, &bad).unwrap_err();

    assert!(matches!(err, RetargetError::ModelLoad(_)));
    assert!(session.bindings().is_empty());
    assert_eq!(scene.shared_mesh(t).unwrap(), &quad("Body"));
}

#[test]
fn failed_reload_keeps_previous_output() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    session.run(&mut scene, &model_source()).unwrap();
    let shown = scene.shared_mesh(t).unwrap().clone();

    let missing = ModelSource::Path("/nonexistent/rbf_data.json".into());
    assert!(session.run(&mut scene, &missing).is_err());
    assert_eq!(scene.shared_mesh(t).unwrap(), &shown);
}

#[test]
fn current_rotation_is_used() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    session.run(&mut scene, &model_source()).unwrap();
    let upright = scene.shared_mesh(t).unwrap().positions();

    scene.set_transform(t, placed(0.0, 1.0));
    session.deform_all(&mut scene).unwrap();
    let turned = scene.shared_mesh(t).unwrap().positions();

    let model = InterpolationModel::from_json(MODEL).unwrap();
    let expected = deform_mesh(&quad("Body"), &placed(0.0, 1.0), &model, &DeformParams::default())
        .unwrap()
        .positions();
    assert_ne!(upright, turned);
    for (got, want) in turned.iter().zip(&expected) {
        assert_relative_eq!(*got, *want, epsilon = 1e-12);
    }
}

#[test]
fn replaced_derived_mesh_is_recreated() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    session.run(&mut scene, &model_source()).unwrap();
    scene.take_mesh(t);

    let report = session.run(&mut scene, &model_source()).unwrap();
    assert_eq!(report.deformed.len(), 1);
    assert_eq!(scene.shared_mesh(t).unwrap().name, "Body_Preview");
}

#[test]
fn reassigned_authored_mesh_becomes_the_original() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("OldBody")), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    session.run(&mut scene, &model_source()).unwrap();

    let mut new_body = quad("NewBody");
    new_body.vertices.push(Vertex::from_coords(0.5, 0.5, 0.5));
    new_body.blend_shapes = Default::default();
    new_body.blend_shapes.push_frame(
        "Raise",
        BlendShapeFrame::from_positions(100.0, vec![Vector3::new(0.0, 0.0, 0.2); 5]),
    );
    scene.set_shared_mesh(t, new_body.clone());

    let report = session.run(&mut scene, &model_source()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.deformed[0].target, t);
    assert_eq!(session.bindings()[0].original(), &new_body);

    let shown = scene.shared_mesh(t).unwrap();
    assert_eq!(shown.name, "NewBody_Preview");
    assert_eq!(shown.vertices.len(), 5);
}

#[test]
fn removed_target_is_dropped() {
    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));

    let mut session = DeformationSession::default();
    session.run(&mut scene, &model_source()).unwrap();
    scene.remove_target(t);

    let report = session.deform_all(&mut scene).unwrap();
    assert!(report.deformed.is_empty());
    assert!(matches!(
        report.skipped[0].reason,
        RetargetError::TargetMissing { target } if target == t
    ));

    session.rescan(&mut scene);
    assert!(session.bindings().is_empty());
}

#[test]
fn model_loaded_from_file() {
    let path = std::env::temp_dir().join(format!("mesh_retarget_model_{}.json", std::process::id()));
    std::fs::write(&path, MODEL).unwrap();

    let mut scene = Scene::new();
    let t = scene.add_target("Body", Some(quad("Body")), placed(0.0, 0.0));
    let config = SessionConfig::default().with_derived_suffix("_Fitted");
    let mut session = DeformationSession::new(config);
    let report = session.run(&mut scene, &ModelSource::Path(path.clone())).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(report.deformed.len(), 1);
    assert_eq!(scene.shared_mesh(t).unwrap().name, "Body_Fitted");
    assert_eq!(session.model().unwrap().center_count(), 2);
}

#[test]
fn empty_scene_runs_clean() {
    let mut scene = Scene::new();
    let mut session = DeformationSession::default();
    let report = session.run(&mut scene, &model_source()).unwrap();
    assert!(report.deformed.is_empty());
    assert!(report.is_clean());
    assert!(session.model().is_some());
}
