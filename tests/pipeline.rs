//! End-to-end pipeline scenarios against in-memory collaborators

mod common;

use common::{
    FLAT_OBJ, FailingRegistry, ODM_OBJ, RecordingRegistry, fake_convert, odm_archive, zip_archive,
};
use photoscene::{
    Error, FnConverter, IngestionProfile, MemoryObjectStore, ObjectLocation, Pipeline,
    PipelineConfig, SCENE_ID_PREFIX, SceneDocument, StorageEvent,
};
use tempfile::TempDir;

fn pipeline_config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig::new(dir.path().join("scratch"), "twin-workspace", "workspace-bucket")
}

#[test]
fn scenario_a_odm_archive_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = MemoryObjectStore::new();
    store.insert(
        &ObjectLocation::new("processed", "all.zip"),
        odm_archive(40),
    );
    let registry = RecordingRegistry::default();
    let pipeline = Pipeline::new(
        &store,
        FnConverter(fake_convert),
        &registry,
        pipeline_config(&dir),
    );

    let report = pipeline
        .run(&StorageEvent::for_object("processed", "all.zip"))
        .unwrap();

    assert_eq!(report.profile, IngestionProfile::Odm);
    assert_eq!(report.extraction.entries, 41);
    assert_eq!(report.extraction.files_written, 1);

    // The converter was invoked against the ODM fixed path.
    let model = store
        .get_bytes(&ObjectLocation::new("workspace-bucket", "model.glb"))
        .expect("model uploaded");
    let mut expected = b"glTF".to_vec();
    expected.extend_from_slice(ODM_OBJ);
    assert_eq!(model, expected);
    assert_eq!(report.model_size, expected.len());

    // The scene document references the model's storage location.
    let scene_json = store
        .get_bytes(&ObjectLocation::new("workspace-bucket", "scene.json"))
        .expect("scene document uploaded");
    let document: SceneDocument = serde_json::from_str(std::str::from_utf8(&scene_json).unwrap())
        .unwrap();
    document.validate().unwrap();
    assert_eq!(document.nodes.len(), 2);
    assert_eq!(document.root_node_indexes, [0]);
    let json = String::from_utf8(scene_json).unwrap();
    assert!(json.contains(r#""uri":"s3://workspace-bucket/model.glb""#));

    // The scene record points at the uploaded document.
    let scenes = registry.scenes.lock().unwrap();
    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].workspace_id, "twin-workspace");
    assert_eq!(scenes[0].content_location, "s3://workspace-bucket/scene.json");
    assert!(scenes[0].scene_id.starts_with(SCENE_ID_PREFIX));
    assert_eq!(scenes[0].scene_id, report.scene_id);
}

#[test]
fn scenario_b_flat_layout_archive() {
    let dir = TempDir::new().unwrap();
    let store = MemoryObjectStore::new();
    // The archive carries both conventions; the trigger name picks flat.
    store.insert(
        &ObjectLocation::new("processed", "scene.zip"),
        zip_archive(&[
            ("scene_mesh_textured.obj", FLAT_OBJ),
            ("odm_texturing/odm_textured_model_geo.obj", ODM_OBJ),
        ]),
    );
    let registry = RecordingRegistry::default();
    let pipeline = Pipeline::new(
        &store,
        FnConverter(fake_convert),
        &registry,
        pipeline_config(&dir),
    );

    let report = pipeline
        .run(&StorageEvent::for_object("processed", "scene.zip"))
        .unwrap();

    assert_eq!(report.profile, IngestionProfile::FlatLayout);

    // Conversion consumed the flat path, not the ODM file.
    let model = store
        .get_bytes(&ObjectLocation::new("workspace-bucket", "model.glb"))
        .unwrap();
    let mut expected = b"glTF".to_vec();
    expected.extend_from_slice(FLAT_OBJ);
    assert_eq!(model, expected);
}

#[test]
fn trigger_name_comparison_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let store = MemoryObjectStore::new();
    store.insert(&ObjectLocation::new("processed", "ALL.ZIP"), odm_archive(2));
    let registry = RecordingRegistry::default();
    let pipeline = Pipeline::new(
        &store,
        FnConverter(fake_convert),
        &registry,
        pipeline_config(&dir),
    );

    let report = pipeline
        .run(&StorageEvent::for_object("processed", "ALL.ZIP"))
        .unwrap();
    assert_eq!(report.profile, IngestionProfile::Odm);
}

#[test]
fn scenario_c_missing_geometry_publishes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = MemoryObjectStore::new();
    store.insert(
        &ObjectLocation::new("processed", "all.zip"),
        zip_archive(&[
            ("images/DJI_0001.JPG", b"not geometry".as_slice()),
            ("report.pdf", b"not geometry either".as_slice()),
        ]),
    );
    let registry = RecordingRegistry::default();
    let pipeline = Pipeline::new(
        &store,
        FnConverter(fake_convert),
        &registry,
        pipeline_config(&dir),
    );

    let err = pipeline
        .run(&StorageEvent::for_object("processed", "all.zip"))
        .unwrap_err();
    assert!(matches!(err, Error::MissingGeometry(_)));

    // Only the source archive is in the store; nothing was published.
    assert_eq!(store.object_count(), 1);
    assert!(registry.scenes.lock().unwrap().is_empty());
}

#[test]
fn publish_failure_leaves_completed_steps_in_place() {
    let dir = TempDir::new().unwrap();
    let store = MemoryObjectStore::new();
    store.insert(&ObjectLocation::new("processed", "all.zip"), odm_archive(3));
    let pipeline = Pipeline::new(
        &store,
        FnConverter(fake_convert),
        FailingRegistry,
        pipeline_config(&dir),
    );

    let err = pipeline
        .run(&StorageEvent::for_object("processed", "all.zip"))
        .unwrap_err();
    assert!(matches!(err, Error::Registry(_)));

    // No rollback: both uploads completed before the registration failed.
    assert!(
        store
            .get_bytes(&ObjectLocation::new("workspace-bucket", "model.glb"))
            .is_some()
    );
    assert!(
        store
            .get_bytes(&ObjectLocation::new("workspace-bucket", "scene.json"))
            .is_some()
    );
}

#[test]
fn workspace_is_reset_between_runs() {
    let dir = TempDir::new().unwrap();
    let store = MemoryObjectStore::new();
    store.insert(&ObjectLocation::new("processed", "all.zip"), odm_archive(2));
    store.insert(
        &ObjectLocation::new("processed", "scene.zip"),
        zip_archive(&[("scene_mesh_textured.obj", FLAT_OBJ)]),
    );
    let registry = RecordingRegistry::default();
    let pipeline = Pipeline::new(
        &store,
        FnConverter(fake_convert),
        &registry,
        pipeline_config(&dir),
    );

    pipeline
        .run(&StorageEvent::for_object("processed", "all.zip"))
        .unwrap();
    let odm_geometry = dir
        .path()
        .join("scratch/odm_texturing/odm_textured_model_geo.obj");
    assert!(odm_geometry.is_file());

    pipeline
        .run(&StorageEvent::for_object("processed", "scene.zip"))
        .unwrap();

    // The first run's tree is gone; only the second run's files remain.
    assert!(!odm_geometry.exists());
    assert!(dir.path().join("scratch/scene_mesh_textured.obj").is_file());
}

#[test]
fn event_without_records_is_rejected() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        MemoryObjectStore::new(),
        FnConverter(fake_convert),
        RecordingRegistry::default(),
        pipeline_config(&dir),
    );

    let event = StorageEvent::from_json(r#"{"Records":[]}"#).unwrap();
    assert!(matches!(
        pipeline.run(&event),
        Err(Error::InvalidEvent(_))
    ));
}
