//! Shared helpers for integration tests

#![allow(dead_code)]

use photoscene::{
    ConvertOptions, Error, Result, SceneRecord, SceneRegistry,
};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Build an in-memory ZIP archive from (path, contents) pairs
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (path, contents) in entries {
        zip.start_file(*path, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// An archive in the shape of real ODM output: the textured model plus a
/// pile of irrelevant source images
pub fn odm_archive(image_count: usize) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for i in 0..image_count {
        zip.start_file(format!("images/DJI_{i:04}.JPG"), options)
            .unwrap();
        zip.write_all(b"\xff\xd8\xff\xe0 not really a jpeg").unwrap();
    }
    zip.start_file("odm_texturing/odm_textured_model_geo.obj", options)
        .unwrap();
    zip.write_all(ODM_OBJ).unwrap();

    zip.finish().unwrap().into_inner()
}

/// Geometry placed at the ODM fixed path in fixtures
pub const ODM_OBJ: &[u8] = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

/// Geometry placed at the flat-layout fixed path in fixtures
pub const FLAT_OBJ: &[u8] = b"v 0 0 1\nv 1 0 1\nv 0 1 1\nf 1 2 3\n";

/// Converter fake honoring the adapter contract: reads the input file and
/// wraps it in a recognizable buffer, surfacing a missing input as a
/// missing-geometry error
pub fn fake_convert(path: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
    assert!(options.binary, "pipeline always requests binary output");
    let source = std::fs::read(path).map_err(|_| Error::missing_geometry(path))?;
    let mut glb = b"glTF".to_vec();
    glb.extend_from_slice(&source);
    Ok(glb)
}

/// Registry fake recording every created scene
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    pub scenes: Mutex<Vec<SceneRecord>>,
}

impl SceneRegistry for RecordingRegistry {
    fn create_scene(&self, record: &SceneRecord) -> Result<()> {
        self.scenes.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Registry fake rejecting every created scene
#[derive(Debug, Default)]
pub struct FailingRegistry;

impl SceneRegistry for FailingRegistry {
    fn create_scene(&self, record: &SceneRecord) -> Result<()> {
        Err(Error::registry(format!(
            "create rejected for '{}'",
            record.scene_id
        )))
    }
}
