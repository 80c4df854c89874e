//! Integration tests for streaming extraction into a workspace

mod common;

use common::{ODM_OBJ, odm_archive, zip_archive};
use photoscene::{IngestionProfile, Workspace, extract_archive, is_geometry_candidate};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn file_count(root: &Path) -> usize {
    let mut count = 0;
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn odm_archive_materializes_exactly_the_geometry_file() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path().join("scratch"));
    workspace.reset().unwrap();
    workspace.prepare(IngestionProfile::Odm).unwrap();

    let archive = odm_archive(40);
    let summary = extract_archive(Cursor::new(archive), &workspace, is_geometry_candidate);

    assert_eq!(summary.entries, 41);
    assert_eq!(summary.files_written, 1);
    assert_eq!(summary.entry_errors, 0);
    assert_eq!(summary.bytes_written, ODM_OBJ.len() as u64);

    let geometry = workspace
        .root()
        .join("odm_texturing/odm_textured_model_geo.obj");
    assert_eq!(std::fs::read(geometry).unwrap(), ODM_OBJ);

    // The 40 images were drained but never written.
    assert_eq!(file_count(workspace.root()), 1);
}

#[test]
fn selection_is_profile_agnostic() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path().join("scratch"));
    workspace.prepare(IngestionProfile::FlatLayout).unwrap();

    let archive = zip_archive(&[
        ("scene_mesh_textured.obj", b"flat".as_slice()),
        ("scene_mesh_textured.mtl", b"mtl".as_slice()),
        ("odm_texturing/odm_textured_model_geo.obj", b"odm".as_slice()),
        ("report.pdf", b"pdf".as_slice()),
    ]);
    let summary = extract_archive(Cursor::new(archive), &workspace, is_geometry_candidate);

    // Both markers match regardless of the active profile; conversion later
    // picks the profile's fixed path.
    assert_eq!(summary.files_written, 3);
    assert!(workspace.root().join("scene_mesh_textured.obj").is_file());
    assert!(workspace.root().join("scene_mesh_textured.mtl").is_file());
    assert!(
        workspace
            .root()
            .join("odm_texturing/odm_textured_model_geo.obj")
            .is_file()
    );
    assert!(!workspace.root().join("report.pdf").exists());
}

#[test]
fn unselected_members_are_fully_drained() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path().join("scratch"));
    workspace.prepare(IngestionProfile::FlatLayout).unwrap();

    // Nothing matches; traversal must still see every member, which is only
    // possible if each one's content was drained before the next.
    let filler = vec![0x5au8; 128 * 1024];
    let archive = zip_archive(&[
        ("images/a.jpg", filler.as_slice()),
        ("images/b.jpg", filler.as_slice()),
        ("images/c.jpg", filler.as_slice()),
    ]);
    let summary = extract_archive(Cursor::new(archive), &workspace, is_geometry_candidate);

    assert_eq!(summary.entries, 3);
    assert_eq!(summary.files_written, 0);
    assert_eq!(summary.entry_errors, 0);
}

#[test]
fn escaping_entry_paths_are_skipped_not_written() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path().join("scratch"));
    workspace.prepare(IngestionProfile::FlatLayout).unwrap();

    // Hand-built member whose selected path climbs out of the workspace.
    let name = b"../odm_textured_model_geo.obj";
    let payload = b"evil";
    let crc = {
        let mut crc = flate2::Crc::new();
        crc.update(payload);
        crc.sum()
    };
    let mut archive = Vec::new();
    archive.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
    archive.extend_from_slice(&20u16.to_le_bytes());
    archive.extend_from_slice(&0u16.to_le_bytes());
    archive.extend_from_slice(&0u16.to_le_bytes()); // stored
    archive.extend_from_slice(&[0u8; 4]); // mod time/date
    archive.extend_from_slice(&crc.to_le_bytes());
    archive.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    archive.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    archive.extend_from_slice(&(name.len() as u16).to_le_bytes());
    archive.extend_from_slice(&0u16.to_le_bytes());
    archive.extend_from_slice(name);
    archive.extend_from_slice(payload);
    archive.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    archive.extend_from_slice(&[0u8; 18]);

    let summary = extract_archive(Cursor::new(archive), &workspace, is_geometry_candidate);

    assert_eq!(summary.entries, 1);
    assert_eq!(summary.files_written, 0);
    assert_eq!(summary.entry_errors, 1);
    assert!(!dir.path().join("odm_textured_model_geo.obj").exists());
}

#[test]
fn corrupt_member_does_not_abort_earlier_recovery() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path().join("scratch"));
    workspace.prepare(IngestionProfile::Odm).unwrap();

    // Valid geometry first, garbage after; the geometry must survive.
    let mut archive = zip_archive(&[(
        "odm_texturing/odm_textured_model_geo.obj",
        ODM_OBJ,
    )]);
    let central_dir = archive
        .windows(4)
        .rposition(|w| w == [0x50, 0x4b, 0x01, 0x02])
        .unwrap();
    archive.truncate(central_dir);
    archive.extend_from_slice(b"trailing garbage that is no zip record");

    let summary = extract_archive(Cursor::new(archive), &workspace, is_geometry_candidate);

    assert_eq!(summary.files_written, 1);
    assert_eq!(summary.entry_errors, 1);
    let geometry = workspace
        .root()
        .join("odm_texturing/odm_textured_model_geo.obj");
    assert_eq!(std::fs::read(geometry).unwrap(), ODM_OBJ);
}
