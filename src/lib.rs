//! # photoscene
//!
//! Photogrammetry archive ingestion and 3D scene composition.
//!
//! This crate turns a just-uploaded archive of photogrammetry output (a
//! textured mesh plus supporting assets) into a web-deliverable scene: it
//! streams the ZIP archive member by member, materializes only the
//! textured-mesh files into a scratch workspace, drives an external OBJ→GLB
//! converter, and publishes the converted model together with a declarative
//! scene-graph JSON document referencing it.
//!
//! ## Features
//!
//! - Pure Rust streaming ZIP traversal over any [`std::io::Read`] source,
//!   with no seeking and no whole-archive buffering
//! - Two ingestion profiles (ODM-style and flat layout), fixed once per run
//!   from the triggering object's name
//! - Idempotent scratch-workspace lifecycle with zip-slip protection
//! - A pure, deterministic scene document builder
//! - Trait seams for the object store, the model converter, and the scene
//!   registry, with an in-memory store for tests and local runs
//!
//! ## Example
//!
//! ```no_run
//! use photoscene::{
//!     CommandConverter, MemoryObjectStore, ObjectLocation, Pipeline, PipelineConfig,
//!     Result, SceneRecord, SceneRegistry, StorageEvent,
//! };
//!
//! struct PrintingRegistry;
//!
//! impl SceneRegistry for PrintingRegistry {
//!     fn create_scene(&self, record: &SceneRecord) -> Result<()> {
//!         println!("created scene {} at {}", record.scene_id, record.content_location);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let store = MemoryObjectStore::new();
//!     store.insert(
//!         &ObjectLocation::new("processed-bucket", "all.zip"),
//!         std::fs::read("all.zip")?,
//!     );
//!
//!     let pipeline = Pipeline::new(
//!         store,
//!         CommandConverter::new("obj2gltf"),
//!         PrintingRegistry,
//!         PipelineConfig::new("/tmp/photoscene", "my-workspace", "workspace-bucket"),
//!     );
//!
//!     let report = pipeline.run(&StorageEvent::for_object("processed-bucket", "all.zip"))?;
//!     println!("converted {} bytes under the {} profile", report.model_size, report.profile);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod convert;
pub mod error;
pub mod event;
pub mod extract;
pub mod pipeline;
pub mod profile;
pub mod registry;
pub mod scene;
pub mod store;
pub mod workspace;

pub use archive::{ArchiveReader, Entry, EntryKind};
pub use convert::{CommandConverter, ConvertOptions, FnConverter, ModelConverter};
pub use error::{Error, Result};
pub use event::{ObjectRef, StorageEvent, decode_object_key};
pub use extract::{ExtractSummary, extract_archive};
pub use pipeline::{
    MODEL_OBJECT_KEY, Pipeline, PipelineConfig, PipelineReport, SCENE_OBJECT_KEY,
};
pub use profile::{IngestionProfile, is_geometry_candidate};
pub use registry::{SCENE_ID_PREFIX, SceneRecord, SceneRegistry, generate_scene_id};
pub use scene::{Component, LightSettings, SceneDocument, SceneNode, Transform};
pub use store::{MemoryObjectStore, ObjectLocation, ObjectStore};
pub use workspace::Workspace;
