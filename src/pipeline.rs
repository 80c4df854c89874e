//! End-to-end pipeline orchestration
//!
//! One [`Pipeline::run`] call handles one storage-event notification:
//! decode the trigger, fix the ingestion profile, reset and prepare the
//! workspace, stream-extract the archive, convert the geometry, and publish
//! the model, the scene document, and the scene record.
//!
//! The run is a single sequential flow. Workspace and conversion failures
//! are fatal; extraction is best-effort; publish steps are logged
//! individually and never rolled back. A model without a scene document is
//! an accepted failure mode left for reprocessing.

use crate::convert::{ConvertOptions, ModelConverter};
use crate::error::Result;
use crate::event::StorageEvent;
use crate::extract::{ExtractSummary, extract_archive};
use crate::profile::{IngestionProfile, is_geometry_candidate};
use crate::registry::{SceneRecord, SceneRegistry, generate_scene_id};
use crate::scene::SceneDocument;
use crate::store::{ObjectLocation, ObjectStore};
use crate::workspace::Workspace;
use std::path::PathBuf;
use tracing::{error, info};

/// Destination key of the converted model
pub const MODEL_OBJECT_KEY: &str = "model.glb";

/// Destination key of the scene document
pub const SCENE_OBJECT_KEY: &str = "scene.json";

/// Static configuration of a pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scratch directory root, exclusively owned by one run at a time
    pub workspace_root: PathBuf,
    /// Twin workspace identifier used when registering the scene
    pub workspace_id: String,
    /// Bucket receiving the converted model and the scene document
    pub destination_bucket: String,
    /// URI scheme for storage locations, `s3` by default
    pub scheme: String,
}

impl PipelineConfig {
    /// Create a configuration with the default storage scheme
    pub fn new(
        workspace_root: impl Into<PathBuf>,
        workspace_id: impl Into<String>,
        destination_bucket: impl Into<String>,
    ) -> Self {
        PipelineConfig {
            workspace_root: workspace_root.into(),
            workspace_id: workspace_id.into(),
            destination_bucket: destination_bucket.into(),
            scheme: crate::store::DEFAULT_SCHEME.to_string(),
        }
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The profile the run operated under
    pub profile: IngestionProfile,
    /// Extraction counters
    pub extraction: ExtractSummary,
    /// Size of the converted model in bytes
    pub model_size: usize,
    /// The generated scene identifier
    pub scene_id: String,
    /// Where the scene document was stored
    pub scene_location: ObjectLocation,
}

/// The asset ingestion and scene composition pipeline
pub struct Pipeline<S, C, G> {
    store: S,
    converter: C,
    registry: G,
    config: PipelineConfig,
}

impl<S, C, G> Pipeline<S, C, G>
where
    S: ObjectStore,
    C: ModelConverter,
    G: SceneRegistry,
{
    /// Assemble a pipeline from its collaborators and configuration
    pub fn new(store: S, converter: C, registry: G, config: PipelineConfig) -> Self {
        Pipeline {
            store,
            converter,
            registry,
            config,
        }
    }

    /// Process one storage-event notification end to end
    pub fn run(&self, event: &StorageEvent) -> Result<PipelineReport> {
        let object = event.object()?;
        let profile = IngestionProfile::from_trigger_key(&object.key);
        info!(
            "processing '{}' from bucket '{}' under the {profile} profile",
            object.key, object.bucket
        );

        let workspace = Workspace::new(&self.config.workspace_root);
        workspace.reset()?;
        workspace.prepare(profile)?;

        let source = ObjectLocation::with_scheme(
            self.config.scheme.clone(),
            object.bucket.clone(),
            object.key.clone(),
        );
        let archive = self.store.get(&source)?;
        let extraction = extract_archive(archive, &workspace, is_geometry_candidate);

        let geometry = workspace.root().join(profile.geometry_path());
        let model = self
            .converter
            .convert(&geometry, &ConvertOptions::default())?;
        info!("converted {} into {} bytes", geometry.display(), model.len());

        let (scene_id, scene_location) = self.publish(&model)?;

        Ok(PipelineReport {
            profile,
            extraction,
            model_size: model.len(),
            scene_id,
            scene_location,
        })
    }

    /// Upload the model and scene document, then register the scene
    ///
    /// Each step's failure is logged and ends the run; completed steps are
    /// never rolled back.
    fn publish(&self, model: &[u8]) -> Result<(String, ObjectLocation)> {
        let model_location = ObjectLocation::with_scheme(
            self.config.scheme.clone(),
            self.config.destination_bucket.clone(),
            MODEL_OBJECT_KEY,
        );
        self.store
            .put(&model_location, model)
            .inspect_err(|e| error!("model upload failed: {e}"))?;
        info!("uploaded model to {model_location}");

        let document = SceneDocument::for_model(&model_location.uri());
        let scene_location = ObjectLocation::with_scheme(
            self.config.scheme.clone(),
            self.config.destination_bucket.clone(),
            SCENE_OBJECT_KEY,
        );
        let json = document.to_json()?;
        self.store
            .put(&scene_location, json.as_bytes())
            .inspect_err(|e| error!("scene document upload failed: {e}"))?;
        info!("uploaded scene document to {scene_location}");

        let record = SceneRecord {
            workspace_id: self.config.workspace_id.clone(),
            scene_id: generate_scene_id(),
            content_location: scene_location.uri(),
        };
        self.registry
            .create_scene(&record)
            .inspect_err(|e| error!("scene registration failed: {e}"))?;
        info!("registered scene '{}'", record.scene_id);

        Ok((record.scene_id, scene_location))
    }
}
