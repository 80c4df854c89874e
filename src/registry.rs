//! Scene registry seam
//!
//! After the converted model and the scene document are stored, the pipeline
//! registers a scene record with an external twin-management service. The
//! call is expressed as a trait so the service client stays outside this
//! crate; the record carries a freshly generated unique scene identifier.

use crate::error::Result;
use uuid::Uuid;

/// Fixed prefix of generated scene identifiers
pub const SCENE_ID_PREFIX: &str = "PhotogrammetryScene-";

/// Parameters of a create-scene call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRecord {
    /// Identifier of the twin workspace the scene belongs to
    pub workspace_id: String,
    /// Unique scene identifier, see [`generate_scene_id`]
    pub scene_id: String,
    /// Storage URI of the uploaded scene document
    pub content_location: String,
}

/// External scene-registration seam
pub trait SceneRegistry {
    /// Register a scene record with the twin service
    fn create_scene(&self, record: &SceneRecord) -> Result<()>;
}

impl<T: SceneRegistry + ?Sized> SceneRegistry for &T {
    fn create_scene(&self, record: &SceneRecord) -> Result<()> {
        (**self).create_scene(record)
    }
}

/// Generate a unique scene identifier: the fixed prefix plus a random UUID
pub fn generate_scene_id() -> String {
    format!("{SCENE_ID_PREFIX}{}", Uuid::new_v4())
}
