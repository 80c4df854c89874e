//! Scene document model and builder
//!
//! The pipeline's output scene is a fixed-schema JSON document consumed by an
//! external twin-visualization service: a node tree where each node carries a
//! transform, typed capability components, and child indexes into the same
//! document's node array. This pipeline always produces exactly two nodes
//! (a model node referencing the converted GLB, and an ambient light node),
//! but validation checks index bounds generically so any future extension
//! stays covered.
//!
//! Building is a pure function of the model URI: no I/O, no randomness, no
//! external state. Given the same URI twice, [`SceneDocument::for_model`]
//! produces byte-identical JSON both times.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scene schema version emitted in `specVersion`
pub const SCENE_SPEC_VERSION: &str = "1.0";

/// Document revision emitted in `version`
pub const SCENE_DOCUMENT_VERSION: &str = "1";

/// Length unit of the scene
pub const SCENE_UNIT: &str = "meters";

/// Model type tag for binary glTF
pub const MODEL_TYPE_GLB: &str = "GLB";

/// Light type tag for ambient lights
pub const LIGHT_TYPE_AMBIENT: &str = "Ambient";

/// Full-intensity white, packed as 0xRRGGBB
pub const LIGHT_COLOR_WHITE: u32 = 0xff_ff_ff;

/// A declarative scene-graph document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    /// Scene schema version
    pub spec_version: String,
    /// Document revision
    pub version: String,
    /// Length unit for all transforms
    pub unit: String,
    /// Open document-level property mapping (unused by this pipeline)
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// All nodes of the scene graph
    pub nodes: Vec<SceneNode>,
    /// Indexes of nodes with no parent
    pub root_node_indexes: Vec<usize>,
}

/// One node of the scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    /// Node name
    pub name: String,
    /// Local transform, identity by default
    pub transform: Transform,
    /// Open transform-constraint mapping (unused by this pipeline)
    #[serde(default)]
    pub transform_constraint: Map<String, Value>,
    /// Child node indexes into the document's node array
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    /// Typed capability components attached to this node
    pub components: Vec<Component>,
    /// Open per-node property mapping (unused by this pipeline)
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Position/rotation/scale triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation vector
    pub position: [f64; 3],
    /// Euler rotation
    pub rotation: [f64; 3],
    /// Per-axis scale
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

/// A typed capability attached to a scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Component {
    /// Reference to a stored 3D model
    #[serde(rename_all = "camelCase")]
    ModelRef {
        /// Storage URI of the model
        uri: String,
        /// Model format tag, `GLB` for this pipeline
        model_type: String,
    },
    /// A light source
    #[serde(rename_all = "camelCase")]
    Light {
        /// Light kind, `Ambient` for this pipeline
        light_type: String,
        /// Color and intensity settings
        light_settings: LightSettings,
    },
}

/// Light parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSettings {
    /// Packed 0xRRGGBB color
    pub color: u32,
    /// Light intensity, 1.0 is full
    pub intensity: f64,
    /// Whether the light casts shadows
    pub cast_shadow: bool,
}

impl Default for LightSettings {
    fn default() -> Self {
        LightSettings {
            color: LIGHT_COLOR_WHITE,
            intensity: 1.0,
            cast_shadow: true,
        }
    }
}

impl SceneDocument {
    /// Build the two-node scene referencing a converted model
    ///
    /// Node 0 is the model node with the light node (index 1) as its only
    /// child; `rootNodeIndexes` is `[0]`. The light is ambient,
    /// full-intensity white, with shadow casting enabled.
    pub fn for_model(model_uri: &str) -> Self {
        SceneDocument {
            spec_version: SCENE_SPEC_VERSION.to_string(),
            version: SCENE_DOCUMENT_VERSION.to_string(),
            unit: SCENE_UNIT.to_string(),
            properties: Map::new(),
            nodes: vec![
                SceneNode {
                    name: "model".to_string(),
                    transform: Transform::default(),
                    transform_constraint: Map::new(),
                    children: vec![1],
                    components: vec![Component::ModelRef {
                        uri: model_uri.to_string(),
                        model_type: MODEL_TYPE_GLB.to_string(),
                    }],
                    properties: Map::new(),
                },
                SceneNode {
                    name: "Light".to_string(),
                    transform: Transform::default(),
                    transform_constraint: Map::new(),
                    children: Vec::new(),
                    components: vec![Component::Light {
                        light_type: LIGHT_TYPE_AMBIENT.to_string(),
                        light_settings: LightSettings::default(),
                    }],
                    properties: Map::new(),
                },
            ],
            root_node_indexes: vec![0],
        }
    }

    /// Check that every node and root index is within bounds
    pub fn validate(&self) -> Result<()> {
        let count = self.nodes.len();
        for (index, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child >= count {
                    return Err(Error::invalid_scene(format!(
                        "node {index} ('{}') references child {child}, but the document has {count} nodes",
                        node.name
                    )));
                }
            }
        }
        for &root in &self.root_node_indexes {
            if root >= count {
                return Err(Error::invalid_scene(format!(
                    "root index {root} out of bounds for {count} nodes"
                )));
            }
        }
        Ok(())
    }

    /// Validate and serialize the document to its canonical JSON form
    pub fn to_json(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}
