//! Ingestion profiles for the two supported photogrammetry layouts
//!
//! Photogrammetry archives arrive in one of two directory conventions. An
//! ODM-style archive keeps the textured mesh under an `odm_texturing/`
//! directory; a flat-layout archive keeps it at the archive root. The active
//! profile is decided once per run from the name of the triggering object and
//! threaded explicitly through extraction and conversion.

/// Trigger object name that selects the ODM profile (case-insensitive)
pub const ODM_TRIGGER_NAME: &str = "all.zip";

/// Marker identifying textured-model files under the ODM profile
pub const ODM_GEOMETRY_MARKER: &str = "odm_textured_model";

/// Marker identifying textured-mesh files under the flat-layout profile
pub const FLAT_GEOMETRY_MARKER: &str = "scene_mesh_textured";

/// Fixed geometry path the converter consumes under the ODM profile
pub const ODM_GEOMETRY_PATH: &str = "odm_texturing/odm_textured_model_geo.obj";

/// Fixed geometry path the converter consumes under the flat-layout profile
pub const FLAT_GEOMETRY_PATH: &str = "scene_mesh_textured.obj";

/// The directory-layout convention an archive follows
///
/// Exactly one profile is active per run. It is fixed before extraction
/// begins, from the decoded key of the triggering object, and never changes
/// mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionProfile {
    /// OpenDroneMap-style output: geometry under `odm_texturing/`
    Odm,
    /// Flat output: geometry at the archive root
    FlatLayout,
}

impl IngestionProfile {
    /// Classify the run from the decoded trigger object key
    ///
    /// A key that is exactly `all.zip` (case-insensitive) selects the ODM
    /// profile; any other key selects the flat layout. The comparison is
    /// against the whole key, so `photos/all.zip` is flat-layout.
    pub fn from_trigger_key(key: &str) -> Self {
        if key.eq_ignore_ascii_case(ODM_TRIGGER_NAME) {
            IngestionProfile::Odm
        } else {
            IngestionProfile::FlatLayout
        }
    }

    /// Subdirectories the workspace must pre-create for this profile
    ///
    /// The ODM profile needs `odm_texturing/` to exist before extraction so
    /// the textured mesh's relative texture references resolve.
    pub fn required_dirs(self) -> &'static [&'static str] {
        match self {
            IngestionProfile::Odm => &["odm_texturing"],
            IngestionProfile::FlatLayout => &[],
        }
    }

    /// The workspace-relative path of the geometry file to convert
    pub fn geometry_path(self) -> &'static str {
        match self {
            IngestionProfile::Odm => ODM_GEOMETRY_PATH,
            IngestionProfile::FlatLayout => FLAT_GEOMETRY_PATH,
        }
    }
}

impl std::fmt::Display for IngestionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IngestionProfile::Odm => "odm",
            IngestionProfile::FlatLayout => "flat-layout",
        };
        f.write_str(name)
    }
}

/// Decide whether an archive entry path is a geometry candidate
///
/// Pure predicate: a case-insensitive substring match against both profile
/// markers. The predicate deliberately does not gate on the active profile;
/// matching either marker captures the correct files regardless, and the
/// profile decides which materialized path conversion consumes.
pub fn is_geometry_candidate(path: &str) -> bool {
    let lowered = path.to_ascii_lowercase();
    lowered.contains(ODM_GEOMETRY_MARKER) || lowered.contains(FLAT_GEOMETRY_MARKER)
}
