//! Model converter adapter
//!
//! Geometry conversion (OBJ to binary glTF) is an external collaborator: the
//! pipeline hands a local geometry path plus options across the
//! [`ModelConverter`] seam and gets back an opaque GLB buffer. Nothing about
//! the conversion algorithm leaks into the pipeline; failures are fatal for
//! the run with no retry.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Options passed to the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Request self-contained binary (GLB) output
    pub binary: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions { binary: true }
    }
}

/// External geometry converter seam
///
/// Implementations receive the path of a materialized OBJ file and return
/// the converted model as an opaque buffer. A missing input file must
/// surface as [`Error::MissingGeometry`].
pub trait ModelConverter {
    /// Convert the geometry file at `geometry` into a binary model buffer
    fn convert(&self, geometry: &Path, options: &ConvertOptions) -> Result<Vec<u8>>;
}

impl<T: ModelConverter + ?Sized> ModelConverter for &T {
    fn convert(&self, geometry: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
        (**self).convert(geometry, options)
    }
}

/// Adapter over a closure or function, mainly for tests and embedding
pub struct FnConverter<F>(pub F);

impl<F> ModelConverter for FnConverter<F>
where
    F: Fn(&Path, &ConvertOptions) -> Result<Vec<u8>>,
{
    fn convert(&self, geometry: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
        (self.0)(geometry, options)
    }
}

/// Converter that shells out to an `obj2gltf`-style executable
///
/// The program is invoked as `<program> -i <input> -o <output> [-b]` and the
/// produced file is read back into memory. The output lands next to the
/// input with a `.glb` extension, inside the run's scratch workspace, so the
/// next run's reset cleans it up.
pub struct CommandConverter {
    program: PathBuf,
}

impl CommandConverter {
    /// Create a converter invoking `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandConverter {
            program: program.into(),
        }
    }
}

impl ModelConverter for CommandConverter {
    fn convert(&self, geometry: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
        if !geometry.is_file() {
            return Err(Error::missing_geometry(geometry));
        }

        let destination = geometry.with_extension("glb");
        let mut command = Command::new(&self.program);
        command
            .arg("-i")
            .arg(geometry)
            .arg("-o")
            .arg(&destination);
        if options.binary {
            command.arg("-b");
        }

        info!(
            "converting {} with {}",
            geometry.display(),
            self.program.display()
        );
        let output = command.output().map_err(|e| {
            Error::conversion(format!(
                "failed to launch {}: {e}",
                self.program.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::conversion(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        fs::read(&destination).map_err(|e| {
            Error::conversion(format!(
                "converter reported success but produced no output at {}: {e}",
                destination.display()
            ))
        })
    }
}
