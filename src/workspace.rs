//! Scratch workspace management
//!
//! Extracted archive members are materialized into a scratch directory tree
//! before conversion. The workspace is exclusively owned by one pipeline run:
//! [`Workspace::reset`] tears down whatever a previous run left behind, then
//! [`Workspace::prepare`] rebuilds the directory structure the active profile
//! expects. `reset` followed by `prepare` needs no manual cleanup in between.

use crate::error::{Error, Result};
use crate::profile::IngestionProfile;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A scratch directory tree owned by a single pipeline run
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a handle to a workspace rooted at `root`
    ///
    /// No filesystem operation happens here; call [`Workspace::reset`] and
    /// [`Workspace::prepare`] before materializing anything.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    /// The workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the workspace tree, tolerating a missing root
    ///
    /// Removes the root and everything under it. A root that does not exist
    /// is not an error: reset is idempotent and safe to call before the
    /// first run.
    pub fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                debug!("removed workspace tree at {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::workspace(&self.root, e)),
        }
    }

    /// Create the root and the subdirectories the profile requires
    ///
    /// Failure here (for example permission denied on the scratch location)
    /// is fatal for the run.
    pub fn prepare(&self, profile: IngestionProfile) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Error::workspace(&self.root, e))?;
        for dir in profile.required_dirs() {
            let path = self.root.join(dir);
            fs::create_dir_all(&path).map_err(|e| Error::workspace(&path, e))?;
        }
        Ok(())
    }

    /// Resolve an archive-relative entry path against the workspace root
    ///
    /// Rejects paths that could land outside the root: absolute paths,
    /// paths with `..` components, and paths containing a drive or scheme
    /// separator.
    pub fn resolve(&self, entry_path: &str) -> Result<PathBuf> {
        validate_entry_path(entry_path)?;
        Ok(self.root.join(entry_path))
    }

    /// Write an extracted member under the workspace
    ///
    /// Intermediate directories are created as needed; directory members of
    /// the archive are never materialized explicitly.
    pub fn materialize(&self, entry_path: &str, contents: &[u8]) -> Result<PathBuf> {
        let dest = self.resolve(entry_path)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::workspace(parent, e))?;
        }
        fs::write(&dest, contents).map_err(|e| Error::workspace(&dest, e))?;
        Ok(dest)
    }
}

fn validate_entry_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::unsafe_entry_path("<empty>"));
    }
    if path.starts_with('/') || path.contains(':') {
        return Err(Error::unsafe_entry_path(path));
    }
    if path.split('/').any(|component| component == "..") {
        return Err(Error::unsafe_entry_path(path));
    }
    Ok(())
}
