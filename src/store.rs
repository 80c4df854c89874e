//! Object store seam and locations
//!
//! The archive source and both publish destinations live in an object store.
//! The pipeline only needs two operations, streaming a source object and
//! writing a destination object, expressed by the [`ObjectStore`] trait so
//! cloud clients stay outside this crate. [`MemoryObjectStore`] is a
//! complete in-process implementation used by the test suite and useful for
//! local runs.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Mutex;
use tracing::debug;

/// Default URI scheme for storage locations
pub const DEFAULT_SCHEME: &str = "s3";

/// A fully-qualified object location, rendered as `<scheme>://<bucket>/<key>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    /// URI scheme, `s3` by default
    pub scheme: String,
    /// Bucket name
    pub bucket: String,
    /// Object key within the bucket
    pub key: String,
}

impl ObjectLocation {
    /// Create a location under the default scheme
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::with_scheme(DEFAULT_SCHEME, bucket, key)
    }

    /// Create a location under an explicit scheme
    pub fn with_scheme(
        scheme: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        ObjectLocation {
            scheme: scheme.into(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The location's URI form
    pub fn uri(&self) -> String {
        format!("{}://{}/{}", self.scheme, self.bucket, self.key)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.key)
    }
}

/// Durable object storage seam
pub trait ObjectStore {
    /// Open a byte stream over an existing object
    fn get(&self, location: &ObjectLocation) -> Result<Box<dyn Read>>;

    /// Write an object, replacing any previous content
    fn put(&self, location: &ObjectLocation, contents: &[u8]) -> Result<()>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn get(&self, location: &ObjectLocation) -> Result<Box<dyn Read>> {
        (**self).get(location)
    }

    fn put(&self, location: &ObjectLocation, contents: &[u8]) -> Result<()> {
        (**self).put(location, contents)
    }
}

/// In-process object store backed by a map
///
/// Objects are keyed by bucket and key; schemes are ignored, matching how a
/// real store addresses objects.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, without going through the trait
    pub fn insert(&self, location: &ObjectLocation, contents: impl Into<Vec<u8>>) {
        let mut objects = self.objects.lock().expect("object map lock poisoned");
        objects.insert(
            (location.bucket.clone(), location.key.clone()),
            contents.into(),
        );
    }

    /// Fetch an object's bytes, if present
    pub fn get_bytes(&self, location: &ObjectLocation) -> Option<Vec<u8>> {
        let objects = self.objects.lock().expect("object map lock poisoned");
        objects
            .get(&(location.bucket.clone(), location.key.clone()))
            .cloned()
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("object map lock poisoned").len()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, location: &ObjectLocation) -> Result<Box<dyn Read>> {
        self.get_bytes(location)
            .map(|contents| Box::new(Cursor::new(contents)) as Box<dyn Read>)
            .ok_or_else(|| Error::store(format!("no such object: {location}")))
    }

    fn put(&self, location: &ObjectLocation, contents: &[u8]) -> Result<()> {
        debug!("put {} ({} bytes)", location, contents.len());
        self.insert(location, contents);
        Ok(())
    }
}
