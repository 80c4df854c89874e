//! Storage event notifications
//!
//! A pipeline run is triggered by a storage-event notification announcing a
//! just-uploaded archive object. The notification carries the bucket name and
//! the percent-encoded object key; the key is decoded (`+` to space, then
//! percent-decoding) before any part of the pipeline looks at it.

use crate::error::{Error, Result};
use serde::Deserialize;

/// A storage-event notification, as delivered by the object store
///
/// Only the fields the pipeline needs are modeled; any additional fields in
/// the notification payload are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct EventRecord {
    s3: StorageEntity,
}

#[derive(Debug, Clone, Deserialize)]
struct StorageEntity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ObjectEntity {
    key: String,
}

/// The decoded object reference a notification points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Bucket holding the triggering object
    pub bucket: String,
    /// Decoded object key
    pub key: String,
}

impl StorageEvent {
    /// Parse a notification from its JSON payload
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Build a notification for a single object, bypassing JSON
    ///
    /// Useful for tests and for callers that already hold a decoded
    /// bucket/key pair. The key is still run through [`decode_object_key`].
    pub fn for_object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        StorageEvent {
            records: vec![EventRecord {
                s3: StorageEntity {
                    bucket: BucketEntity {
                        name: bucket.into(),
                    },
                    object: ObjectEntity { key: key.into() },
                },
            }],
        }
    }

    /// The triggering object of the first record, with its key decoded
    ///
    /// Notifications batch records, but each archive upload produces its own
    /// invocation; only the first record is consulted.
    pub fn object(&self) -> Result<ObjectRef> {
        let record = self
            .records
            .first()
            .ok_or_else(|| Error::invalid_event("notification contains no records"))?;
        Ok(ObjectRef {
            bucket: record.s3.bucket.name.clone(),
            key: decode_object_key(&record.s3.object.key),
        })
    }
}

/// Decode a percent-encoded object key
///
/// Object stores encode keys form-style: spaces arrive as `+`, everything
/// else percent-encoded. `+` is normalized first, then the percent-escapes
/// are decoded. A key that fails to decode as UTF-8 is kept `+`-normalized
/// rather than rejected.
pub fn decode_object_key(raw: &str) -> String {
    percent_decode(raw)
}

pub(crate) fn percent_decode(raw: &str) -> String {
    let plus_normalized = raw.replace('+', " ");
    match urlencoding::decode(&plus_normalized) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_normalized,
    }
}
