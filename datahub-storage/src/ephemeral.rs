//! In-memory ephemeral storage backend

use super::traits::{ObjectStore, ObjectSummary, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Listing page size, matching the S3 default for ListObjectsV2
const MAX_KEYS: usize = 1000;

/// In-memory stored object
struct InMemoryObject {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

/// In-memory bucket
struct InMemoryBucket {
    objects: DashMap<String, InMemoryObject>,
}

impl InMemoryBucket {
    fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }
}

/// Ephemeral (in-memory) storage backend
pub struct EphemeralStore {
    buckets: DashMap<String, Arc<InMemoryBucket>>,
}

impl Default for EphemeralStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EphemeralStore {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    fn bucket(&self, bucket: &str) -> Result<Arc<InMemoryBucket>, StorageError> {
        self.buckets
            .get(bucket)
            .map(|b| Arc::clone(b.value()))
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))
    }
}

#[async_trait]
impl ObjectStore for EphemeralStore {
    async fn head_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.bucket(bucket).map(|_| ())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        match self.buckets.entry(bucket.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StorageError::BucketAlreadyOwned(bucket.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(InMemoryBucket::new()));
                Ok(())
            }
        }
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self.buckets.iter().map(|r| r.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let bucket_ref = self.bucket(bucket)?;

        bucket_ref.objects.insert(
            key.to_string(),
            InMemoryObject {
                data,
                last_modified: Utc::now(),
            },
        );

        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StorageError> {
        let bucket_ref = self.bucket(bucket)?;

        let mut objects: Vec<ObjectSummary> = bucket_ref
            .objects
            .iter()
            .map(|entry| ObjectSummary {
                key: entry.key().clone(),
                size: entry.data.len() as u64,
                last_modified: Some(entry.last_modified),
            })
            .collect();

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        objects.truncate(MAX_KEYS);
        Ok(objects)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let bucket_ref = self.bucket(bucket)?;

        bucket_ref
            .objects
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let bucket_ref = self.bucket(bucket)?;
        bucket_ref.objects.remove(key);
        Ok(())
    }
}
