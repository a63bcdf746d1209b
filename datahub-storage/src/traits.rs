//! Storage backend traits

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Bucket already owned by you: {0}")]
    BucketAlreadyOwned(String),

    /// The store answered with an error code we do not special-case
    #[error("An error occurred ({code}) when calling the {operation} operation: {message}")]
    Service {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// The call never produced a coded response (connect failure, timeout, body read)
    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
}

impl StorageError {
    /// S3 error code, when the store reported one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::BucketNotFound(_) => Some("NoSuchBucket"),
            Self::ObjectNotFound { .. } => Some("NoSuchKey"),
            Self::BucketAlreadyOwned(_) => Some("BucketAlreadyOwnedByYou"),
            Self::Service { code, .. } => Some(code),
            Self::Transport { .. } => None,
        }
    }
}

/// Summary of an object in a listing
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Abstract storage backend trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check that a bucket exists and is reachable
    async fn head_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// List all buckets
    async fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    /// Put an object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// List objects in a bucket (first page only, ordered by key)
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StorageError>;

    /// Get an object's body
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}
