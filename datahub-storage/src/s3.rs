//! S3-compatible backend built on `aws-sdk-s3`

use super::traits::{ObjectStore, ObjectSummary, StorageError};
use async_trait::async_trait;
use aws_config::{retry::RetryConfig, BehaviorVersion, Region};
use aws_sdk_s3::{
    config::Credentials,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::{ByteStream, DateTime as SdkDateTime},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Region that must not be sent as a bucket location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// Full endpoint URL including scheme, e.g. `http://minio:9000`
    pub endpoint_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Object store backed by an S3-compatible service such as Minio
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    region: String,
}

impl S3Store {
    /// Build a client for the given endpoint.
    ///
    /// Nothing is sent over the network here; an unreachable endpoint or bad
    /// credentials surface on the first store call.
    pub async fn connect(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key,
            &settings.secret_key,
            None,
            None,
            "datahub-config",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(&settings.endpoint_url)
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        debug!(endpoint = %settings.endpoint_url, region = %settings.region, "S3 client configured");

        Self {
            client: Client::from_conf(config),
            region: settings.region.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn head_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify("HeadBucket", bucket, None, &e))?;
        Ok(())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| classify("CreateBucket", bucket, None, &e))?;
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| classify("ListBuckets", "", None, &e))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| classify("PutObject", bucket, Some(key), &e))?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify("ListObjectsV2", bucket, None, &e))?;

        Ok(output
            .contents()
            .iter()
            .map(|obj| ObjectSummary {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().and_then(|s| u64::try_from(s).ok()).unwrap_or(0),
                last_modified: obj.last_modified().and_then(to_chrono),
            })
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("GetObject", bucket, Some(key), &e))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Transport {
                operation: "GetObject",
                message: e.to_string(),
            })?
            .into_bytes();

        Ok(data)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("DeleteObject", bucket, Some(key), &e))?;
        Ok(())
    }
}

fn to_chrono(ts: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

/// Turn an SDK failure into a [`StorageError`] using the S3 error code.
fn classify<E, R>(
    operation: &'static str,
    bucket: &str,
    key: Option<&str>,
    err: &SdkError<E, R>,
) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match err.code() {
        Some(code) => from_code(
            operation,
            code,
            err.message().unwrap_or_default(),
            bucket,
            key,
        ),
        None => StorageError::Transport {
            operation,
            message: DisplayErrorContext(err).to_string(),
        },
    }
}

fn from_code(
    operation: &'static str,
    code: &str,
    message: &str,
    bucket: &str,
    key: Option<&str>,
) -> StorageError {
    match (code, key) {
        ("NoSuchKey", Some(key)) => StorageError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        // HEAD responses carry no body, so a missing bucket reports a bare NotFound
        ("NoSuchBucket", _) | ("NotFound", None) => StorageError::BucketNotFound(bucket.to_string()),
        ("BucketAlreadyOwnedByYou", _) => StorageError::BucketAlreadyOwned(bucket.to_string()),
        _ => StorageError::Service {
            operation,
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}
