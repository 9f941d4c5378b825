//! Object store seam
//!
//! [`ObjectStore`] is the set of remote calls the storage facade needs.
//! [`S3Store`] implements it on top of `aws_sdk_s3::Client`; tests plug in
//! in-memory fakes.

use crate::error::RemoteServiceError;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl};
use aws_sdk_s3::Client;

/// Region whose buckets are created without a location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// A single PutObject call
#[derive(Debug)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: ByteStream,
    pub content_type: Option<String>,
    pub acl: String,
}

/// Remote blob-store operations used by [`super::S3Service`]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Names of all buckets owned by the caller
    async fn list_bucket_names(&self) -> Result<Vec<String>, RemoteServiceError>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<(), RemoteServiceError>;

    /// Store an object
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), RemoteServiceError>;

    /// Fetch an object body as text
    async fn get_object_text(&self, bucket: &str, key: &str)
        -> Result<String, RemoteServiceError>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), RemoteServiceError>;
}

/// [`ObjectStore`] backed by the AWS S3 SDK
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Underlying SDK client
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        let region = self.client.config().region()?.as_ref();
        if region == DEFAULT_REGION {
            return None;
        }

        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        )
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_bucket_names(&self) -> Result<Vec<String>, RemoteServiceError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("ListBuckets", e))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_owned))
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), RemoteServiceError> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(self.bucket_configuration())
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("CreateBucket", e))?;
        Ok(())
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<(), RemoteServiceError> {
        self.client
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .body(request.body)
            .set_content_type(request.content_type)
            .acl(ObjectCannedAcl::from(request.acl.as_str()))
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("PutObject", e))?;
        Ok(())
    }

    async fn get_object_text(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<String, RemoteServiceError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("GetObject", e))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| RemoteServiceError::from_error("GetObject", e))?;

        Ok(String::from_utf8_lossy(&data.into_bytes()).into_owned())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), RemoteServiceError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("DeleteObject", e))?;
        Ok(())
    }
}
