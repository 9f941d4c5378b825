//! S3 storage module
//!
//! [`S3Service`] turns high-level object operations into S3 calls. Object
//! paths combine the bucket and the key (`my-bucket/path/to/file.txt`).
//!
//! # Example
//!
//! ```no_run
//! use aws_wrapper::s3::{S3Service, S3Store, UploadOptions, UploadSource};
//!
//! # async fn example(client: aws_sdk_s3::Client) -> Result<(), Box<dyn std::error::Error>> {
//! let s3 = S3Service::new(S3Store::new(client));
//!
//! let result = s3
//!     .upload(
//!         "my-bucket/reports/2024.pdf",
//!         UploadSource::path("/tmp/2024.pdf"),
//!         UploadOptions::new().acl("private"),
//!     )
//!     .await?;
//! println!("Stored at {}", result.url);
//!
//! let text = s3.get_file_contents("my-bucket/notes.txt").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```
//!
//! # Tracing
//!
//! | Operation | Span Name | Attributes |
//! |-----------|-----------|------------|
//! | delete_file | `s3.delete_file` | path, s3.bucket, s3.key |
//! | get_file_contents | `s3.get_file_contents` | path, s3.bucket, s3.key, content.bytes |
//! | upload | `s3.upload` | path, s3.bucket, s3.key, upload.stage, upload.bucket_created |

pub mod path;
pub mod store;
pub mod upload;

pub use path::ObjectPath;
pub use store::{ObjectStore, PutObjectRequest, S3Store};
pub use upload::{
    ObjectLocation, UploadOptions, UploadResult, UploadSource, UploadStage, DEFAULT_ACL,
};

use crate::config::DEFAULT_PUBLIC_URL;
use crate::error::RemoteServiceError;
use crate::metrics;
use aws_sdk_s3::primitives::ByteStream;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Error code S3 returns when creating a bucket the caller already owns
const BUCKET_ALREADY_OWNED: &str = "BucketAlreadyOwnedByYou";

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Missing argument: {0} is required")]
    MissingArgument(&'static str),

    #[error("Invalid object path '{0}': expected <bucket>/<key>")]
    InvalidPath(String),

    #[error("File '{}' doesn't exist or is empty", .0.display())]
    EmptySource(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Remote(#[from] RemoteServiceError),
}

/// Storage facade over an [`ObjectStore`]
pub struct S3Service<S = S3Store> {
    store: S,
    public_url: String,
}

impl<S: ObjectStore> S3Service<S> {
    /// Create a facade that builds URLs under `https://s3.amazonaws.com`
    pub fn new(store: S) -> Self {
        Self::with_public_url(store, DEFAULT_PUBLIC_URL)
    }

    /// Create a facade with a custom public URL prefix
    pub fn with_public_url(store: S, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self { store, public_url }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Public URL for an object path. Pure string transform, no remote call.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_url, path::normalize(path))
    }

    /// Delete an object
    #[tracing::instrument(
        name = "s3.delete_file",
        skip(self),
        fields(s3.bucket = tracing::field::Empty, s3.key = tracing::field::Empty),
        err
    )]
    pub async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let object = ObjectPath::parse(path)?;
        record_location(&object);

        let start_time = Instant::now();
        let result = self.store.delete_object(object.bucket(), object.key()).await;
        metrics::record_operation(
            "s3",
            "delete_file",
            result.is_ok(),
            start_time.elapsed().as_secs_f64(),
        );

        result?;
        tracing::info!("Object deleted");
        Ok(())
    }

    /// Read an object body as text
    #[tracing::instrument(
        name = "s3.get_file_contents",
        skip(self),
        fields(
            s3.bucket = tracing::field::Empty,
            s3.key = tracing::field::Empty,
            content.bytes = tracing::field::Empty
        ),
        err
    )]
    pub async fn get_file_contents(&self, path: &str) -> Result<String, StorageError> {
        let object = ObjectPath::parse(path)?;
        record_location(&object);

        let start_time = Instant::now();
        let result = self.store.get_object_text(object.bucket(), object.key()).await;
        metrics::record_operation(
            "s3",
            "get_file_contents",
            result.is_ok(),
            start_time.elapsed().as_secs_f64(),
        );

        let contents = result?;
        tracing::Span::current().record("content.bytes", contents.len());
        Ok(contents)
    }

    /// Upload a stream or a local file, creating the bucket when missing.
    ///
    /// Runs `Validating → ResolvingBucket → {CreatingBucket} → PreparingBody →
    /// Uploading → Done`. The first failing step aborts the upload; nothing is
    /// rolled back.
    #[tracing::instrument(
        name = "s3.upload",
        skip(self, source, options),
        fields(
            s3.bucket = tracing::field::Empty,
            s3.key = tracing::field::Empty,
            http.content_type = tracing::field::Empty,
            upload.acl = tracing::field::Empty,
            upload.stage = tracing::field::Empty,
            upload.bucket_created = tracing::field::Empty
        ),
        err
    )]
    pub async fn upload(
        &self,
        path: &str,
        source: UploadSource,
        options: UploadOptions,
    ) -> Result<UploadResult, StorageError> {
        let start_time = Instant::now();
        let mut stage = UploadStage::Validating;

        let result = self.run_upload(path, source, &options, &mut stage).await;
        metrics::record_operation(
            "s3",
            "upload",
            result.is_ok(),
            start_time.elapsed().as_secs_f64(),
        );

        match result {
            Ok(upload) => {
                tracing::info!(
                    url = %upload.url,
                    duration_ms = start_time.elapsed().as_millis(),
                    "Upload completed"
                );
                Ok(upload)
            }
            Err(e) => {
                tracing::error!(error = %e, stage = %stage, "Upload failed");
                Err(e)
            }
        }
    }

    async fn run_upload(
        &self,
        path: &str,
        source: UploadSource,
        options: &UploadOptions,
        stage: &mut UploadStage,
    ) -> Result<UploadResult, StorageError> {
        let span = tracing::Span::current();
        let mut advance = |next: UploadStage| {
            *stage = next;
            span.record("upload.stage", next.as_str());
        };

        advance(UploadStage::Validating);
        if path.trim().is_empty() || source.is_missing() {
            return Err(StorageError::MissingArgument("object path and upload source"));
        }

        let content_type = options.resolve_content_type(&source);
        let acl = options.acl_or_default().to_string();
        let object = ObjectPath::parse(path)?;
        record_location(&object);
        if let Some(ref content_type) = content_type {
            span.record("http.content_type", content_type.as_str());
        }
        span.record("upload.acl", acl.as_str());

        advance(UploadStage::ResolvingBucket);
        let buckets = self.store.list_bucket_names().await?;
        if !buckets.iter().any(|name| name == object.bucket()) {
            advance(UploadStage::CreatingBucket);
            self.ensure_bucket(object.bucket()).await?;
        }

        advance(UploadStage::PreparingBody);
        let (body, size) = match source {
            UploadSource::Stream(body) => {
                let size = body.size_hint().1;
                (body, size)
            }
            UploadSource::Path(file) => {
                let (body, size) = open_file_body(&file).await?;
                (body, Some(size))
            }
        };

        advance(UploadStage::Uploading);
        self.store
            .put_object(PutObjectRequest {
                bucket: object.bucket().to_string(),
                key: object.key().to_string(),
                body,
                content_type,
                acl,
            })
            .await?;

        if let Some(size) = size {
            metrics::record_upload_bytes(size);
        }

        advance(UploadStage::Done);
        Ok(UploadResult {
            url: self.url(path),
            location: ObjectLocation {
                bucket: object.bucket().to_string(),
                key: object.key().to_string(),
            },
        })
    }

    /// Create a bucket; one the caller already owns counts as created.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let span = tracing::Span::current();

        match self.store.create_bucket(bucket).await {
            Ok(()) => {
                metrics::record_bucket_created();
                span.record("upload.bucket_created", true);
                tracing::info!(bucket = %bucket, "Bucket created");
                Ok(())
            }
            Err(e) if e.has_code(BUCKET_ALREADY_OWNED) => {
                span.record("upload.bucket_created", false);
                tracing::debug!(bucket = %bucket, "Bucket already owned by caller");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn record_location(object: &ObjectPath) {
    let span = tracing::Span::current();
    span.record("s3.bucket", object.bucket());
    span.record("s3.key", object.key());
}

/// Open a local file as an upload body, returning it with its size. The file
/// must be a regular, non-empty file.
async fn open_file_body(file: &Path) -> Result<(ByteStream, u64), StorageError> {
    let metadata = match tokio::fs::metadata(file).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::EmptySource(file.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() || metadata.len() == 0 {
        return Err(StorageError::EmptySource(file.to_path_buf()));
    }

    let body = ByteStream::from_path(file)
        .await
        .map_err(|e| StorageError::IoError(std::io::Error::other(e)))?;

    tracing::debug!(file = %file.display(), bytes = metadata.len(), "Opened upload source");
    Ok((body, metadata.len()))
}
