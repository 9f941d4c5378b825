//! Upload request and result types

use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Canned ACL applied when the caller does not pick one
pub const DEFAULT_ACL: &str = "public-read";

/// Where the object body comes from
#[derive(Debug)]
pub enum UploadSource {
    /// An already-open body, uploaded as-is
    Stream(ByteStream),
    /// A local file, checked and opened right before the upload call
    Path(PathBuf),
}

impl UploadSource {
    /// Upload a local file
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Upload an in-memory or streaming body
    pub fn stream(body: impl Into<ByteStream>) -> Self {
        Self::Stream(body.into())
    }

    pub(crate) fn is_missing(&self) -> bool {
        match self {
            Self::Stream(_) => false,
            Self::Path(path) => path.as_os_str().is_empty(),
        }
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<ByteStream> for UploadSource {
    fn from(body: ByteStream) -> Self {
        Self::Stream(body)
    }
}

impl From<bytes::Bytes> for UploadSource {
    fn from(body: bytes::Bytes) -> Self {
        Self::Stream(ByteStream::from(body))
    }
}

/// Optional upload settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Content type; detected from the file extension for path sources when unset
    pub content_type: Option<String>,
    /// Canned ACL; [`DEFAULT_ACL`] when unset
    pub acl: Option<String>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn acl(mut self, acl: impl Into<String>) -> Self {
        self.acl = Some(acl.into());
        self
    }

    /// ACL to send with the upload
    pub fn acl_or_default(&self) -> &str {
        self.acl.as_deref().unwrap_or(DEFAULT_ACL)
    }

    /// Content type to send: the explicit one, otherwise a guess from the
    /// file extension for path sources. Unknown extensions map to
    /// `application/octet-stream`; stream sources stay unset.
    pub(crate) fn resolve_content_type(&self, source: &UploadSource) -> Option<String> {
        if let Some(ref content_type) = self.content_type {
            return Some(content_type.clone());
        }

        match source {
            UploadSource::Path(path) => Some(
                mime_guess::from_path(path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string(),
            ),
            UploadSource::Stream(_) => None,
        }
    }
}

/// Bucket and key an object was stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Public URL of the stored object
    pub url: String,
    pub location: ObjectLocation,
}

/// Stages of the upload sequence, recorded on the upload span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Validating,
    ResolvingBucket,
    CreatingBucket,
    PreparingBody,
    Uploading,
    Done,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::ResolvingBucket => "resolving_bucket",
            Self::CreatingBucket => "creating_bucket",
            Self::PreparingBody => "preparing_body",
            Self::Uploading => "uploading",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
