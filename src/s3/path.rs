//! Object path parsing
//!
//! An object path is `<bucket>/<key...>`. It is normalized POSIX-style before
//! being split: repeated slashes collapse, `.` segments are dropped and `..`
//! segments remove their parent.

use super::StorageError;
use std::fmt;

/// Normalize a slash-delimited path.
///
/// Keeps a leading and a trailing slash when present. An empty relative
/// result becomes `.`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if normalized.is_empty() && !absolute {
        normalized.push('.');
    }
    if trailing && !segments.is_empty() {
        normalized.push('/');
    }
    if absolute {
        normalized.insert(0, '/');
    }

    normalized
}

/// A validated `<bucket>/<key>` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    bucket: String,
    key: String,
}

impl ObjectPath {
    /// Normalize and split an object path.
    ///
    /// Fails with [`StorageError::MissingArgument`] for an empty string and
    /// [`StorageError::InvalidPath`] when the bucket or the key is missing.
    pub fn parse(path: &str) -> Result<Self, StorageError> {
        if path.trim().is_empty() {
            return Err(StorageError::MissingArgument("object path"));
        }

        let normalized = normalize(path);
        let (bucket, key) = normalized
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;

        if bucket.is_empty() || key.is_empty() {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Bucket name (first path segment)
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key (everything after the first segment)
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
