//! Remote service errors
//!
//! Errors returned by S3 or SQS are never retried or rewritten. They are
//! captured as a [`RemoteServiceError`] that keeps the provider's error code
//! (used to detect `BucketAlreadyOwnedByYou`) and the original SDK error as
//! its `source`.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_smithy_runtime_api::client::result::SdkError;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error returned by a remote cloud call, passed through unchanged.
#[derive(Error, Debug)]
#[error("{operation} failed: {message}")]
pub struct RemoteServiceError {
    operation: &'static str,
    code: Option<String>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl RemoteServiceError {
    /// Build an error without an underlying SDK error (used by fakes and tests).
    pub fn new(operation: &'static str, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: code.map(str::to_owned),
            message: message.into(),
            source: None,
        }
    }

    /// Capture an SDK error, keeping its error code and full context.
    pub fn from_sdk<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
        R: fmt::Debug + Send + Sync + 'static,
    {
        let code = err.code().map(str::to_owned);
        let message = DisplayErrorContext(&err).to_string();

        Self {
            operation,
            code,
            message,
            source: Some(Box::new(err)),
        }
    }

    /// Wrap an error raised while reading a response body.
    pub fn from_error<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            operation,
            code: None,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Remote API operation that failed (e.g. `PutObject`)
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Provider error code, when the service returned one
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human-readable error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the provider reported the given error code
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}
