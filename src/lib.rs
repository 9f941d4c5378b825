//! aws-wrapper Library
//!
//! Convenience layer over S3 and SQS.
//!
//! # Features
//!
//! - **Object paths**: address objects as `bucket/key` strings
//! - **Upload defaults**: `public-read` ACL, content type from file extension,
//!   bucket created on first upload
//! - **Named queues**: push, pop, delete and purge by queue name
//! - **Substitutable clients**: facades are generic over [`s3::ObjectStore`] and
//!   [`sqs::MessageQueue`]
//!
//! # Example
//!
//! ```no_run
//! use aws_wrapper::{config::AwsConfig, s3::UploadOptions, s3::UploadSource, AwsWrapper};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let aws = AwsWrapper::new(&AwsConfig::new("AKIA...", "secret", "us-east-1"))?;
//!
//!     let upload = aws
//!         .s3
//!         .upload("my-bucket/hello.txt", UploadSource::path("hello.txt"), UploadOptions::new())
//!         .await?;
//!     aws.sqs.push_message("uploads", &upload).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod s3;
pub mod sqs;

// Re-export commonly used types
pub use config::{AwsConfig, Config};
pub use error::RemoteServiceError;
pub use s3::{S3Service, StorageError};
pub use sqs::{QueueError, SqsService};

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use config::ConfigError;
use credentials::Credentials;
use s3::{ObjectStore, S3Store};
use sqs::{MessageQueue, SqsQueue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The storage and queue facades, each bound to its own client
pub struct AwsWrapper<S = S3Store, Q = SqsQueue> {
    pub s3: S3Service<S>,
    pub sqs: SqsService<Q>,
}

impl AwsWrapper {
    /// Build S3 and SQS clients from static credentials and a region.
    ///
    /// No network calls are made here.
    pub fn new(config: &AwsConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let credentials = Credentials::from_config(config).into_sdk();
        let region = Region::new(config.region.clone());

        let mut s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(region.clone())
            .credentials_provider(credentials.clone());
        let mut sqs_config = aws_sdk_sqs::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials);

        if let Some(ref endpoint) = config.endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
            sqs_config = sqs_config.endpoint_url(endpoint);
        }

        tracing::debug!(
            region = %config.region,
            endpoint = ?config.endpoint,
            "Created S3 and SQS clients"
        );

        Ok(Self::from_parts(
            S3Service::with_public_url(
                S3Store::new(aws_sdk_s3::Client::from_conf(s3_config.build())),
                config.public_url.clone(),
            ),
            SqsService::new(SqsQueue::new(aws_sdk_sqs::Client::from_conf(
                sqs_config.build(),
            ))),
        ))
    }

    /// Build clients from the AWS default provider chain (environment,
    /// profile files, instance metadata).
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Self::from_parts(
            S3Service::new(S3Store::new(aws_sdk_s3::Client::new(&sdk_config))),
            SqsService::new(SqsQueue::new(aws_sdk_sqs::Client::new(&sdk_config))),
        )
    }
}

impl<S: ObjectStore, Q: MessageQueue> AwsWrapper<S, Q> {
    /// Assemble from already-built facades
    pub fn from_parts(s3: S3Service<S>, sqs: SqsService<Q>) -> Self {
        Self { s3, sqs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_builds_clients() {
        let config = AwsConfig::new("access", "secret", "eu-west-1");
        let aws = AwsWrapper::new(&config).unwrap();

        let s3_region = aws.s3.store().client().config().region().cloned();
        assert_eq!(s3_region, Some(Region::new("eu-west-1")));
        assert_eq!(
            aws.s3.url("b/k.txt"),
            "https://s3.amazonaws.com/b/k.txt"
        );
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let config = AwsConfig::new("", "secret", "us-east-1");
        assert!(matches!(
            AwsWrapper::new(&config),
            Err(ConfigError::MissingCredentials(_))
        ));

        let config = AwsConfig::new("access", "", "us-east-1");
        assert!(matches!(
            AwsWrapper::new(&config),
            Err(ConfigError::MissingCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_new_with_endpoint_and_public_url() {
        let mut config =
            AwsConfig::new("access", "secret", "us-east-1").with_endpoint("http://localhost:4566");
        config.public_url = "http://localhost:4566".into();

        let aws = AwsWrapper::new(&config).unwrap();
        assert_eq!(aws.s3.url("b/k"), "http://localhost:4566/b/k");
    }
}
