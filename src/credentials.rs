//! Credentials Module
//!
//! Static credentials handed to the S3 and SQS clients at construction time.
//!
//! # Example
//!
//! ```
//! use aws_wrapper::credentials::Credentials;
//!
//! let creds = Credentials::new("access-key", "secret-key");
//! assert_eq!(creds.access_key_id(), "access-key");
//! assert_eq!(creds.secret_access_key(), "secret-key");
//! ```

use crate::config::AwsConfig;

/// Provider name reported by the SDK for credentials built here
const PROVIDER_NAME: &str = "aws-wrapper";

/// Credentials for AWS authentication
#[derive(Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

impl Credentials {
    /// Create new credentials
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Create credentials with session token (for temporary credentials)
    pub fn with_session_token(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: Some(session_token.into()),
        }
    }

    /// Take credentials from the connection settings. Presence of the key
    /// pair is checked by [`AwsConfig::validate`].
    pub fn from_config(config: &AwsConfig) -> Self {
        Self {
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            session_token: config.session_token.clone(),
        }
    }

    /// Get the access key ID
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Get the secret access key
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Get the session token (if any)
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Convert into the SDK credential type accepted by client builders
    pub fn into_sdk(self) -> aws_credential_types::Credentials {
        aws_credential_types::Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            self.session_token,
            None,
            PROVIDER_NAME,
        )
    }
}
