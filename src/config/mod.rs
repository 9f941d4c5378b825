//! Configuration module for aws-wrapper
//!
//! Handles loading and parsing of YAML configuration files with support for
//! environment variable expansion and validation. The library itself only
//! needs an [`AwsConfig`]; the file format exists for the CLI and for callers
//! that prefer to keep credentials out of code.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Public endpoint used to build object URLs when none is configured
pub const DEFAULT_PUBLIC_URL: &str = "https://s3.amazonaws.com";

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - Simple expansion, keeps placeholder if var not found
/// - `${VAR_NAME:-default}` - Expansion with default value
///
/// Variable names must start with a letter or underscore and contain only
/// uppercase letters, digits, and underscores.
pub(crate) fn expand_env_vars(s: &str) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}") {
        Ok(re) => re,
        Err(_) => return s.to_string(),
    };
    let mut last_match = 0;
    let mut result = String::with_capacity(s.len());

    for cap in re.captures_iter(s) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        result.push_str(&s[last_match..full_match.start()]);

        let value = match std::env::var(var_name.as_str()) {
            Ok(val) => val,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                // No env var and no default. Keep the original placeholder.
                None => full_match.as_str().to_string(),
            },
        };
        result.push_str(&value);

        last_match = full_match.end();
    }

    result.push_str(&s[last_match..]);

    result
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate that a URL starts with http:// or https://
fn is_valid_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Main configuration structure
///
/// # Example
///
/// ```yaml
/// aws:
///   access_key_id: "${AWS_ACCESS_KEY_ID}"
///   secret_access_key: "${AWS_SECRET_ACCESS_KEY}"
///   region: "${AWS_REGION:-us-east-1}"
/// logging:
///   level: debug
///   json: true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aws: AwsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aws.validate()
    }
}

/// Connection settings shared by the S3 and SQS clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    pub region: String,
    /// Custom service endpoint (LocalStack, MinIO, ...). S3 switches to
    /// path-style addressing when set.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Prefix for the public object URLs returned by `url` and `upload`
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl AwsConfig {
    /// Create a configuration from static credentials and a region
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            region: region.into(),
            endpoint: None,
            public_url: default_public_url(),
        }
    }

    /// Point both clients at a custom endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Validate the connection settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key_id.trim().is_empty() {
            return Err(ConfigError::MissingCredentials(
                "access_key_id is empty".into(),
            ));
        }

        if self.secret_access_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials(
                "secret_access_key is empty".into(),
            ));
        }

        if self.region.trim().is_empty() {
            return Err(ConfigError::ValidationError("Region cannot be empty".into()));
        }

        if let Some(ref endpoint) = self.endpoint {
            if !is_valid_http_url(endpoint) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid endpoint '{}': must start with http:// or https://",
                    endpoint
                )));
            }
        }

        if !is_valid_http_url(&self.public_url) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid public_url '{}': must start with http:// or https://",
                self.public_url
            )));
        }

        Ok(())
    }
}

fn default_public_url() -> String {
    DEFAULT_PUBLIC_URL.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
