//! Configuration types for the background removal client

use crate::color::BackgroundColor;
use crate::error::{BgRemovalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/remove-background";

/// Multipart field name carrying the uploaded image
pub const DEFAULT_UPLOAD_FIELD: &str = "image";

/// Client-side request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Size of each streamed upload chunk in bytes
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the remote client and the upload pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote background removal endpoint (HTTP POST, multipart)
    pub endpoint: String,

    /// Multipart field name for the image part
    pub upload_field: String,

    /// Request timeout in seconds; a timed out request is a transfer error
    pub timeout_secs: u64,

    /// Maximum files in flight per batch (`None` = every file at once)
    pub max_concurrency: Option<usize>,

    /// Upload chunk size used for progress reporting
    pub upload_chunk_size: usize,

    /// Background colour a new session starts with
    pub default_background: BackgroundColor,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrency: None,
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
            default_background: BackgroundColor::Transparent,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bgremove_gallery::ClientConfig;
    ///
    /// let config = ClientConfig::builder()
    ///     .endpoint("http://127.0.0.1:8080/remove")
    ///     .timeout_secs(30)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.timeout_secs, 30);
    /// ```
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Request timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults. The loaded configuration
    /// is validated before it is returned.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BgRemovalError::invalid_config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            BgRemovalError::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    ///
    /// # Validation Rules
    ///
    /// - Endpoint: non-empty `http://` or `https://` URL
    /// - Upload field: non-empty
    /// - Timeout: 1-3600 seconds
    /// - Max concurrency: at least 1 when set
    /// - Upload chunk size: at least 1 byte
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(BgRemovalError::invalid_config(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }

        if self.upload_field.trim().is_empty() {
            return Err(BgRemovalError::invalid_config(
                "Upload field name must not be empty",
            ));
        }

        if self.timeout_secs == 0 || self.timeout_secs > 3600 {
            return Err(BgRemovalError::config_value_error(
                "timeout",
                self.timeout_secs,
                "1-3600",
                Some(DEFAULT_TIMEOUT_SECS),
            ));
        }

        if self.max_concurrency == Some(0) {
            return Err(BgRemovalError::config_value_error(
                "max concurrency",
                0,
                "1 or more",
                None,
            ));
        }

        if self.upload_chunk_size == 0 {
            return Err(BgRemovalError::config_value_error(
                "upload chunk size",
                0,
                "1 or more bytes",
                Some(DEFAULT_UPLOAD_CHUNK_SIZE),
            ));
        }

        Ok(())
    }
}

/// Builder for `ClientConfig`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the remote endpoint URL
    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the multipart field name
    #[must_use]
    pub fn upload_field<S: Into<String>>(mut self, field: S) -> Self {
        self.config.upload_field = field.into();
        self
    }

    /// Set the request timeout in seconds
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Bound the number of files in flight per batch
    #[must_use]
    pub fn max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.config.max_concurrency = limit;
        self
    }

    /// Set the streamed upload chunk size
    #[must_use]
    pub fn upload_chunk_size(mut self, size: usize) -> Self {
        self.config.upload_chunk_size = size;
        self
    }

    /// Set the background colour new sessions start with
    #[must_use]
    pub fn default_background(mut self, color: BackgroundColor) -> Self {
        self.config.default_background = color;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
