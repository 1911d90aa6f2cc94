//! Error types for background removal client operations

use thiserror::Error;

/// Result type alias for background removal client operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Error taxonomy for uploads, compositing and export actions
///
/// Every variant is contained by the operation that produced it: a failed
/// upload fails one file, a failed decode fails one export action.
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Remote call failed (connection, status, timeout or malformed body)
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Image payload could not be decoded into raster pixels
    #[error("Decode error: {0}")]
    Decode(String),

    /// Clipboard unavailable or write rejected
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Saving a downloaded artifact failed
    #[error("Download error: {0}")]
    Download(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BgRemovalError {
    /// Create a new transfer error
    pub fn transfer<S: Into<String>>(msg: S) -> Self {
        Self::Transfer(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new clipboard error
    pub fn clipboard<S: Into<String>>(msg: S) -> Self {
        Self::Clipboard(msg.into())
    }

    /// Create a new download error
    pub fn download<S: Into<String>>(msg: S) -> Self {
        Self::Download(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a transfer error that names the file and endpoint involved
    pub fn transfer_error_with_context(
        file_name: &str,
        endpoint: &str,
        error: &dyn std::fmt::Display,
    ) -> Self {
        Self::Transfer(format!(
            "Failed to process '{}' via {}: {}",
            file_name, endpoint, error
        ))
    }

    /// Create a download error with the target path
    pub fn download_error_with_path<P: AsRef<std::path::Path>>(
        path: P,
        error: &std::io::Error,
    ) -> Self {
        Self::Download(format!(
            "Failed to save '{}': {}",
            path.as_ref().display(),
            error
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Whether this error belongs to the per-file transfer class
    #[must_use]
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer(_))
    }
}

impl From<base64::DecodeError> for BgRemovalError {
    fn from(error: base64::DecodeError) -> Self {
        Self::Decode(format!("invalid base64 payload: {}", error))
    }
}
