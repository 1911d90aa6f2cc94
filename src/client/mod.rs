//! Remote background removal clients
//!
//! This module provides the `RemovalClient` abstraction used by the upload
//! pipeline:
//! - HTTP client talking to the remote removal endpoint (multipart upload)
//! - Scripted mock client for tests and offline demos

pub mod http;
pub mod mock;

use crate::{error::Result, types::ProcessingRequest, types::ProcessedResult};
use async_trait::async_trait;

pub use self::http::HttpRemovalClient;
pub use self::mock::MockRemovalClient;

/// A client that turns one uploaded image into one processed result
#[async_trait]
pub trait RemovalClient: Send + Sync {
    /// Submit one file for background removal
    ///
    /// Performs exactly one outbound request and never retries; retry
    /// policy, if any, belongs to the caller.
    ///
    /// # Errors
    /// - `BgRemovalError::Transfer` when the request does not complete
    ///   successfully (connection failure, non-2xx status, timeout or a
    ///   malformed response body)
    async fn submit(&self, request: ProcessingRequest) -> Result<ProcessedResult>;

    /// Human-readable name of the remote target, for logging
    fn describe(&self) -> String;
}
