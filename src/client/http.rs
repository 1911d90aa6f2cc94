//! HTTP client for the remote background removal endpoint
//!
//! Uploads the image as a multipart form with a single file part and expects
//! a JSON body of the form `{"image": "<base64 png>"}`.

use super::RemovalClient;
use crate::config::ClientConfig;
use crate::error::{BgRemovalError, Result};
use crate::payload::{ImagePayload, PNG_MIME};
use crate::services::{NoOpProgressReporter, ProgressReporter, UploadProgress};
use crate::types::{ProcessedResult, ProcessingRequest};
use async_trait::async_trait;
use instant::Instant;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use std::sync::Arc;

/// Successful response body of the removal endpoint
#[derive(Debug, Deserialize)]
struct RemovalResponse {
    image: String,
}

/// Remote client backed by `reqwest`
pub struct HttpRemovalClient {
    client: Client,
    endpoint: String,
    upload_field: String,
    chunk_size: usize,
    timeout_secs: u64,
    progress: Arc<dyn ProgressReporter>,
}

impl HttpRemovalClient {
    /// Create a new HTTP client from a validated configuration
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BgRemovalError::transfer(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            upload_field: config.upload_field.clone(),
            chunk_size: config.upload_chunk_size,
            timeout_secs: config.timeout_secs,
            progress: Arc::new(NoOpProgressReporter),
        })
    }

    /// Report per-file upload progress to `reporter`
    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress = reporter;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the file part, streaming the bytes in chunks so progress can be
    /// reported as the body is sent
    fn upload_part(&self, file_name: &str, mime: &str, bytes: Vec<u8>) -> Result<Part> {
        let total = bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = bytes.chunks(self.chunk_size).map(<[u8]>::to_vec).collect();

        let progress = Arc::clone(&self.progress);
        let progress_name = file_name.to_string();
        let start_time = Instant::now();
        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            progress.report_progress(UploadProgress::new(&progress_name, sent, total, start_time));
            Ok::<_, std::io::Error>(chunk)
        }));

        Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| BgRemovalError::transfer(format!("Invalid MIME type '{}': {}", mime, e)))
    }

    fn transfer_error(&self, file_name: &str, error: &reqwest::Error) -> BgRemovalError {
        if error.is_timeout() {
            BgRemovalError::transfer_error_with_context(
                file_name,
                &self.endpoint,
                &format!("request timed out after {}s", self.timeout_secs),
            )
        } else {
            BgRemovalError::transfer_error_with_context(file_name, &self.endpoint, error)
        }
    }

    #[tracing::instrument(level = "debug", skip(self, request), fields(file = %request.file_name(), bytes = request.len()))]
    async fn send(&self, request: ProcessingRequest) -> Result<ProcessedResult> {
        let mime = request.mime_type();
        let (file_name, bytes) = request.into_parts();

        let part = self.upload_part(&file_name, mime, bytes)?;
        let form = Form::new().part(self.upload_field.clone(), part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transfer_error(&file_name, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BgRemovalError::transfer_error_with_context(
                &file_name,
                &self.endpoint,
                &format!("HTTP error {}", status),
            ));
        }

        let body: RemovalResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transfer_error(&file_name, &e)
            } else {
                BgRemovalError::transfer_error_with_context(
                    &file_name,
                    &self.endpoint,
                    &format!("malformed response body: {}", e),
                )
            }
        })?;

        let payload = ImagePayload::from_base64(PNG_MIME, body.image).map_err(|e| {
            BgRemovalError::transfer_error_with_context(
                &file_name,
                &self.endpoint,
                &format!("response image is not valid base64: {}", e),
            )
        })?;

        tracing::debug!(
            file = %file_name,
            decoded_bytes = payload.decoded_len(),
            "Received processed image"
        );
        Ok(ProcessedResult::new(file_name, payload))
    }
}

#[async_trait]
impl RemovalClient for HttpRemovalClient {
    async fn submit(&self, request: ProcessingRequest) -> Result<ProcessedResult> {
        self.send(request).await
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::sync::Mutex;

    struct RecordingReporter {
        updates: Mutex<Vec<UploadProgress>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report_progress(&self, update: UploadProgress) {
            self.updates.lock().unwrap().push(update);
        }
    }

    fn config_for(server: &Server) -> ClientConfig {
        ClientConfig::builder()
            .endpoint(format!("{}/api/remove-background", server.url()))
            .timeout_secs(5)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn submit_uploads_multipart_and_builds_data_uri() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/remove-background")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data; boundary=.*".to_string()),
            )
            .match_body(Matcher::Regex(
                r#"name="image"; filename="cat.png""#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"image":"aGVsbG8="}"#)
            .create_async()
            .await;

        let client = HttpRemovalClient::new(&config_for(&server)).unwrap();
        let result = client
            .submit(ProcessingRequest::new("cat.png", b"raw image bytes".to_vec()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.file_name(), "cat.png");
        assert_eq!(result.data_uri(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(result.payload().decode().unwrap(), b"hello");
    }

    #[tokio::test]
    async fn submit_maps_error_status_to_transfer_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/remove-background")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let client = HttpRemovalClient::new(&config_for(&server)).unwrap();
        let err = client
            .submit(ProcessingRequest::new("dog.jpg", vec![1, 2, 3]))
            .await
            .unwrap_err();

        // exactly one request, no retries
        mock.assert_async().await;
        assert!(err.is_transfer());
        assert!(err.to_string().contains("dog.jpg"));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn submit_rejects_malformed_bodies() {
        let mut server = Server::new_async().await;
        let _not_json = server
            .mock("POST", "/api/remove-background")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = HttpRemovalClient::new(&config_for(&server)).unwrap();
        let err = client
            .submit(ProcessingRequest::new("a.png", vec![0]))
            .await
            .unwrap_err();
        assert!(err.is_transfer());
        assert!(err.to_string().contains("malformed"));
    }

    #[tokio::test]
    async fn submit_rejects_invalid_base64_image() {
        let mut server = Server::new_async().await;
        let _bad = server
            .mock("POST", "/api/remove-background")
            .with_status(200)
            .with_body(r#"{"image":"%%%"}"#)
            .create_async()
            .await;

        let client = HttpRemovalClient::new(&config_for(&server)).unwrap();
        let err = client
            .submit(ProcessingRequest::new("a.png", vec![0]))
            .await
            .unwrap_err();
        assert!(err.is_transfer());
        assert!(err.to_string().contains("base64"));
    }

    #[tokio::test]
    async fn submit_reports_connection_failure() {
        let config = ClientConfig::builder()
            .endpoint("http://127.0.0.1:9/api/remove-background")
            .timeout_secs(2)
            .build()
            .unwrap();
        let client = HttpRemovalClient::new(&config).unwrap();
        let err = client
            .submit(ProcessingRequest::new("a.png", vec![0]))
            .await
            .unwrap_err();
        assert!(err.is_transfer());
    }

    #[tokio::test]
    async fn submit_reports_upload_progress_per_chunk() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("POST", "/api/remove-background")
            .with_status(200)
            .with_body(r#"{"image":"aGVsbG8="}"#)
            .create_async()
            .await;

        let config = ClientConfig::builder()
            .endpoint(format!("{}/api/remove-background", server.url()))
            .upload_chunk_size(4)
            .build()
            .unwrap();
        let reporter = Arc::new(RecordingReporter {
            updates: Mutex::new(Vec::new()),
        });
        let client = HttpRemovalClient::new(&config)
            .unwrap()
            .with_progress_reporter(reporter.clone());

        client
            .submit(ProcessingRequest::new("big.png", vec![7u8; 10]))
            .await
            .unwrap();

        let updates = reporter.updates.lock().unwrap();
        let sent: Vec<u64> = updates.iter().map(|u| u.sent).collect();
        assert_eq!(sent, vec![4, 8, 10]);
        assert_eq!(updates.last().map(UploadProgress::percent), Some(100));
    }
}
