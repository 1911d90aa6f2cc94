//! Scripted in-process removal client
//!
//! Lets tests and offline demos decide per file name whether a submission
//! succeeds or fails, and hold a submission open until it is released, so
//! completion order can be controlled independently of submission order.

use super::RemovalClient;
use crate::error::{BgRemovalError, Result};
use crate::payload::ImagePayload;
use crate::types::{ProcessedResult, ProcessingRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

/// Scripted outcome for one file name
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return these PNG bytes as the processed image
    Succeed(Vec<u8>),
    /// Fail with a transfer error carrying this message
    Fail(String),
}

#[derive(Default)]
struct Script {
    outcomes: HashMap<String, MockOutcome>,
    gates: HashMap<String, oneshot::Receiver<()>>,
}

/// Mock client; unscripted files echo their own bytes back
#[derive(Clone, Default)]
pub struct MockRemovalClient {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRemovalClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `file_name` to succeed with `png` as the result image
    #[must_use]
    pub fn succeed<S: Into<String>>(self, file_name: S, png: Vec<u8>) -> Self {
        self.lock_script()
            .outcomes
            .insert(file_name.into(), MockOutcome::Succeed(png));
        self
    }

    /// Script `file_name` to fail with a transfer error
    #[must_use]
    pub fn fail<S: Into<String>, M: Into<String>>(self, file_name: S, message: M) -> Self {
        self.lock_script()
            .outcomes
            .insert(file_name.into(), MockOutcome::Fail(message.into()));
        self
    }

    /// Hold submissions of `file_name` until the returned sender fires
    ///
    /// Dropping the sender releases the submission as well.
    pub fn gate<S: Into<String>>(&self, file_name: S) -> oneshot::Sender<()> {
        let (release, wait) = oneshot::channel();
        self.lock_script().gates.insert(file_name.into(), wait);
        release
    }

    /// File names in the order their submissions started
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RemovalClient for MockRemovalClient {
    async fn submit(&self, request: ProcessingRequest) -> Result<ProcessedResult> {
        let (outcome, gate) = {
            let mut script = self.lock_script();
            let gate = script.gates.remove(request.file_name());
            (script.outcomes.get(request.file_name()).cloned(), gate)
        };
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.file_name().to_string());

        if let Some(wait) = gate {
            // A dropped sender releases the gate too
            let _ = wait.await;
        }

        let (file_name, bytes) = request.into_parts();
        match outcome {
            Some(MockOutcome::Fail(message)) => Err(BgRemovalError::transfer_error_with_context(
                &file_name,
                "mock://remove-background",
                &message,
            )),
            Some(MockOutcome::Succeed(png)) => {
                Ok(ProcessedResult::new(file_name, ImagePayload::png(&png)))
            },
            None => Ok(ProcessedResult::new(file_name, ImagePayload::png(&bytes))),
        }
    }

    fn describe(&self) -> String {
        "mock://remove-background".to_string()
    }
}
