//! Upload/result pipeline
//!
//! A `Session` owns the pending counter, the ordered result list and the
//! chosen background colour. `process_batch` starts one task per file and
//! each task folds its own completion into the session as it settles, so the
//! result list is in completion order and a dispatched file always settles,
//! even when the caller stops waiting for the batch.

use crate::client::{HttpRemovalClient, RemovalClient};
use crate::color::BackgroundColor;
use crate::compositor::{self, CompositeArtifact};
use crate::config::ClientConfig;
use crate::error::{BgRemovalError, Result};
use crate::services::{NoOpNotificationSink, Notification, NotificationSink};
use crate::tracing_config::spans;
use crate::types::{ProcessedResult, ProcessingRequest, ResultId};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use instant::Instant;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn, Instrument};

/// Outcome counts for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Names of the files that failed, in completion order
    pub failed_files: Vec<String>,
}

/// Consistent view of pending count and results taken under one lock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub pending: usize,
    pub results: Vec<ProcessedResult>,
}

#[derive(Default)]
struct SessionState {
    pending: usize,
    results: Vec<ProcessedResult>,
    background: BackgroundColor,
}

struct SessionInner {
    client: Arc<dyn RemovalClient>,
    notifier: Arc<dyn NotificationSink>,
    max_concurrency: Option<usize>,
    state: Mutex<SessionState>,
}

/// How one file settled
struct FileOutcome {
    file_name: String,
    succeeded: bool,
}

/// One gallery session; cheap to clone, clones share state
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session around an existing client
    #[must_use]
    pub fn new(client: Arc<dyn RemovalClient>, config: &ClientConfig) -> Self {
        Self::with_sink(client, Arc::new(NoOpNotificationSink), config)
    }

    /// Create a session that sends per-file notifications to `notifier`
    #[must_use]
    pub fn with_sink(
        client: Arc<dyn RemovalClient>,
        notifier: Arc<dyn NotificationSink>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                client,
                notifier,
                max_concurrency: config.max_concurrency,
                state: Mutex::new(SessionState {
                    background: config.default_background,
                    ..SessionState::default()
                }),
            }),
        }
    }

    /// Create a session talking to the configured HTTP endpoint
    pub fn http(config: &ClientConfig) -> Result<Self> {
        let client = HttpRemovalClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Process a batch of files
    ///
    /// The pending count grows by the batch size before any file is
    /// dispatched. Each success appends one result and each failure only
    /// emits an error notification; either way the pending count drops by
    /// one in the same critical section. Failures never stop the batch.
    ///
    /// Every file runs on its own task, so dropping the returned future
    /// stops the summary but not the uploads: their results still land in
    /// the session and the pending count still returns to zero.
    pub async fn process_batch(&self, requests: Vec<ProcessingRequest>) -> BatchSummary {
        let span = spans::batch(requests.len());
        self.dispatch(requests).instrument(span).await
    }

    async fn dispatch(&self, requests: Vec<ProcessingRequest>) -> BatchSummary {
        let submitted = requests.len();
        let mut summary = BatchSummary {
            submitted,
            ..BatchSummary::default()
        };
        if submitted == 0 {
            return summary;
        }

        self.lock_state().pending += submitted;

        let permits = self
            .inner
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let batch_start = Instant::now();
        info!(
            files = submitted,
            concurrency = self.inner.max_concurrency.unwrap_or(submitted),
            target = %self.inner.client.describe(),
            "📤 Dispatching batch"
        );

        let mut tasks: FuturesUnordered<_> = requests
            .into_iter()
            .map(|request| {
                let span = spans::upload(request.file_name(), request.len());
                tokio::spawn(self.clone().run_file(request, permits.clone()).instrument(span))
            })
            .collect();

        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(outcome) if outcome.succeeded => summary.succeeded += 1,
                Ok(outcome) => {
                    summary.failed += 1;
                    summary.failed_files.push(outcome.file_name);
                },
                Err(e) => {
                    // Only runtime shutdown cancels a file task
                    warn!(error = %e, "Upload task cancelled before it settled");
                    summary.failed += 1;
                },
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = batch_start.elapsed().as_millis() as u64,
            "📊 Batch finished"
        );
        summary
    }

    async fn run_file(
        self,
        request: ProcessingRequest,
        permits: Option<Arc<Semaphore>>,
    ) -> FileOutcome {
        // Held until the completion is recorded
        let _permit = match permits {
            Some(permits) => permits.acquire_owned().await.ok(),
            None => None,
        };

        let file_name = request.file_name().to_string();
        let outcome = AssertUnwindSafe(self.inner.client.submit(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(BgRemovalError::internal(format!(
                    "Removal client panicked while processing {}",
                    file_name
                )))
            });
        let succeeded = self.complete(&file_name, outcome);
        FileOutcome {
            file_name,
            succeeded,
        }
    }

    fn complete(&self, file_name: &str, outcome: Result<ProcessedResult>) -> bool {
        let (notification, succeeded) = {
            let mut state = self.lock_state();
            state.pending = state.pending.saturating_sub(1);
            match outcome {
                Ok(result) => {
                    debug!(file = %file_name, id = %result.id(), pending = state.pending, "Result appended");
                    state.results.push(result);
                    (Notification::processed(file_name), true)
                },
                Err(e) => {
                    warn!(file = %file_name, error = %e, pending = state.pending, "File failed");
                    (Notification::failed(file_name, &e.to_string()), false)
                },
            }
        };
        self.inner.notifier.notify(notification);
        succeeded
    }

    /// Files currently in flight
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock_state().pending
    }

    /// Copy of the result list in completion order
    #[must_use]
    pub fn results(&self) -> Vec<ProcessedResult> {
        self.lock_state().results.clone()
    }

    /// Look up one result by id
    #[must_use]
    pub fn result(&self, id: ResultId) -> Option<ProcessedResult> {
        self.lock_state()
            .results
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Pending count and results read together
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            pending: state.pending,
            results: state.results.clone(),
        }
    }

    /// Remove all results from the gallery; in-flight files are unaffected
    pub fn clear_results(&self) {
        self.lock_state().results.clear();
    }

    #[must_use]
    pub fn background(&self) -> BackgroundColor {
        self.lock_state().background
    }

    pub fn set_background(&self, color: BackgroundColor) {
        self.lock_state().background = color;
    }

    /// Flatten one result over the session's current background colour
    ///
    /// # Errors
    /// - No result with this id
    /// - `BgRemovalError::Decode` when the payload is not a decodable image
    pub fn compose(&self, id: ResultId) -> Result<CompositeArtifact> {
        let (result, background) = {
            let state = self.lock_state();
            let result = state
                .results
                .iter()
                .find(|r| r.id() == id)
                .cloned()
                .ok_or_else(|| BgRemovalError::internal(format!("No result with id {}", id)))?;
            (result, state.background)
        };
        compositor::compose(&result, background)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
