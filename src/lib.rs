#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Background Removal Gallery
//!
//! Client-side pipeline for a remote background removal service: upload a
//! batch of images, collect the processed results in completion order,
//! browse them through a filtered/sorted/grouped gallery view and export any
//! result flattened over a chosen background colour.
//!
//! ## Features
//!
//! - **Concurrent Uploads**: every file of a batch is in flight at once, with
//!   an optional concurrency limit
//! - **Pending Tracking**: a pending count that rises by the batch size and
//!   falls once per completed file, updated atomically with the result list
//! - **Per-file Notifications**: success/failure notifications for a
//!   presentation layer; a failed file never stops the batch
//! - **Compositing**: flatten a result over a solid or transparent background
//!   without resizing
//! - **Gallery Projection**: pure search, sort and date grouping
//! - **Export**: download to disk or copy to the clipboard with a text
//!   fallback
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_gallery::{
//!     gallery::{project, ViewState},
//!     BackgroundColor, ClientConfig, ProcessingRequest, Session,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::builder()
//!     .endpoint("http://localhost:5000/api/remove-background")
//!     .build()?;
//! let session = Session::http(&config)?;
//!
//! let summary = session
//!     .process_batch(vec![ProcessingRequest::from_path("cat.jpg").await?])
//!     .await;
//! println!("{} of {} processed", summary.succeeded, summary.submitted);
//!
//! let results = session.results();
//! let view = project(&results, &ViewState::default().with_search("cat"));
//! for result in view.items() {
//!     session.set_background(BackgroundColor::parse("#111827")?);
//!     let artifact = session.compose(result.id())?;
//!     println!("{}x{}", artifact.width(), artifact.height());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bar, tracing subscriber
//!   with console, JSON and file output
//! - `clipboard` (default): system clipboard export through `arboard`
//! - `webp-support` (default): WebP decoding for result payloads

pub mod client;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod payload;
pub mod pipeline;
pub mod services;
pub mod tracing_config;
pub mod types;

// Public API exports
pub use client::{HttpRemovalClient, MockRemovalClient, RemovalClient};
pub use color::{BackgroundColor, PRESET_BACKGROUNDS};
pub use compositor::{compose, compose_payload, decode_dimensions, CompositeArtifact};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{BgRemovalError, Result};
#[cfg(feature = "clipboard")]
pub use export::SystemClipboard;
pub use export::{
    copy_artifact, download_file_name, format_file_size, save_artifact, ClipboardTarget,
    CopyOutcome,
};
pub use gallery::{project, GalleryProjection, GridDensity, Grouping, SortOrder, ViewState};
pub use payload::ImagePayload;
pub use pipeline::{BatchSummary, Session, SessionSnapshot};
pub use services::{
    ChannelNotificationSink, ConsoleProgressReporter, NoOpNotificationSink, NoOpProgressReporter,
    Notification, NotificationSink, ProgressReporter, Severity, UploadProgress,
};
pub use types::{ProcessedResult, ProcessingRequest, ResultId};

pub use tracing_config::{events, spans, TracingConfig, TracingFormat, TracingOutput};
#[cfg(feature = "cli")]
pub use tracing_config::TracingGuard;
