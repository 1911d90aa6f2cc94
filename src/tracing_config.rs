//! Tracing configuration for structured logging
//!
//! The library only emits events and spans; subscribers are installed by the
//! application (the CLI) through `TracingConfig::init`.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors and emojis (default for CLI)
    Console,
    /// Compact output without colors for CI environments
    Compact,
    /// JSON structured logging
    Json,
}

/// Configuration for tracing output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracingOutput {
    /// Output to stderr (default)
    Console,
    /// Output to a file only, leaving the terminal to the gallery
    File(std::path::PathBuf),
}

/// Keeps the non-blocking file writer alive; logs are flushed on drop
#[cfg(feature = "cli")]
#[derive(Default)]
pub struct TracingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    pub format: TracingFormat,
    pub output: TracingOutput,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            output: TracingOutput::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    ///
    /// HTTP internals stay at `warn` until `-vv` so uploads do not drown the
    /// gallery output.
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info,hyper=warn,reqwest=warn",
            1 => "debug,hyper=warn,reqwest=warn",
            _ => "trace",
        }
    }

    /// Filter directives in effect: the explicit filter, else the verbosity
    #[must_use]
    pub fn filter_directives(&self) -> &str {
        self.env_filter
            .as_deref()
            .unwrap_or_else(|| self.verbosity_to_filter())
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - Invalid filter directive
    /// - A global subscriber is already installed
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<TracingGuard> {
        use tracing_subscriber::fmt;

        let filter = EnvFilter::try_new(self.filter_directives())?;
        let registry = Registry::default().with(filter);
        let mut guard = TracingGuard::default();

        match (self.format, &self.output) {
            (TracingFormat::Console, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },

            (TracingFormat::Compact, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },

            (TracingFormat::Json, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true);
                registry.with(fmt_layer).try_init()?;
            },

            (TracingFormat::Json, TracingOutput::File(path)) => {
                let (file_writer, file_guard) = file_writer(path);
                guard._file_guard = Some(file_guard);
                let fmt_layer = fmt::layer()
                    .json()
                    .with_writer(file_writer)
                    .with_current_span(true)
                    .with_span_list(true);
                registry.with(fmt_layer).try_init()?;
            },

            (_, TracingOutput::File(path)) => {
                let (file_writer, file_guard) = file_writer(path);
                guard._file_guard = Some(file_guard);
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "🚀 Gallery session started");
        }

        Ok(guard)
    }
}

#[cfg(feature = "cli")]
fn file_writer(
    path: &std::path::Path,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    let appender = tracing_appender::rolling::never(
        path.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new(".")),
        path.file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("bgremove-gallery.log")),
    );
    tracing_appender::non_blocking(appender)
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span for one whole gallery session
    pub fn session(session_id: &str, endpoint: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "session",
            session_id = %session_id,
            endpoint = %endpoint
        )
    }

    /// Span for one submitted batch
    pub fn batch(file_count: usize) -> Span {
        tracing::span!(Level::INFO, "batch", file_count = %file_count)
    }

    /// Span for one file's round trip to the removal service
    pub fn upload(file_name: &str, bytes: usize) -> Span {
        tracing::span!(
            Level::DEBUG,
            "upload",
            file_name = %file_name,
            bytes = %bytes
        )
    }

    /// Span for flattening one result
    pub fn compose(file_name: &str, background: &str) -> Span {
        tracing::span!(
            Level::DEBUG,
            "compose",
            file_name = %file_name,
            background = %background
        )
    }

    /// Span for a download or clipboard action
    pub fn export(action: &str, file_name: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "export",
            action = %action,
            file_name = %file_name
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, error, info, warn};

    /// Log a user-facing progress update
    pub fn progress(message: &str, emoji: &str) {
        info!("{} {}", emoji, message);
    }

    /// Log an error with context
    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!(error = %error, context = %context, "❌ Operation failed");
    }

    /// Log a warning with recommendation
    pub fn warning_with_recommendation(message: &str, recommendation: &str) {
        warn!(
            message = %message,
            recommendation = %recommendation,
            "⚠️  Warning"
        );
    }

    /// Log how long an operation took
    pub fn performance_metric(operation: &str, duration_ms: u64) {
        debug!(
            operation = %operation,
            duration_ms = %duration_ms,
            "⏱️  Performance metric"
        );
    }

    /// Log upload progress for one file
    pub fn upload_progress(file_name: &str, sent: u64, total: u64, percent: u8) {
        debug!(
            file_name = %file_name,
            sent = %sent,
            total = %total,
            progress_percent = %percent,
            "📤 Upload progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert!(TracingConfig::new()
            .with_verbosity(0)
            .verbosity_to_filter()
            .starts_with("info"));
        assert!(TracingConfig::new()
            .with_verbosity(1)
            .verbosity_to_filter()
            .starts_with("debug"));
        assert_eq!(TracingConfig::new().with_verbosity(2).verbosity_to_filter(), "trace");
        assert_eq!(TracingConfig::new().with_verbosity(9).verbosity_to_filter(), "trace");
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::new()
            .with_verbosity(2)
            .with_format(TracingFormat::Compact)
            .with_env_filter("bgremove_gallery=debug")
            .with_session_id("test-session");

        assert_eq!(config.verbosity, 2);
        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.env_filter.as_deref(), Some("bgremove_gallery=debug"));
        assert_eq!(config.session_id.as_deref(), Some("test-session"));
    }

    #[test]
    fn test_explicit_filter_wins_over_verbosity() {
        let config = TracingConfig::new().with_verbosity(2);
        assert_eq!(config.filter_directives(), "trace");

        let config = config.with_env_filter("bgremove_gallery=debug,reqwest=info");
        assert_eq!(config.filter_directives(), "bgremove_gallery=debug,reqwest=info");
    }

    #[test]
    fn test_file_output() {
        let config = TracingConfig::new()
            .with_format(TracingFormat::Json)
            .with_output(TracingOutput::File("logs/gallery.log".into()));
        assert_eq!(
            config.output,
            TracingOutput::File(std::path::PathBuf::from("logs/gallery.log"))
        );
        assert_eq!(config.format, TracingFormat::Json);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_file_writer_creates_log_in_parent_dir() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.log");
        {
            let (mut writer, _guard) = file_writer(&path);
            writer.write_all(b"hello\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.verbosity, 0);
        assert_eq!(config.format, TracingFormat::Console);
        assert_eq!(config.output, TracingOutput::Console);
        assert!(config.env_filter.is_none());
    }
}
