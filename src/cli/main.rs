//! Background Removal Gallery CLI
//!
//! Uploads a batch of images, prints the resulting gallery and exports every
//! listed result over the chosen background colour.

use super::config::CliConfigBuilder;
use crate::{
    client::HttpRemovalClient,
    color::PRESET_BACKGROUNDS,
    compositor::decode_dimensions,
    export::{format_file_size, save_artifact},
    gallery::{display_timestamp, project, GalleryProjection},
    pipeline::Session,
    services::{ConsoleProgressReporter, Notification, NotificationSink},
    tracing_config::{events, spans},
    types::{ProcessedResult, ProcessingRequest},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif"];

/// Background removal gallery CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove-gallery")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image files or directories
    #[arg(value_name = "INPUT", required_unless_present = "list_presets")]
    pub input: Vec<String>,

    /// Directory processed images are saved to [default: the user's download directory]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Remote background removal endpoint
    #[arg(short, long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum uploads in flight at once [default: all files]
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// JSON client configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Background colour for exports (#RGB, #RRGGBB, #RRGGBBAA or "transparent")
    #[arg(short, long, value_name = "COLOR")]
    pub background: Option<String>,

    /// Only list results whose file name or completion time contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort results by completion time
    #[arg(long, value_enum, default_value_t = CliSortOrder::Asc)]
    pub sort: CliSortOrder,

    /// Group results by completion date
    #[arg(long)]
    pub group_by_date: bool,

    /// Gallery grid density
    #[arg(long, value_enum, default_value_t = CliDensity::Comfortable)]
    pub density: CliDensity,

    /// Copy the newest listed result to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// List the preset background colours and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Write logs to this file instead of the terminal
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter directives; overrides -v (e.g. "bgremove_gallery=debug")
    #[arg(long, env = "RUST_LOG", value_name = "DIRECTIVES")]
    pub log_filter: Option<String>,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Pattern for directory inputs (e.g., "*.jpg")
    #[arg(long)]
    pub pattern: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliSortOrder {
    Asc,
    Desc,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliDensity {
    Compact,
    Comfortable,
    Spacious,
}

/// Advances the progress bar once per settled file
struct ProgressBarSink {
    bar: ProgressBar,
}

impl NotificationSink for ProgressBarSink {
    fn notify(&self, notification: Notification) {
        if notification.is_error() {
            self.bar.println(format!(
                "❌ {}: {}",
                notification.title, notification.description
            ));
        } else {
            self.bar.set_message(notification.description);
        }
        self.bar.inc(1);
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = uuid::Uuid::new_v4().to_string();
    let _tracing_guard = CliConfigBuilder::tracing_config(&cli, &session_id)
        .init()
        .context("Failed to initialize tracing")?;

    if cli.list_presets {
        list_presets();
        return Ok(());
    }

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;
    let view = CliConfigBuilder::view_state(&cli);

    events::progress("Starting background removal gallery", "🚀");
    info!("Endpoint: {}", config.endpoint);

    let files = collect_inputs(&cli)?;
    if files.is_empty() {
        warn!("No supported image files found in the provided inputs");
        return Ok(());
    }
    info!("Found {} image file(s) to process", files.len());

    let mut requests = Vec::with_capacity(files.len());
    for path in &files {
        requests.push(
            ProcessingRequest::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        );
    }

    let bar = ProgressBar::new(requests.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let client = HttpRemovalClient::new(&config)
        .context("Failed to create HTTP client")?
        .with_progress_reporter(Arc::new(ConsoleProgressReporter::new(cli.verbose > 0)));
    let session = Session::with_sink(
        Arc::new(client),
        Arc::new(ProgressBarSink { bar: bar.clone() }),
        &config,
    );

    let start_time = Instant::now();
    let summary = session
        .process_batch(requests)
        .instrument(spans::session(&session_id, &config.endpoint))
        .await;
    bar.finish_and_clear();

    events::performance_metric("batch", start_time.elapsed().as_millis() as u64);
    events::progress(
        &format!(
            "Processed {}/{} image(s) in {:.2}s",
            summary.succeeded,
            summary.submitted,
            start_time.elapsed().as_secs_f64()
        ),
        "📊",
    );
    for failed in &summary.failed_files {
        warn!("Failed: {}", failed);
    }

    let results = session.results();
    let projection = project(&results, &view).with_placeholders(session.pending_count());
    print_gallery(&projection, &view.utc_offset);

    let output_dir = cli
        .output
        .clone()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    export_results(&session, &projection, &output_dir);

    if cli.copy {
        copy_newest(&session, &projection);
    }

    if summary.submitted > 0 && summary.succeeded == 0 {
        anyhow::bail!("All {} file(s) failed to process", summary.submitted);
    }

    Ok(())
}

fn list_presets() {
    println!("🎨 Preset background colours");
    for hex in PRESET_BACKGROUNDS {
        println!("  • {}", hex);
    }
    println!("  • transparent");
}

/// Resolve file and directory inputs into a sorted list of image files
fn collect_inputs(cli: &Cli) -> Result<Vec<PathBuf>> {
    let mut all_files = Vec::new();

    for input in &cli.input {
        let path = PathBuf::from(input);
        if path.is_file() {
            if is_image_file(&path) {
                all_files.push(path);
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            all_files.extend(find_image_files(&path, cli.recursive, cli.pattern.as_deref())?);
        } else {
            anyhow::bail!(
                "Input path does not exist or is not accessible: {}",
                path.display()
            );
        }
    }

    all_files.sort();
    all_files.dedup();
    Ok(all_files)
}

/// Find image files in a directory
fn find_image_files(dir: &Path, recursive: bool, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry?;
            if entry.file_type().is_file() {
                let path = entry.path();
                if is_image_file(path) && matches_pattern(path, pattern) {
                    files.push(path.to_path_buf());
                }
            }
        }
    } else {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                if is_image_file(&path) && matches_pattern(&path, pattern) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn matches_pattern(path: &Path, pattern: Option<&str>) -> bool {
    match pattern {
        Some(pat) => path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|filename| {
                glob::Pattern::new(pat)
                    .map(|p| p.matches(filename))
                    .unwrap_or(false)
            }),
        None => true,
    }
}

fn print_gallery(projection: &GalleryProjection<'_>, offset: &chrono::FixedOffset) {
    if projection.is_empty() {
        println!("🖼️  No results to show");
        return;
    }

    println!(
        "🖼️  Gallery: {} result(s), {} column(s)",
        projection.len(),
        projection.columns
    );
    if projection.placeholders > 0 {
        println!("⏳ {} file(s) still processing", projection.placeholders);
    }
    for group in &projection.groups {
        if let Some(label) = &group.label {
            println!("📅 {}", label);
        }
        for result in &group.items {
            println!("  {}", describe_result(result, offset));
        }
    }
}

fn describe_result(result: &ProcessedResult, offset: &chrono::FixedOffset) -> String {
    let dimensions = decode_dimensions(result.payload())
        .map_or_else(|_| "?".to_string(), |(w, h)| format!("{}x{}", w, h));
    format!(
        "{}  {}  {}  {}",
        result.file_name(),
        display_timestamp(result.completed_at(), *offset),
        dimensions,
        format_file_size(result.payload().decoded_len() as u64)
    )
}

/// Save every listed result; one failed export does not stop the others
fn export_results(session: &Session, projection: &GalleryProjection<'_>, output_dir: &Path) {
    for result in projection.items() {
        let _span = spans::export("download", result.file_name()).entered();
        let saved = session
            .compose(result.id())
            .and_then(|artifact| save_artifact(&artifact, result, output_dir));
        match saved {
            Ok(path) => println!("💾 {} → {}", result.file_name(), path.display()),
            Err(e) => events::error_with_context(&e, result.file_name()),
        }
    }
}

#[cfg(feature = "clipboard")]
fn copy_newest(session: &Session, projection: &GalleryProjection<'_>) {
    use crate::export::{copy_artifact, CopyOutcome, SystemClipboard};

    let Some(newest) = projection.items().max_by_key(|r| r.completed_at()) else {
        events::warning_with_recommendation("Nothing to copy", "Process at least one image");
        return;
    };
    let _span = spans::export("copy", newest.file_name()).entered();

    let copied = session.compose(newest.id()).and_then(|artifact| {
        let mut clipboard = SystemClipboard::new()?;
        copy_artifact(&mut clipboard, &artifact)
    });
    match copied {
        Ok(CopyOutcome::Image) => println!("📋 Copied {} to the clipboard", newest.file_name()),
        Ok(CopyOutcome::TextFallback) => println!(
            "📋 Copied {} to the clipboard as a data URI",
            newest.file_name()
        ),
        Err(e) => events::error_with_context(&e, "copy to clipboard"),
    }
}

#[cfg(not(feature = "clipboard"))]
fn copy_newest(_session: &Session, _projection: &GalleryProjection<'_>) {
    events::warning_with_recommendation(
        "Clipboard support is not compiled in",
        "Rebuild with --features clipboard",
    );
}
