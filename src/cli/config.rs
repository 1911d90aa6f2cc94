//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliDensity, CliLogFormat, CliSortOrder};
use crate::{
    color::BackgroundColor,
    config::ClientConfig,
    gallery::{GridDensity, Grouping, SortOrder, ViewState},
    tracing_config::{TracingConfig, TracingFormat, TracingOutput},
};
use anyhow::{Context, Result};

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the client configuration
    ///
    /// Starts from `--config` when given, then applies explicit flags on top.
    pub(crate) fn from_cli(cli: &Cli) -> Result<ClientConfig> {
        let base = match &cli.config {
            Some(path) => ClientConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => ClientConfig::default(),
        };

        let mut builder = ClientConfig::builder()
            .endpoint(cli.endpoint.clone().unwrap_or(base.endpoint))
            .upload_field(base.upload_field)
            .timeout_secs(cli.timeout.unwrap_or(base.timeout_secs))
            .max_concurrency(cli.max_concurrency.or(base.max_concurrency))
            .upload_chunk_size(base.upload_chunk_size)
            .default_background(base.default_background);

        if let Some(background) = &cli.background {
            let color = BackgroundColor::parse(background).context("Invalid --background")?;
            builder = builder.default_background(color);
        }

        builder.build().context("Invalid configuration")
    }

    /// Build the gallery view from the view flags
    pub(crate) fn view_state(cli: &Cli) -> ViewState {
        let sort_order = match cli.sort {
            CliSortOrder::Asc => SortOrder::Ascending,
            CliSortOrder::Desc => SortOrder::Descending,
        };
        let density = match cli.density {
            CliDensity::Compact => GridDensity::Compact,
            CliDensity::Comfortable => GridDensity::Comfortable,
            CliDensity::Spacious => GridDensity::Spacious,
        };
        let grouping = if cli.group_by_date {
            Grouping::ByDate
        } else {
            Grouping::None
        };

        ViewState::default()
            .with_search(cli.search.clone().unwrap_or_default())
            .with_sort_order(sort_order)
            .with_grouping(grouping)
            .with_density(density)
            .with_utc_offset(*chrono::Local::now().offset())
    }

    /// Build the tracing configuration from the logging flags
    pub(crate) fn tracing_config(cli: &Cli, session_id: &str) -> TracingConfig {
        let format = match cli.log_format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            CliLogFormat::Json => TracingFormat::Json,
        };
        let output = cli
            .log_file
            .clone()
            .map_or(TracingOutput::Console, TracingOutput::File);

        let mut config = TracingConfig::new()
            .with_verbosity(cli.verbose)
            .with_format(format)
            .with_output(output)
            .with_session_id(session_id);
        if let Some(filter) = cli.log_filter.as_deref().filter(|f| !f.trim().is_empty()) {
            config = config.with_env_filter(filter);
        }
        config
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if cli.input.is_empty() {
            anyhow::bail!("At least one input is required");
        }
        if let Some(pattern) = &cli.pattern {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid --pattern '{}'", pattern))?;
        }
        if cli.max_concurrency == Some(0) {
            anyhow::bail!("--max-concurrency must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ENDPOINT;
    use std::io::Write;

    fn create_test_cli() -> Cli {
        Cli {
            input: vec!["cat.jpg".to_string()],
            output: None,
            endpoint: None,
            timeout: None,
            max_concurrency: None,
            config: None,
            background: None,
            search: None,
            sort: CliSortOrder::Asc,
            group_by_date: false,
            density: CliDensity::Comfortable,
            copy: false,
            list_presets: false,
            verbose: 0,
            log_format: CliLogFormat::Console,
            log_file: None,
            log_filter: None,
            recursive: false,
            pattern: None,
        }
    }

    #[test]
    fn test_cli_config_defaults() {
        let config = CliConfigBuilder::from_cli(&create_test_cli()).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_concurrency, None);
        assert_eq!(config.default_background, BackgroundColor::Transparent);
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{"endpoint": "https://example.com/remove", "timeout_secs": 10, "default_background": "#000000"}}"##
        )
        .unwrap();

        let mut cli = create_test_cli();
        cli.config = Some(file.path().to_path_buf());
        cli.timeout = Some(30);
        cli.background = Some("#fff".to_string());

        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.endpoint, "https://example.com/remove");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_background, BackgroundColor::rgb(255, 255, 255));
    }

    #[test]
    fn test_invalid_background_rejected() {
        let mut cli = create_test_cli();
        cli.background = Some("not-a-colour".to_string());
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }

    #[test]
    fn test_view_state_from_flags() {
        let mut cli = create_test_cli();
        cli.search = Some("cat".to_string());
        cli.sort = CliSortOrder::Desc;
        cli.group_by_date = true;
        cli.density = CliDensity::Compact;

        let view = CliConfigBuilder::view_state(&cli);
        assert_eq!(view.search_term, "cat");
        assert_eq!(view.sort_order, SortOrder::Descending);
        assert_eq!(view.grouping, Grouping::ByDate);
        assert_eq!(view.density, GridDensity::Compact);
    }

    #[test]
    fn test_tracing_config_from_flags() {
        let mut cli = create_test_cli();
        cli.verbose = 1;
        let config = CliConfigBuilder::tracing_config(&cli, "session-1");
        assert_eq!(config.format, TracingFormat::Console);
        assert_eq!(config.output, TracingOutput::Console);
        assert_eq!(config.filter_directives(), config.verbosity_to_filter());
        assert_eq!(config.session_id.as_deref(), Some("session-1"));

        cli.log_format = CliLogFormat::Json;
        cli.log_file = Some("logs/run.log".into());
        cli.log_filter = Some("bgremove_gallery=trace".to_string());
        let config = CliConfigBuilder::tracing_config(&cli, "session-2");
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.output, TracingOutput::File("logs/run.log".into()));
        assert_eq!(config.filter_directives(), "bgremove_gallery=trace");

        cli.log_filter = Some("  ".to_string());
        let config = CliConfigBuilder::tracing_config(&cli, "session-3");
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn test_cli_validation() {
        let mut cli = create_test_cli();
        assert!(CliConfigBuilder::validate_cli(&cli).is_ok());

        cli.pattern = Some("[".to_string());
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());

        cli.pattern = None;
        cli.max_concurrency = Some(0);
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());

        cli.max_concurrency = None;
        cli.input.clear();
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());
    }
}
