//! Structured logging infrastructure for watchstat

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use serde::{Deserialize, Serialize};

use crate::{Result, WatchstatError};

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, colored output for interactive use
    #[default]
    Pretty,
    /// Single-line output
    Compact,
    /// Newline-delimited JSON
    Json,
}

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "watchstat_analytics=trace")
    pub level: String,
    /// Line format
    pub format: LogFormat,
    /// Optional file path for log output
    pub file_path: Option<String>,
    /// Whether to include span open/close events in the output
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file_path: None,
            include_spans: false,
            include_targets: true,
        }
    }
}

/// Build the filter: `RUST_LOG` wins over the configured level.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log_file(path: &str) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| WatchstatError::config_with_source(format!("Cannot open log file {}", path), e))
}

/// Initialize the tracing subscriber with the given configuration
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = build_filter(&config.level);

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let outcome = match (config.format, config.file_path.as_deref()) {
        (LogFormat::Json, Some(path)) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_target(config.include_targets)
                .with_writer(file);
            registry.with(layer).try_init()
        }
        (LogFormat::Json, None) => {
            let layer = fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_target(config.include_targets);
            registry.with(layer).try_init()
        }
        (LogFormat::Pretty, Some(path)) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_span_events(span_events)
                .with_target(config.include_targets)
                .with_writer(file);
            registry.with(layer).try_init()
        }
        (LogFormat::Pretty, None) => {
            let layer = fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_target(config.include_targets);
            registry.with(layer).try_init()
        }
        (LogFormat::Compact, Some(path)) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .compact()
                .with_ansi(false)
                .with_span_events(span_events)
                .with_target(config.include_targets)
                .with_writer(file);
            registry.with(layer).try_init()
        }
        (LogFormat::Compact, None) => {
            let layer = fmt::layer()
                .compact()
                .with_span_events(span_events)
                .with_target(config.include_targets);
            registry.with(layer).try_init()
        }
    };

    outcome.map_err(|e| WatchstatError::config(format!("Logging already initialized: {}", e)))
}

/// Initialize logging with default configuration
pub fn init_default_logging() -> Result<()> {
    init_logging(LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_path.is_none());
        assert!(!config.include_spans);
        assert!(config.include_targets);
    }

    #[test]
    fn test_unwritable_log_file_is_config_error() {
        let result = open_log_file("/nonexistent-dir/watchstat/app.log");
        assert!(matches!(result, Err(WatchstatError::Config { .. })));
    }
}
