//! Configuration loading utilities

use std::{env, path::Path, str::FromStr};

use thiserror::Error;
use tracing::debug;
use watchstat_common::{Result as WatchstatResult, WatchstatError};

use crate::Config;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "WATCHSTAT_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for WatchstatError {
    fn from(err: ConfigError) -> Self {
        WatchstatError::config(err.to_string())
    }
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse_yaml(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        debug!(path = %path.as_ref().display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse YAML without applying overrides or validation
    pub fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
        // An empty file is a valid, all-defaults configuration
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from environment variables and files
    pub fn load() -> WatchstatResult<Config> {
        let config = if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::load_config(&config_path)?
        } else if Path::new("watchstat.yaml").exists() {
            Self::load_config("watchstat.yaml")?
        } else if Path::new("watchstat.yml").exists() {
            Self::load_config("watchstat.yml")?
        } else {
            debug!("No configuration file found, using defaults");
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate_all().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> WatchstatResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply process environment overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| env::var(var).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Export overrides
        if let Some(path) = lookup("WATCHSTAT_EXPORT") {
            config.export.path = path;
        }

        if let Some(dir) = lookup("WATCHSTAT_OUTPUT_DIR") {
            config.export.output_dir = dir;
        }

        // Catalog overrides
        if let Some(api_key) = lookup("TMDB_API_KEY") {
            config.catalog.api_key = Some(api_key);
        }

        if let Some(url) = lookup("TMDB_URL") {
            config.catalog.base_url = url;
        }

        if let Some(timeout) = lookup("TMDB_TIMEOUT") {
            config.catalog.timeout_seconds = parse_var("TMDB_TIMEOUT", &timeout)?;
        }

        // Analysis overrides
        if let Some(threshold) = lookup("MIN_PERCENT_WATCHED") {
            config.analysis.min_percent_watched = parse_var("MIN_PERCENT_WATCHED", &threshold)?;
        }

        if let Some(top_n) = lookup("TOP_N") {
            config.analysis.top_n = parse_var("TOP_N", &top_n)?;
        }

        if let Some(timezone) = lookup("ANALYSIS_TIMEZONE") {
            config.analysis.timezone = Some(timezone);
        }

        // Logging overrides
        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(file) = lookup("LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, io::Write};
    use tempfile::NamedTempFile;

    fn create_test_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_valid_yaml() {
        let yaml = "export:\n  path: \"takeout.zip\"\nanalysis:\n  top_n: 3\n  min_watched_seconds: 120\n";
        let config = ConfigLoader::parse_yaml(yaml).expect("Failed to parse config");

        assert_eq!(config.export.path, "takeout.zip");
        assert_eq!(config.analysis.top_n, 3);
        assert_eq!(config.analysis.min_watched_seconds, 120);
        assert_eq!(config.analysis.min_percent_watched, 80);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ConfigLoader::parse_yaml("  \n").expect("Empty config should parse");
        assert_eq!(config.export.path, "Files");
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ConfigLoader::parse_yaml("analysis:\n  top_n: [unclosed array");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_error() {
        let file = create_test_config_file("charts:\n  width: 10\n");
        let result = ConfigLoader::load_config(file.path());

        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_config("/nonexistent/path/watchstat.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("WATCHSTAT_EXPORT", "netflix-report.zip"),
            ("WATCHSTAT_OUTPUT_DIR", "out"),
            ("TMDB_API_KEY", "secret"),
            ("TMDB_URL", "http://localhost:9000/3"),
            ("TMDB_TIMEOUT", "5"),
            ("MIN_PERCENT_WATCHED", "90"),
            ("TOP_N", "25"),
            ("ANALYSIS_TIMEZONE", "Europe/Stockholm"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FILE", "run.log"),
        ]);

        ConfigLoader::apply_overrides(&mut config, lookup).expect("Overrides should apply");

        assert_eq!(config.export.path, "netflix-report.zip");
        assert_eq!(config.export.output_dir, "out");
        assert_eq!(config.catalog.api_key.as_deref(), Some("secret"));
        assert_eq!(config.catalog.base_url, "http://localhost:9000/3");
        assert_eq!(config.catalog.timeout_seconds, 5);
        assert_eq!(config.analysis.min_percent_watched, 90);
        assert_eq!(config.analysis.top_n, 25);
        assert_eq!(config.analysis.timezone.as_deref(), Some("Europe/Stockholm"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("run.log"));
        assert!(config.catalog.is_active());
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_override_parse_error_names_variable() {
        let mut config = Config::default();
        let lookup = lookup_from(&[("TOP_N", "lots")]);

        let err = ConfigLoader::apply_overrides(&mut config, lookup).unwrap_err();
        match err {
            ConfigError::EnvParseError { var, .. } => assert_eq!(var, "TOP_N"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_overrides_keeps_values() {
        let mut config = Config::default();
        ConfigLoader::apply_overrides(&mut config, |_| None).unwrap();
        assert_eq!(config.export.path, "Files");
        assert!(config.catalog.api_key.is_none());
    }

    #[test]
    fn test_config_error_converts_to_watchstat_error() {
        let err: WatchstatError = ConfigLoader::parse_yaml("analysis: [").unwrap_err().into();
        assert!(matches!(err, WatchstatError::Config { .. }));
    }
}
