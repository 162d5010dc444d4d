//! Application configuration structures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;
use watchstat_common::{ClassifierMode, LogFormat};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Where the export is read from and where output goes
    #[validate]
    pub export: ExportConfig,

    /// Pipeline thresholds and options
    #[validate]
    pub analysis: AnalysisConfig,

    /// Movie metadata catalog
    #[validate]
    pub catalog: CatalogConfig,

    /// Chart rendering settings
    #[validate]
    pub charts: ChartsConfig,

    /// Logging configuration
    #[validate]
    pub logging: LoggingConfig,
}

/// Export intake configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExportConfig {
    /// Export directory or `.zip` archive
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Invalid export path"))]
    pub path: String,

    /// Directory receiving `report.json` and chart images
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Invalid output directory"))]
    pub output_dir: String,

    /// Replacement for the bundled ISO-3166 table
    pub country_codes: Option<String>,
}

/// Analysis pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sessions must be watched strictly longer than this
    #[validate(range(max = 3600, message = "Minimum watched seconds cannot exceed one hour"))]
    pub min_watched_seconds: u64,

    /// Bucketed completion a record needs to count as substantially watched
    #[validate(range(max = 1000, message = "Minimum percent watched cannot exceed 1000"))]
    pub min_percent_watched: u32,

    /// Number of rows kept in the title ranking
    #[validate(range(min = 1, max = 100, message = "Top N must be between 1 and 100"))]
    pub top_n: usize,

    /// Series detection mode
    pub classifier: ClassifierMode,

    /// IANA timezone for the activity heatmap, UTC when unset
    pub timezone: Option<String>,
}

/// Metadata catalog (TMDB) configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CatalogConfig {
    /// Set to false to skip enrichment even with an API key
    pub enabled: bool,

    /// TMDB API key; enrichment is skipped without one
    pub api_key: Option<String>,

    /// API base URL
    #[validate(url(message = "Catalog base URL must be a valid URL"))]
    pub base_url: String,

    /// Search language
    #[validate(length(min = 2, message = "Language cannot be empty"))]
    pub language: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Retries for failed requests
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: u32,

    /// Client-side rate limit
    #[validate(range(min = 1, max = 50, message = "Requests per second must be between 1 and 50"))]
    pub requests_per_second: u32,

    /// Lookups in flight at once
    #[validate(range(min = 1, max = 64, message = "Concurrent lookups must be between 1 and 64"))]
    pub max_concurrent_lookups: usize,

    /// Cached titles
    #[validate(range(min = 1, message = "Cache capacity must be positive"))]
    pub cache_capacity: u64,

    /// Cache time to live in seconds
    #[validate(range(min = 1, message = "Cache TTL must be positive"))]
    pub cache_ttl_seconds: u64,

    /// Genre id to display name, applied over the built-in table
    pub genre_overrides: BTreeMap<u32, String>,
}

/// Chart rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartsConfig {
    /// Whether charts are rendered at all
    pub enabled: bool,

    /// Image width in pixels
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: u32,

    /// Image height in pixels
    #[validate(range(min = 100, max = 4000, message = "Height must be between 100 and 4000 pixels"))]
    pub height: u32,

    /// Font family for text rendering
    pub font_family: String,

    /// Font size for labels
    #[validate(range(min = 8, max = 72, message = "Font size must be between 8 and 72"))]
    pub font_size: u32,

    /// Color scale and background
    #[validate]
    pub colors: ChartColors,
}

/// Four-stop color scale, dark to bright, plus background and text
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartColors {
    /// Lowest value
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Low color must be valid hex color"))]
    pub low: String,

    /// Second stop
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Mid-low color must be valid hex color"))]
    pub mid_low: String,

    /// Third stop
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Mid-high color must be valid hex color"))]
    pub mid_high: String,

    /// Highest value
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "High color must be valid hex color"))]
    pub high: String,

    /// Background
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be valid hex color"))]
    pub background: String,

    /// Axis and label text
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Text color must be valid hex color"))]
    pub text: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Line format
    pub format: LogFormat,

    /// Optional log file path
    pub file: Option<String>,

    /// Whether to log span open/close events
    pub include_spans: bool,

    /// Whether to include module targets
    pub include_targets: bool,
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.analysis.validate_timezone()?;
        self.catalog.validate_genre_overrides()?;
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: "Files".to_string(),
            output_dir: "output".to_string(),
            country_codes: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_watched_seconds: 60,
            min_percent_watched: 80,
            top_n: 10,
            classifier: ClassifierMode::Token,
            timezone: None,
        }
    }
}

impl AnalysisConfig {
    /// Check the heatmap timezone against the tz database
    pub fn validate_timezone(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();

        if let Some(ref timezone) = self.timezone {
            if let Err(err) = crate::validation::validate_timezone(timezone) {
                errors.add("timezone", err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "en-US".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            requests_per_second: 20,
            max_concurrent_lookups: 8,
            cache_capacity: 10_000,
            cache_ttl_seconds: 3600,
            genre_overrides: BTreeMap::new(),
        }
    }
}

impl CatalogConfig {
    /// Enrichment runs only when enabled and an API key is present
    pub fn is_active(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }

    /// Override names must be single tokens so genre counting stays correct
    pub fn validate_genre_overrides(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();

        for name in self.genre_overrides.values() {
            if let Err(err) = crate::validation::validate_genre_name(name) {
                errors.add("genre_overrides", err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1200,
            height: 800,
            font_family: "sans-serif".to_string(),
            font_size: 14,
            colors: ChartColors::default(),
        }
    }
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            low: "#010101".to_string(),
            mid_low: "#564D4D".to_string(),
            mid_high: "#831010".to_string(),
            high: "#DB0000".to_string(),
            background: "#FFFFFF".to_string(),
            text: "#000000".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
            include_spans: false,
            include_targets: true,
        }
    }
}

impl LoggingConfig {
    /// Settings for `watchstat_common::init_logging`
    pub fn to_logging_config(&self) -> watchstat_common::LoggingConfig {
        watchstat_common::LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file.clone(),
            include_spans: self.include_spans,
            include_targets: self.include_targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchstat_common::test_utils::config_fixtures;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.export.path, "Files");
        assert_eq!(config.analysis.min_watched_seconds, 60);
        assert_eq!(config.analysis.min_percent_watched, 80);
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.analysis.classifier, ClassifierMode::Token);
        assert!(!config.catalog.is_active());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let yaml = serde_yaml::to_string(&config).expect("Failed to serialize to YAML");
        assert!(yaml.contains("export:"));
        assert!(yaml.contains("analysis:"));
        assert!(yaml.contains("catalog:"));

        let deserialized: Config =
            serde_yaml::from_str(&yaml).expect("Failed to deserialize from YAML");
        assert_eq!(config.analysis.top_n, deserialized.analysis.top_n);
        assert_eq!(config.charts.colors.high, deserialized.charts.colors.high);
        assert_eq!(config.catalog.base_url, deserialized.catalog.base_url);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = serde_yaml::from_str(config_fixtures::minimal_config_yaml())
            .expect("Failed to parse minimal config");
        assert!(config.validate_all().is_ok());
        assert_eq!(config.export.output_dir, "output");
        assert_eq!(config.charts.width, 1200);
    }

    #[test]
    fn test_full_config_example() {
        let config: Config = serde_yaml::from_str(config_fixtures::full_config_yaml())
            .expect("Failed to parse full config");
        assert!(config.validate_all().is_ok());
        assert_eq!(config.analysis.classifier, ClassifierMode::Legacy);
        assert_eq!(config.analysis.timezone.as_deref(), Some("Europe/Stockholm"));
        assert_eq!(config.catalog.genre_overrides.get(&10770).map(String::as_str), Some("TV-Film"));
        assert_eq!(config.charts.colors.high, "#e50914");
        // Unset colors keep their defaults
        assert_eq!(config.charts.colors.mid_low, "#564D4D");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.catalog.is_active());
    }

    #[test]
    fn test_analysis_config_validation() {
        let mut config = AnalysisConfig::default();
        assert!(config.validate().is_ok());

        config.top_n = 0;
        assert!(config.validate().is_err());

        config.top_n = 10;
        config.min_percent_watched = 5000;
        assert!(config.validate().is_err());

        config.min_percent_watched = 80;
        config.timezone = Some("Not/AZone".to_string());
        assert!(config.validate_timezone().is_err());

        config.timezone = Some("Asia/Tokyo".to_string());
        assert!(config.validate_timezone().is_ok());
    }

    #[test]
    fn test_catalog_config_validation() {
        let mut config = CatalogConfig::default();
        assert!(config.validate().is_ok());

        config.base_url = "not_a_url".to_string();
        assert!(config.validate().is_err());

        config.base_url = "https://api.themoviedb.org/3".to_string();
        config.max_concurrent_lookups = 0;
        assert!(config.validate().is_err());

        config.max_concurrent_lookups = 4;
        config.genre_overrides.insert(878, "Science Fiction".to_string());
        assert!(config.validate_genre_overrides().is_err());
    }

    #[test]
    fn test_catalog_active_requires_key() {
        let mut config = CatalogConfig::default();
        assert!(!config.is_active());

        config.api_key = Some("   ".to_string());
        assert!(!config.is_active());

        config.api_key = Some("abc123".to_string());
        assert!(config.is_active());

        config.enabled = false;
        assert!(!config.is_active());
    }

    #[test]
    fn test_chart_colors_validation() {
        let mut config = ChartsConfig::default();
        assert!(config.validate().is_ok());

        config.colors.background = "white".to_string();
        assert!(config.validate().is_err());

        config.colors.background = "#FFFFFF".to_string();
        config.width = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_sections_are_validated() {
        let mut config = Config::default();
        config.charts.colors.high = "#GGGGGG".to_string();
        assert!(config.validate_all().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_logging_config_conversion() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
            file: Some("watchstat.log".to_string()),
            include_spans: true,
            include_targets: false,
        };
        let logging = config.to_logging_config();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.file_path.as_deref(), Some("watchstat.log"));
        assert!(logging.include_spans);
        assert!(!logging.include_targets);
    }
}
