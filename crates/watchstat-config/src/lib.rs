//! Configuration management for watchstat

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{
    AnalysisConfig, CatalogConfig, ChartColors, ChartsConfig, Config, ExportConfig, LoggingConfig,
};
