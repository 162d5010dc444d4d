//! Error types and utilities for watchstat

use thiserror::Error;

/// Result type alias for watchstat operations
pub type Result<T> = std::result::Result<T, WatchstatError>;

/// Main error type for watchstat operations
#[derive(Error, Debug)]
pub enum WatchstatError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (HTTP requests, etc.)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Metadata catalog API errors
    #[error("Catalog API error: {message}")]
    Catalog {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing or malformed export data
    #[error("Data error: {message}")]
    Data {
        message: String,
        column: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Export archive errors
    #[error("Archive error: {message}")]
    Archive {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chart rendering errors
    #[error("Chart error: {message}")]
    Chart {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WatchstatError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new catalog API error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new catalog API error with HTTP status code
    pub fn catalog_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Catalog {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new data error
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data {
            message: msg.into(),
            column: None,
            source: None,
        }
    }

    /// Create a new data error for a specific column
    pub fn data_column(msg: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Data {
            message: msg.into(),
            column: Some(column.into()),
            source: None,
        }
    }

    /// Create a new data error with source
    pub fn data_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Data {
            message: msg.into(),
            column: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new archive error
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new chart error
    pub fn chart(msg: impl Into<String>) -> Self {
        Self::Chart {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new chart error with source
    pub fn chart_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Chart {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Column name attached to a data error, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Data { column, .. } => column.as_deref(),
            _ => None,
        }
    }

    /// Transport failures and server-side catalog errors are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Catalog {
                status_code: Some(status),
                ..
            } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

// Error conversion implementations for external types

impl From<String> for WatchstatError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for WatchstatError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Convert from reqwest::Error to WatchstatError
impl From<reqwest::Error> for WatchstatError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry credentials in their query string
        let err = err.without_url();
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::network_with_source(format!("HTTP error: {}", status_code), err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from csv::Error to WatchstatError
impl From<csv::Error> for WatchstatError {
    fn from(err: csv::Error) -> Self {
        let message = match err.position() {
            Some(pos) => format!("Malformed CSV near line {}", pos.line()),
            None => "Malformed CSV".to_string(),
        };
        Self::data_with_source(message, err)
    }
}

/// Convert from zip::result::ZipError to WatchstatError
impl From<zip::result::ZipError> for WatchstatError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive {
            message: "Failed to read export archive".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from serde_yaml::Error to WatchstatError
impl From<serde_yaml::Error> for WatchstatError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_source("YAML parsing error", err)
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to WatchstatError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for WatchstatError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::chart_with_source("Chart rendering failed", err)
    }
}
