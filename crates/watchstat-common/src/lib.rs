//! # Watchstat Common
//!
//! Shared types, utilities, and common functionality for watchstat.
//!
//! This crate provides the error type, logging setup, export record types and
//! the `HH:MM:SS` duration helpers used across all other crates in the
//! workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod macros;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, WatchstatError};
pub use logging::{init_default_logging, init_logging, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
