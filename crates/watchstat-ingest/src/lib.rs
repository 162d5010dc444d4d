//! # Watchstat Ingest
//!
//! Loads a streaming-service data export into typed records.
//!
//! The export is read from a directory or a zip archive ([`ExportSource`]),
//! each CSV file becomes a [`Table`] with normalized column names, and the
//! tables are then turned into viewing, billing and IP session records. The
//! bundled ISO-3166 table ([`CountryCodes`]) is used to name countries.

pub mod country_codes;
pub mod records;
pub mod source;
pub mod table;

pub use country_codes::CountryCodes;
pub use records::{billing_records, ip_sessions, viewing_records, ExportRecords};
pub use source::{load_export, ExportSource, RawExport};
pub use table::{normalize_header, Table};
