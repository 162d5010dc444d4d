//! Export intake from a directory or a zip archive

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use tracing::{info, instrument, warn};
use watchstat_common::{ensure, Result, WatchstatError};

use crate::{
    records::{billing_records, ip_sessions, viewing_records, ExportRecords},
    Table,
};

/// Viewing activity file name
pub const VIEWING_FILE: &str = "ViewingActivity.csv";
/// Billing history file name
pub const BILLING_FILE: &str = "BillingHistory.csv";
/// IP address log file name
pub const IP_FILE: &str = "IpAddressesStreaming.csv";

/// Sub-folders used by the full export layout, tried after the flat layout
const EXPORT_SUBFOLDERS: [(&str, &str); 3] = [
    (VIEWING_FILE, "CONTENT_INTERACTION"),
    (BILLING_FILE, "PAYMENT_AND_BILLING"),
    (IP_FILE, "IP_ADDRESSES"),
];

/// Where an export is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSource {
    /// An unpacked export directory
    Directory(PathBuf),
    /// The zip archive as downloaded
    Archive(PathBuf),
}

impl ExportSource {
    /// Pick the source kind from a path: `.zip` files and other regular files
    /// are archives, everything else is a directory
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip || path.is_file() {
            Self::Archive(path)
        } else {
            Self::Directory(path)
        }
    }

    /// The underlying path
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Archive(path) => path,
        }
    }
}

/// Parsed but untyped export tables
#[derive(Debug, Clone)]
pub struct RawExport {
    /// Viewing activity
    pub viewing: Table,
    /// Billing history, if the export has one
    pub billing: Option<Table>,
    /// IP address log, if the export has one
    pub ip_sessions: Option<Table>,
}

impl RawExport {
    /// Extract typed records from every table
    pub fn into_records(self) -> Result<ExportRecords> {
        let viewing = viewing_records(&self.viewing)?;
        let billing = match &self.billing {
            Some(table) => billing_records(table)?,
            None => Vec::new(),
        };
        let ip_sessions = match &self.ip_sessions {
            Some(table) => ip_sessions(table)?,
            None => Vec::new(),
        };

        Ok(ExportRecords {
            viewing,
            billing,
            ip_sessions,
        })
    }
}

/// Read the export tables from `source`.
///
/// The viewing activity file is required; billing and IP files are optional
/// and a missing one is logged.
#[instrument(skip_all, fields(path = %source.path().display()))]
pub fn load_export(source: &ExportSource) -> Result<RawExport> {
    let mut tables = match source {
        ExportSource::Directory(dir) => read_directory(dir)?,
        ExportSource::Archive(path) => read_archive(path)?,
    };

    let viewing = tables[0].take().ok_or_else(|| {
        WatchstatError::data(format!(
            "{} not found in {}",
            VIEWING_FILE,
            source.path().display()
        ))
    })?;
    let billing = tables[1].take();
    let ip_sessions = tables[2].take();

    if billing.is_none() {
        warn!("{} not found, billing totals will be empty", BILLING_FILE);
    }
    if ip_sessions.is_none() {
        warn!("{} not found, IP sessions will be empty", IP_FILE);
    }

    info!(
        viewing_rows = viewing.len(),
        billing_rows = billing.as_ref().map_or(0, Table::len),
        ip_rows = ip_sessions.as_ref().map_or(0, Table::len),
        "Loaded export"
    );

    Ok(RawExport {
        viewing,
        billing,
        ip_sessions,
    })
}

fn read_directory(dir: &Path) -> Result<[Option<Table>; 3]> {
    ensure!(
        dir.is_dir(),
        WatchstatError::data(format!("Export directory {} does not exist", dir.display()))
    );

    let mut tables: [Option<Table>; 3] = [None, None, None];
    for (slot, (file_name, subfolder)) in tables.iter_mut().zip(EXPORT_SUBFOLDERS) {
        let candidates = [dir.join(file_name), dir.join(subfolder).join(file_name)];
        if let Some(path) = candidates.iter().find(|p| p.is_file()) {
            let file = File::open(path)?;
            *slot = Some(Table::from_reader(file_name, BufReader::new(file))?);
        }
    }
    Ok(tables)
}

fn read_archive(path: &Path) -> Result<[Option<Table>; 3]> {
    let file = File::open(path).map_err(|e| {
        WatchstatError::Archive {
            message: format!("Cannot open export archive {}", path.display()),
            source: Some(Box::new(e)),
        }
    })?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let mut tables: [Option<Table>; 3] = [None, None, None];
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_string();
        let Some(file_name) = Path::new(&entry_name).file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(slot) = EXPORT_SUBFOLDERS
            .iter()
            .position(|(name, _)| *name == file_name)
        else {
            continue;
        };
        if tables[slot].is_some() {
            warn!(entry = %entry_name, "Duplicate export file in archive, keeping the first");
            continue;
        }

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        tables[slot] = Some(Table::from_bytes(file_name, &bytes)?);
    }
    Ok(tables)
}
