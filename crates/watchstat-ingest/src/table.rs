//! CSV tables with normalized column names

use std::{fs::File, io::Read, path::Path};

use tracing::debug;
use watchstat_common::{Result, WatchstatError};

/// Normalize a column header: trim it and replace spaces with underscores.
///
/// `"Profile Name"` becomes `"Profile_Name"`; a leading byte-order mark is
/// dropped.
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .replace(' ', "_")
}

/// An in-memory CSV table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    source: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from already split headers and rows
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers: headers.iter().map(|h| normalize_header(h)).collect(),
            rows,
        }
    }

    /// Parse CSV with a header row; rows must match the header width
    pub fn from_reader<R: Read>(source: impl Into<String>, reader: R) -> Result<Self> {
        let source = source.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| malformed(&source, e))?
            .iter()
            .map(normalize_header)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| malformed(&source, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(source = %source, columns = headers.len(), rows = rows.len(), "Parsed CSV table");

        Ok(Self {
            source,
            headers,
            rows,
        })
    }

    /// Parse CSV bytes
    pub fn from_bytes(source: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        Self::from_reader(source, bytes)
    }

    /// Read and parse a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            WatchstatError::data_with_source(format!("Cannot open {}", path.display()), e)
        })?;
        Self::from_reader(path.display().to_string(), file)
    }

    /// Name of the file the table came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Normalized column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, if present
    pub fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = normalize_header(column);
        self.headers.iter().position(|h| *h == wanted)
    }

    /// Index of a column that must be present
    pub fn require(&self, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| {
            WatchstatError::data_column(
                format!("Missing required column '{}' in {}", column, self.source),
                column,
            )
        })
    }

    /// All values of one column
    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.require(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
            .collect())
    }
}

fn malformed(source: &str, err: csv::Error) -> WatchstatError {
    let message = match err.position() {
        Some(pos) => format!("Malformed CSV in {} near line {}", source, pos.line()),
        None => format!("Malformed CSV in {}", source),
    };
    WatchstatError::data_with_source(message, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Profile Name"), "Profile_Name");
        assert_eq!(normalize_header(" Supplemental Video Type "), "Supplemental_Video_Type");
        assert_eq!(normalize_header("\u{feff}Profile Name"), "Profile_Name");
        assert_eq!(normalize_header("Country"), "Country");
        assert_eq!(normalize_header("Gross Sale Amt"), "Gross_Sale_Amt");
    }

    #[test]
    fn test_parse_table_normalizes_headers() {
        let csv = "Profile Name,Start Time,Title\nAlice,2023-01-01 10:00:00,\"Dark: Season 1, Part 2\"\n";
        let table = Table::from_bytes("ViewingActivity.csv", csv.as_bytes()).unwrap();

        assert_eq!(table.headers(), &["Profile_Name", "Start_Time", "Title"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0][2], "Dark: Season 1, Part 2");
    }

    #[test]
    fn test_require_accepts_either_spelling() {
        let table = Table::from_bytes("t.csv", b"Profile Name\nAlice\n".as_slice()).unwrap();
        assert_eq!(table.require("Profile_Name").unwrap(), 0);
        assert_eq!(table.require("Profile Name").unwrap(), 0);
    }

    #[test]
    fn test_missing_column_names_the_column() {
        let table = Table::from_bytes("ViewingActivity.csv", b"Title\nHeat\n".as_slice()).unwrap();
        let err = table.require("Bookmark").unwrap_err();

        assert_eq!(err.column(), Some("Bookmark"));
        assert!(err.to_string().contains("Bookmark"));
        assert!(err.to_string().contains("ViewingActivity.csv"));
    }

    #[test]
    fn test_ragged_rows_are_data_errors() {
        let csv = "A,B\n1,2\n3\n";
        let err = Table::from_bytes("ragged.csv", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, WatchstatError::Data { .. }));
        assert!(err.to_string().contains("ragged.csv"));
    }

    #[test]
    fn test_column_values() {
        let table = Table::from_bytes("t.csv", b"A,B\n1,x\n2,y\n".as_slice()).unwrap();
        assert_eq!(table.column("B").unwrap(), vec!["x", "y"]);
        assert!(table.column("C").is_err());
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let table = Table::from_bytes("t.csv", b"A,B\n".as_slice()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers().len(), 2);
    }
}
