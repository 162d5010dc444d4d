//! ISO-3166 country reference table

use std::{collections::HashMap, fs::File, io::Read, path::Path};

use tracing::debug;
use watchstat_common::{ensure, CountryCodeEntry, Result, WatchstatError};

/// Headerless `name,alpha2,alpha3,numeric` table shipped with the crate
const BUNDLED_ISO_CODES: &str = include_str!("../data/iso_codes.csv");

/// Country reference table, looked up by alpha-2 code
#[derive(Debug, Clone)]
pub struct CountryCodes {
    entries: Vec<CountryCodeEntry>,
    by_alpha2: HashMap<String, usize>,
}

impl CountryCodes {
    /// The bundled ISO-3166-1 table
    pub fn bundled() -> Result<Self> {
        Self::from_reader("bundled iso_codes.csv", BUNDLED_ISO_CODES.as_bytes())
    }

    /// Load a replacement table from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            WatchstatError::data_with_source(format!("Cannot open {}", path.display()), e)
        })?;
        Self::from_reader(&path.display().to_string(), file)
    }

    /// Parse a headerless four-column table
    pub fn from_reader<R: Read>(source: &str, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| {
                WatchstatError::data_with_source(format!("Malformed country table {}", source), e)
            })?;
            ensure!(
                record.len() == 4,
                WatchstatError::data(format!(
                    "Country table {} row {} has {} columns, expected 4",
                    source,
                    i + 1,
                    record.len()
                ))
            );
            entries.push(CountryCodeEntry {
                name: record[0].trim().to_string(),
                alpha2: record[1].trim().to_uppercase(),
                alpha3: record[2].trim().to_uppercase(),
                un_code: record[3].trim().to_string(),
            });
        }

        Ok(Self::from_entries(entries))
    }

    /// Build from entries; on duplicate alpha-2 codes the first entry wins
    pub fn from_entries(entries: Vec<CountryCodeEntry>) -> Self {
        let mut by_alpha2 = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_alpha2.entry(entry.alpha2.clone()).or_insert(idx);
        }
        debug!(countries = entries.len(), "Loaded country code table");
        Self { entries, by_alpha2 }
    }

    /// Look up an alpha-2 code, case-insensitively
    pub fn lookup(&self, alpha2: &str) -> Option<&CountryCodeEntry> {
        self.by_alpha2
            .get(&alpha2.trim().to_uppercase())
            .map(|&idx| &self.entries[idx])
    }

    /// All entries in table order
    pub fn entries(&self) -> &[CountryCodeEntry] {
        &self.entries
    }

    /// Number of countries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
