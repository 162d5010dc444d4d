//! Catalog genre id to display name table

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

/// TMDB movie and TV genres. Names with spaces or `&` are hyphenated so a
/// space-joined genre list splits back into one token per genre.
const TMDB_GENRES: &[(u32, &str)] = &[
    (12, "Adventure"),
    (14, "Fantasy"),
    (16, "Animation"),
    (18, "Drama"),
    (27, "Horror"),
    (28, "Action"),
    (35, "Comedy"),
    (36, "History"),
    (37, "Western"),
    (53, "Thriller"),
    (80, "Crime"),
    (99, "Documentary"),
    (878, "Science-Fiction"),
    (9648, "Mystery"),
    (10402, "Music"),
    (10749, "Romance"),
    (10751, "Family"),
    (10752, "War"),
    (10759, "Action-Adventure"),
    (10762, "Kids"),
    (10763, "News"),
    (10764, "Reality"),
    (10765, "Sci-Fi-Fantasy"),
    (10766, "Soap"),
    (10767, "Talk"),
    (10768, "War-Politics"),
    (10770, "TV-Movie"),
];

/// Maps genre ids to display names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreTable {
    names: HashMap<u32, String>,
}

impl Default for GenreTable {
    fn default() -> Self {
        Self::tmdb()
    }
}

impl GenreTable {
    /// The built-in TMDB table
    pub fn tmdb() -> Self {
        Self {
            names: TMDB_GENRES
                .iter()
                .map(|(id, name)| (*id, (*name).to_string()))
                .collect(),
        }
    }

    /// Replace or add names, typically from `catalog.genre_overrides`
    pub fn with_overrides(mut self, overrides: &BTreeMap<u32, String>) -> Self {
        for (id, name) in overrides {
            self.names.insert(*id, name.clone());
        }
        self
    }

    /// Display name for one id
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Display names for a list of ids in order; unknown ids are skipped
    pub fn names(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| {
                let name = self.name(*id);
                if name.is_none() {
                    debug!(genre_id = id, "Unknown genre id skipped");
                }
                name.map(str::to_string)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
