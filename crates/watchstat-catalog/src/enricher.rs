//! Catalog enrichment of movie records and genre statistics

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use watchstat_common::{
    CatalogEntry, CatalogMatch, DerivedRecord, EnrichedRecord, FilmType, Result,
};
use watchstat_config::CatalogConfig;

use crate::{
    cache::{CacheConfig, CachedCatalog},
    client::TmdbClient,
    genres::GenreTable,
    MetadataCatalog,
};

/// Default lookups in flight at once
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Genre occurrences for one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    /// Profile that watched the movies
    pub profile: String,
    /// Genre display name, a single token
    pub genre: String,
    /// Substantially watched records carrying this genre
    pub count: u32,
}

/// Catalog ratings of the titles one profile watched in one genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDistribution {
    /// Profile that watched the movies
    pub profile: String,
    /// Genre display name
    pub genre: String,
    /// One vote average per matched record
    pub ratings: Vec<f64>,
    /// Average of `ratings`
    pub mean: f64,
}

/// Result of one enrichment run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enrichment {
    /// Every movie record, matched or not
    #[serde(skip)]
    pub records: Vec<EnrichedRecord>,
    /// Distinct titles sent to the catalog
    pub titles_looked_up: usize,
    /// Lookups that failed and contributed nothing
    pub failed_lookups: usize,
    /// Titles with no candidate of the same original title
    pub unmatched_titles: Vec<String>,
}

impl Enrichment {
    /// Movie records that received metadata
    pub fn matched(&self) -> usize {
        self.records.iter().filter(|r| r.metadata.is_some()).count()
    }
}

/// Looks up watched movies in a catalog and joins the best match onto each record
pub struct CatalogEnricher {
    catalog: Arc<dyn MetadataCatalog>,
    genres: GenreTable,
    max_concurrent_lookups: usize,
}

impl CatalogEnricher {
    /// Create an enricher over any catalog
    pub fn new(catalog: Arc<dyn MetadataCatalog>, genres: GenreTable) -> Self {
        Self {
            catalog,
            genres,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    /// Bound the lookups in flight
    pub fn with_max_concurrent_lookups(mut self, max: usize) -> Self {
        self.max_concurrent_lookups = max.max(1);
        self
    }

    /// A cached TMDB enricher from the `catalog` config section
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let client = TmdbClient::from_catalog_config(config)?;
        let cached = CachedCatalog::new(client, CacheConfig::from_catalog_config(config));
        let genres = GenreTable::tmdb().with_overrides(&config.genre_overrides);

        Ok(Self::new(Arc::new(cached), genres)
            .with_max_concurrent_lookups(config.max_concurrent_lookups))
    }

    /// Search every title, bounded by `max_concurrent_lookups`.
    ///
    /// Results come back in title order regardless of completion order. A
    /// failed lookup is logged and yields `None`.
    async fn lookup_all(&self, titles: Vec<String>) -> Vec<(String, Option<Vec<CatalogEntry>>)> {
        let mut results: Vec<(String, Option<Vec<CatalogEntry>>)> = stream::iter(titles)
            .map(|title| {
                let catalog = Arc::clone(&self.catalog);
                async move {
                    match catalog.search_movies(&title).await {
                        Ok(entries) => (title, Some(entries)),
                        Err(err) => {
                            warn!(title = %title, error = %err, "Catalog lookup failed, continuing without metadata");
                            (title, None)
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent_lookups)
            .collect()
            .await;

        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    /// Keep one candidate per original title: highest popularity, then
    /// highest vote count, then the first seen
    fn best_candidates<I>(&self, candidates: I) -> HashMap<String, CatalogMatch>
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut best: HashMap<String, CatalogEntry> = HashMap::new();
        for candidate in candidates {
            match best.get(&candidate.original_title) {
                Some(current) if !outranks(&candidate, current) => {}
                _ => {
                    best.insert(candidate.original_title.clone(), candidate);
                }
            }
        }

        best.into_iter()
            .map(|(title, entry)| {
                let genres = self.genres.names(&entry.genre_ids);
                (title, CatalogMatch { entry, genres })
            })
            .collect()
    }

    /// Enrich the movie records among `records`; series are left out
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn enrich(&self, records: &[DerivedRecord]) -> Enrichment {
        let movies: Vec<&DerivedRecord> = records
            .iter()
            .filter(|r| r.film_type == FilmType::Movie)
            .collect();

        let titles: Vec<String> = movies
            .iter()
            .map(|r| r.show_title.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let titles_looked_up = titles.len();
        debug!(titles = titles_looked_up, "Looking up movie titles");

        let lookups = self.lookup_all(titles).await;
        let failed_lookups = lookups.iter().filter(|(_, r)| r.is_none()).count();
        let matches = self.best_candidates(lookups.into_iter().flat_map(|(_, r)| r.unwrap_or_default()));

        let unmatched_titles: Vec<String> = movies
            .iter()
            .map(|r| r.show_title.as_str())
            .filter(|title| !matches.contains_key(*title))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let enriched: Vec<EnrichedRecord> = movies
            .into_iter()
            .map(|record| EnrichedRecord {
                metadata: matches.get(&record.show_title).cloned(),
                record: record.clone(),
            })
            .collect();

        let enrichment = Enrichment {
            records: enriched,
            titles_looked_up,
            failed_lookups,
            unmatched_titles,
        };

        info!(
            matched = enrichment.matched(),
            movies = enrichment.records.len(),
            failed = failed_lookups,
            unmatched = enrichment.unmatched_titles.len(),
            "Catalog enrichment complete"
        );
        enrichment
    }
}

fn outranks(candidate: &CatalogEntry, current: &CatalogEntry) -> bool {
    match candidate.popularity.total_cmp(&current.popularity) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => candidate.vote_count > current.vote_count,
    }
}

/// Matched, substantially watched records
fn qualifying<'a>(
    enriched: &'a [EnrichedRecord],
    threshold: u32,
) -> impl Iterator<Item = (&'a str, &'a CatalogMatch)> {
    enriched.iter().filter_map(move |r| match &r.metadata {
        Some(metadata) if r.record.watched_at_least(threshold) => {
            Some((r.record.record.profile_name.as_str(), metadata))
        }
        _ => None,
    })
}

/// Genre token counts per profile over substantially watched matches.
///
/// Sorted by profile, then by count descending, then by genre.
pub fn genre_frequency(enriched: &[EnrichedRecord], threshold: u32) -> Vec<GenreCount> {
    let mut counts: HashMap<(String, String), u32> = HashMap::new();
    for (profile, metadata) in qualifying(enriched, threshold) {
        let joined = metadata.genres.join(" ");
        for token in joined.split_whitespace() {
            *counts
                .entry((profile.to_string(), token.to_string()))
                .or_insert(0) += 1;
        }
    }

    let mut result: Vec<GenreCount> = counts
        .into_iter()
        .map(|((profile, genre), count)| GenreCount {
            profile,
            genre,
            count,
        })
        .collect();
    result.sort_by(|a, b| {
        a.profile
            .cmp(&b.profile)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.genre.cmp(&b.genre))
    });
    result
}

/// Vote averages per profile and genre over substantially watched matches
pub fn rating_distribution(enriched: &[EnrichedRecord], threshold: u32) -> Vec<RatingDistribution> {
    let mut ratings: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for (profile, metadata) in qualifying(enriched, threshold) {
        for genre in &metadata.genres {
            ratings
                .entry((profile.to_string(), genre.clone()))
                .or_default()
                .push(metadata.entry.vote_average);
        }
    }

    ratings
        .into_iter()
        .map(|((profile, genre), ratings)| {
            let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
            RatingDistribution {
                profile,
                genre,
                ratings,
                mean,
            }
        })
        .collect()
}
