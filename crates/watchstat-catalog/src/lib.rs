//! # Watchstat Catalog
//!
//! Optional movie metadata enrichment. Watched movie titles are searched in a
//! [`MetadataCatalog`] (TMDB by default, behind a title cache), the best
//! candidate per original title is joined back onto the movie records, and
//! genre frequency and rating statistics are derived from the matches.

pub mod cache;
pub mod catalog;
pub mod client;
pub mod enricher;
pub mod genres;

pub use cache::{CacheConfig, CacheMetrics, CachedCatalog};
pub use catalog::MetadataCatalog;
pub use client::{TmdbClient, TmdbConfig};
pub use enricher::{
    genre_frequency, rating_distribution, CatalogEnricher, Enrichment, GenreCount,
    RatingDistribution, DEFAULT_MAX_CONCURRENT_LOOKUPS,
};
pub use genres::GenreTable;
