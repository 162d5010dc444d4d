//! Title-keyed lookup cache in front of any catalog

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;
use watchstat_common::{CatalogEntry, Result};
use watchstat_config::CatalogConfig;

use crate::MetadataCatalog;

/// Configuration for the lookup cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached titles
    pub max_capacity: u64,
    /// Time-to-live for cache entries
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Cache settings from the `catalog` config section
    pub fn from_catalog_config(config: &CatalogConfig) -> Self {
        Self {
            max_capacity: config.cache_capacity,
            ttl: Duration::from_secs(config.cache_ttl_seconds),
        }
    }
}

/// Hit and miss counters
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Lookups answered from the cache
    pub hits: AtomicU64,
    /// Lookups forwarded to the wrapped catalog
    pub misses: AtomicU64,
}

impl CacheMetrics {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Wraps a catalog and remembers successful lookups by title.
///
/// Failed lookups are not cached, so a later search for the same title goes
/// back to the wrapped catalog.
pub struct CachedCatalog<C> {
    inner: C,
    cache: Cache<String, Vec<CatalogEntry>>,
    metrics: CacheMetrics,
}

impl<C: MetadataCatalog> CachedCatalog<C> {
    /// Create a new cache with the given configuration
    pub fn new(inner: C, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            inner,
            cache,
            metrics: CacheMetrics::default(),
        }
    }

    /// Counters since creation
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Number of cached titles
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl<C: MetadataCatalog> MetadataCatalog for CachedCatalog<C> {
    async fn search_movies(&self, title: &str) -> Result<Vec<CatalogEntry>> {
        if let Some(entries) = self.cache.get(title).await {
            self.metrics.record_hit();
            debug!(title, "Catalog cache hit");
            return Ok(entries);
        }

        self.metrics.record_miss();
        let entries = self.inner.search_movies(title).await?;
        self.cache.insert(title.to_string(), entries.clone()).await;
        Ok(entries)
    }
}
