//! Integration tests for watchstat-catalog

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use watchstat_catalog::{
    genre_frequency, rating_distribution, CacheConfig, CachedCatalog, CatalogEnricher,
    GenreTable, MetadataCatalog,
};
use watchstat_common::{
    test_utils::{fixtures, init_test_logging},
    CatalogEntry, FilmType, Result, WatchstatError,
};

mock! {
    pub Catalog {}

    #[async_trait]
    impl MetadataCatalog for Catalog {
        async fn search_movies(&self, title: &str) -> Result<Vec<CatalogEntry>>;
    }
}

fn entry(original_title: &str, popularity: f64, genre_ids: Vec<u32>, vote_average: f64) -> CatalogEntry {
    CatalogEntry {
        title: original_title.to_string(),
        original_title: original_title.to_string(),
        genre_ids,
        vote_average,
        vote_count: 1000,
        release_date: None,
        popularity,
    }
}

#[tokio::test]
async fn test_cached_enrichment_end_to_end() {
    init_test_logging();

    let mut mock = MockCatalog::new();
    mock.expect_search_movies()
        .times(4)
        .returning(|title| match title {
            // A remake with the same original title loses on popularity
            "Heat" => Ok(vec![
                entry("Heat", 45.0, vec![28, 80], 7.9),
                entry("Heat", 3.0, vec![18], 5.0),
            ]),
            "Arrival" => Ok(vec![entry("Arrival", 30.0, vec![878, 18], 7.6)]),
            _ => Err(WatchstatError::network("connection reset")),
        });

    let catalog = Arc::new(CachedCatalog::new(mock, CacheConfig::default()));
    let overrides = [(878, "Sci-Fi".to_string())].into_iter().collect();
    let enricher = CatalogEnricher::new(catalog.clone(), GenreTable::tmdb().with_overrides(&overrides))
        .with_max_concurrent_lookups(2);

    let records = vec![
        fixtures::derived_record("Alice", "Heat", FilmType::Movie, Some(90)),
        fixtures::derived_record("Alice", "Arrival", FilmType::Movie, Some(85)),
        fixtures::derived_record("Bob", "Arrival", FilmType::Movie, Some(100)),
        fixtures::derived_record("Bob", "Lost Film", FilmType::Movie, Some(100)),
    ];

    let first = enricher.enrich(&records).await;
    assert_eq!(first.records.len(), 4);
    assert_eq!(first.matched(), 3);
    assert_eq!(first.failed_lookups, 1);
    assert_eq!(first.unmatched_titles, vec!["Lost Film"]);

    // Second run is served from the cache except for the failed title
    let second = enricher.enrich(&records).await;
    assert_eq!(second.matched(), 3);
    assert_eq!(catalog.metrics().hits.load(std::sync::atomic::Ordering::Relaxed), 2);

    let genres = genre_frequency(&first.records, 80);
    let alice: Vec<(&str, u32)> = genres
        .iter()
        .filter(|g| g.profile == "Alice")
        .map(|g| (g.genre.as_str(), g.count))
        .collect();
    assert_eq!(
        alice,
        vec![("Action", 1), ("Crime", 1), ("Drama", 1), ("Sci-Fi", 1)]
    );

    let ratings = rating_distribution(&first.records, 80);
    let bob_scifi = ratings
        .iter()
        .find(|r| r.profile == "Bob" && r.genre == "Sci-Fi")
        .unwrap();
    assert_eq!(bob_scifi.ratings, vec![7.6]);
}
