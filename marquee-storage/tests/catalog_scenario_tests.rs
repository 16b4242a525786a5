//! End-to-end walkthrough of the movie catalog.
//!
//! Backend knows movie 15. Reading it fills the entity cache, listing builds
//! the aggregate slot, evicting drops both, and listing an empty catalog does
//! not store an empty snapshot.

use std::sync::Arc;

use chrono::NaiveDate;
use marquee_storage::{FakeMovieSource, InMemoryStore, KeyValueStore, MovieCatalog};
use marquee_test_utils::{
    assertions::{assert_aggregate_absent, assert_aggregate_present},
    fixtures, Movie, RecordingSource,
};

fn backend_movie() -> Movie {
    Movie::new(15, "Title", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
}

#[tokio::test]
async fn test_read_list_evict_list() {
    let (store, source, catalog) =
        fixtures::in_memory_catalog(RecordingSource::with_movies([backend_movie()]));
    let keys = catalog.keys().clone();

    // Miss: invalidation of an absent slot is a no-op, backend is asked once.
    let movie = catalog.get(15).await.unwrap();
    assert_eq!(movie, Some(backend_movie()));
    assert_eq!(source.fetch_count(), 1);
    assert!(store.contains_key("movies:15"));
    assert_aggregate_absent(&store, &keys);

    // Rebuild scans one key and stores the slot.
    let all = catalog.list_all().await.unwrap();
    assert_eq!(all, vec![backend_movie()]);
    assert_aggregate_present(&store, &keys);
    assert_eq!(catalog.stats().aggregate_rebuilds, 1);

    // Evict drops the entity and the slot.
    catalog.evict(15).await.unwrap();
    assert!(!store.contains_key("movies:15"));
    assert_aggregate_absent(&store, &keys);

    // Empty rebuild leaves the slot absent.
    assert!(catalog.list_all().await.unwrap().is_empty());
    assert_aggregate_absent(&store, &keys);

    let stats = catalog.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.backend_fetches, 1);
    assert_eq!(stats.aggregate_rebuilds, 2);
    assert_eq!(stats.invalidations, 2);
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_fake_source_scenario() {
    let store = Arc::new(InMemoryStore::new());
    let catalog =
        MovieCatalog::with_defaults(Arc::clone(&store), Arc::new(FakeMovieSource::default()))
            .unwrap();

    let movie = catalog.get(15).await.unwrap().unwrap();
    assert_eq!(
        movie.to_string(),
        "{ id=15, title=\"Title\", release_date=2020-01-01 }"
    );

    catalog.put(fixtures::sample_movie()).await.unwrap();
    assert_eq!(
        catalog.list_all().await.unwrap(),
        vec![fixtures::sample_movie()]
    );
}

#[tokio::test]
async fn test_hit_keeps_aggregate_slot() {
    let (store, source, catalog) = fixtures::in_memory_catalog(RecordingSource::new());
    let keys = catalog.keys().clone();

    catalog.put(fixtures::sample_movie()).await.unwrap();
    catalog.list_all().await.unwrap();
    assert_aggregate_present(&store, &keys);

    let hit = catalog.get(fixtures::SAMPLE_ID).await.unwrap();

    assert_eq!(hit, Some(fixtures::sample_movie()));
    assert_aggregate_present(&store, &keys);
    assert_eq!(source.fetch_count(), 0);
    assert_eq!(catalog.stats().hits, 1);
    assert_eq!(catalog.stats().hit_rate(), 1.0);
}

#[tokio::test]
async fn test_list_all_only_sees_cached_movies() {
    let backend = (1..=5).map(fixtures::movie_with_id);
    let (_store, source, catalog) = fixtures::in_memory_catalog(RecordingSource::with_movies(backend));

    catalog.get(2).await.unwrap();
    catalog.get(4).await.unwrap();

    let all = catalog.list_all().await.unwrap();
    marquee_test_utils::assertions::assert_same_movies(
        &all,
        &[fixtures::movie_with_id(2), fixtures::movie_with_id(4)],
    );
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_absent_backend_value_is_not_cached() {
    let (store, source, catalog) = fixtures::in_memory_catalog(RecordingSource::new());

    assert_eq!(catalog.get(99).await.unwrap(), None);
    assert_eq!(catalog.get(99).await.unwrap(), None);

    assert_eq!(source.fetch_count(), 2);
    assert!(store.is_empty());
    assert_eq!(catalog.stats().invalidations, 2);
}

#[tokio::test]
async fn test_clear_all_then_refill() {
    let (store, _source, catalog) = fixtures::in_memory_catalog(RecordingSource::new());
    for id in 1..=3 {
        catalog.put(fixtures::movie_with_id(id)).await.unwrap();
    }
    store.set("unrelated", b"keep".to_vec()).await.unwrap();
    catalog.list_all().await.unwrap();

    assert_eq!(catalog.clear_all().await.unwrap(), 3);
    assert_eq!(store.len(), 1);
    assert!(catalog.list_all().await.unwrap().is_empty());

    catalog.put(fixtures::movie_with_id(9)).await.unwrap();
    assert_eq!(
        catalog.list_all().await.unwrap(),
        vec![fixtures::movie_with_id(9)]
    );
}
