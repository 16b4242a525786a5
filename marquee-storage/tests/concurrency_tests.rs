//! Concurrent use of a shared catalog from many tasks.
//!
//! Operations are not serialized, so these tests only check outcomes that
//! hold under any interleaving: no errors, entity slots end up consistent,
//! and a quiescent catalog lists exactly the cached movies.

use marquee_test_utils::{assertions::assert_same_movies, fixtures, Movie, RecordingSource};

const TASKS: i64 = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_and_lists() {
    let backend: Vec<Movie> = (0..TASKS).map(fixtures::movie_with_id).collect();
    let (_store, source, catalog) =
        fixtures::in_memory_catalog(RecordingSource::with_movies(backend.clone()));

    let mut handles = Vec::new();
    for id in 0..TASKS {
        let catalog = catalog.clone();
        handles.push(tokio::spawn(async move {
            let movie = catalog.get(id).await.unwrap();
            catalog.list_all().await.unwrap();
            movie
        }));
    }

    for (id, handle) in handles.into_iter().enumerate() {
        let movie = handle.await.unwrap();
        assert_eq!(movie, Some(fixtures::movie_with_id(id as i64)));
    }

    // A rebuild racing a miss may have stored a partial snapshot; reset first.
    catalog.clear_all().await.unwrap();
    for movie in &backend {
        catalog.put(movie.clone()).await.unwrap();
    }
    assert_same_movies(&catalog.list_all().await.unwrap(), &backend);
    assert_eq!(source.fetch_count(), TASKS as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_puts_then_list() {
    let (_store, _source, catalog) = fixtures::in_memory_catalog(RecordingSource::new());

    let mut handles = Vec::new();
    for id in 0..TASKS {
        let catalog = catalog.clone();
        handles.push(tokio::spawn(async move {
            catalog.put(fixtures::movie_with_id(id)).await.unwrap();
            catalog.evict(id + TASKS).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Quiescent: the slot was invalidated by the last put or evict.
    let expected: Vec<Movie> = (0..TASKS).map(fixtures::movie_with_id).collect();
    assert_same_movies(&catalog.list_all().await.unwrap(), &expected);
    assert_eq!(catalog.stats().invalidations, 2 * TASKS as u64);
}
