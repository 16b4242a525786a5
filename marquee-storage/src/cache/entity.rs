//! Entity cache: cache-aside over one entity type, keyed by identifier.
//!
//! Each operation explicitly pairs its store operation with exactly one
//! aggregate invalidation, issued first. Hits are the only path that does not
//! invalidate.

use std::sync::Arc;

use marquee_core::{EntityId, MarqueeResult};

use super::invalidation::{InvalidationCause, InvalidationCoordinator};
use super::keys::KeySpace;
use super::traits::{CacheableEntity, StatsRecorder};
use crate::source::EntitySource;
use crate::store::{codec, KeyValueStore};

/// Cache-aside layer over entities of type `T`.
///
/// # Type Parameters
///
/// - `S`: The key-value store holding the entity slots
/// - `B`: The backend queried on a miss
/// - `T`: The cached entity type
pub struct EntityCache<S, B, T>
where
    S: KeyValueStore,
    B: EntitySource<T>,
    T: CacheableEntity,
{
    store: Arc<S>,
    source: Arc<B>,
    keys: KeySpace,
    invalidator: InvalidationCoordinator<S, T>,
    stats: StatsRecorder,
}

impl<S, B, T> EntityCache<S, B, T>
where
    S: KeyValueStore,
    B: EntitySource<T>,
    T: CacheableEntity,
{
    pub(crate) fn new(
        store: Arc<S>,
        source: Arc<B>,
        keys: KeySpace,
        invalidator: InvalidationCoordinator<S, T>,
        stats: StatsRecorder,
    ) -> Self {
        Self {
            store,
            source,
            keys,
            invalidator,
            stats,
        }
    }

    /// Read-through lookup.
    ///
    /// On a hit the cached value is returned. On a miss the aggregate slot is
    /// invalidated, then the backend is queried and a found entity is stored
    /// before being returned. The invalidation happens even when the backend
    /// finds nothing or fails.
    pub async fn get(&self, id: EntityId) -> MarqueeResult<Option<T>> {
        let key = self.keys.entity_key(id);
        if let Some(bytes) = self.store.get(&key).await? {
            let entity = codec::decode(&key, &bytes)?;
            self.stats.record(|s| s.hits += 1);
            return Ok(Some(entity));
        }

        self.stats.record(|s| s.misses += 1);
        self.invalidator
            .invalidate(InvalidationCause::Miss(id))
            .await?;

        tracing::info!(id, cache = self.keys.namespace(), "Get entity by id");
        let Some(entity) = self.source.fetch(id).await? else {
            return Ok(None);
        };

        self.store.set(&key, codec::encode(&key, &entity)?).await?;
        self.stats.record(|s| s.backend_fetches += 1);
        Ok(Some(entity))
    }

    /// Store `entity` under its identifier, replacing any cached value.
    pub async fn put(&self, entity: T) -> MarqueeResult<T> {
        let id = entity.entity_id();
        self.invalidator
            .invalidate(InvalidationCause::Put(id))
            .await?;

        let key = self.keys.entity_key(id);
        self.store.set(&key, codec::encode(&key, &entity)?).await?;
        tracing::info!(id, cache = self.keys.namespace(), "Adding entity to cache");
        Ok(entity)
    }

    /// Remove the entry for `id`. Evicting an absent entry is not an error.
    pub async fn evict(&self, id: EntityId) -> MarqueeResult<()> {
        self.invalidator
            .invalidate(InvalidationCause::Evict(id))
            .await?;

        let removed = self.store.delete(&self.keys.entity_key(id)).await?;
        if removed {
            tracing::info!(id, cache = self.keys.namespace(), "Clean entry for cache");
        } else {
            tracing::debug!(id, cache = self.keys.namespace(), "Entry already absent");
        }
        Ok(())
    }

    /// Remove every entity entry, returning how many were removed.
    pub async fn clear(&self) -> MarqueeResult<u64> {
        self.invalidator.invalidate(InvalidationCause::Clear).await?;

        let removed = self.store.delete_prefix(self.keys.entity_prefix()).await?;
        tracing::info!(
            removed,
            cache = self.keys.namespace(),
            "Clean all entries for cache"
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::aggregate::AggregateCache;
    use crate::cache::config::CacheConfig;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use marquee_core::{BackendError, MarqueeError, Movie};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;

    const ID: i64 = 15;

    fn movie(id: i64, title: &str) -> Movie {
        Movie::new(id, title, NaiveDate::from_ymd_opt(2022, 7, 19).unwrap())
    }

    // Mock backend for testing
    #[derive(Default)]
    struct MockSource {
        movies: RwLock<HashMap<i64, Movie>>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn with(movies: Vec<Movie>) -> Self {
            Self {
                movies: RwLock::new(movies.into_iter().map(|m| (m.id(), m)).collect()),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl EntitySource<Movie> for MockSource {
        async fn fetch(&self, id: i64) -> Result<Option<Movie>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BackendError::LookupFailed {
                    id,
                    reason: "connection refused".to_string(),
                });
            }
            Ok(self.movies.read().unwrap().get(&id).cloned())
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        source: Arc<MockSource>,
        cache: EntityCache<InMemoryStore, MockSource, Movie>,
        stats: StatsRecorder,
    }

    fn fixture(source: MockSource) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let source = Arc::new(source);
        let keys = KeySpace::new(&CacheConfig::default()).unwrap();
        let stats = StatsRecorder::default();
        let aggregate = Arc::new(AggregateCache::new(
            Arc::clone(&store),
            keys.clone(),
            stats.clone(),
        ));
        let invalidator = InvalidationCoordinator::new(aggregate, stats.clone());
        let cache = EntityCache::new(
            Arc::clone(&store),
            Arc::clone(&source),
            keys,
            invalidator,
            stats.clone(),
        );
        Fixture {
            store,
            source,
            cache,
            stats,
        }
    }

    async fn poison_aggregate(store: &InMemoryStore) {
        store.set("all_movies", b"[]".to_vec()).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_hit_skips_backend_and_invalidation() {
        let f = fixture(MockSource::default());
        let cached = movie(ID, "Some movie");
        f.store
            .set("movies:15", codec::encode("movies:15", &cached).unwrap())
            .await
            .unwrap();
        poison_aggregate(&f.store).await;

        let result = f.cache.get(ID).await.unwrap();

        assert_eq!(result, Some(cached));
        assert_eq!(f.source.calls.load(Ordering::SeqCst), 0);
        assert!(f.store.contains_key("all_movies"));
        assert_eq!(f.stats.snapshot().hits, 1);
        assert_eq!(f.stats.snapshot().invalidations, 0);
    }

    #[tokio::test]
    async fn test_get_miss_invalidates_fetches_and_stores() {
        let f = fixture(MockSource::with(vec![movie(ID, "Some movie")]));
        poison_aggregate(&f.store).await;

        let result = f.cache.get(ID).await.unwrap();

        assert_eq!(result, Some(movie(ID, "Some movie")));
        assert!(!f.store.contains_key("all_movies"));
        assert!(f.store.contains_key("movies:15"));
        let stats = f.stats.snapshot();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.backend_fetches, 1);
        assert_eq!(stats.invalidations, 1);
    }

    #[tokio::test]
    async fn test_get_miss_with_absent_backend_value_still_invalidates() {
        let f = fixture(MockSource::default());
        poison_aggregate(&f.store).await;

        let result = f.cache.get(ID).await.unwrap();

        assert!(result.is_none());
        assert!(!f.store.contains_key("all_movies"));
        assert!(!f.store.contains_key("movies:15"));
        assert_eq!(f.source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.stats.snapshot().invalidations, 1);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates_after_invalidation() {
        let f = fixture(MockSource::failing());
        poison_aggregate(&f.store).await;

        let err = f.cache.get(ID).await.unwrap_err();

        assert!(matches!(err, MarqueeError::BackendUnavailable(_)));
        assert!(!f.store.contains_key("all_movies"));
        assert!(!f.store.contains_key("movies:15"));
    }

    #[tokio::test]
    async fn test_put_overwrites_and_invalidates() {
        let f = fixture(MockSource::default());
        f.cache.put(movie(ID, "Old")).await.unwrap();
        poison_aggregate(&f.store).await;

        let stored = f.cache.put(movie(ID, "New")).await.unwrap();

        assert_eq!(stored, movie(ID, "New"));
        assert_eq!(f.cache.get(ID).await.unwrap(), Some(movie(ID, "New")));
        assert!(!f.store.contains_key("all_movies"));
        assert_eq!(f.stats.snapshot().invalidations, 2);
        assert_eq!(f.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_evict_absent_entry_is_noop() {
        let f = fixture(MockSource::default());
        f.cache.put(movie(1, "Keep")).await.unwrap();

        f.cache.evict(ID).await.unwrap();

        assert!(f.store.contains_key("movies:1"));
        assert_eq!(f.stats.snapshot().invalidations, 2);
    }

    #[tokio::test]
    async fn test_evict_removes_entry() {
        let f = fixture(MockSource::default());
        f.cache.put(movie(ID, "Gone")).await.unwrap();
        poison_aggregate(&f.store).await;

        f.cache.evict(ID).await.unwrap();

        assert!(!f.store.contains_key("movies:15"));
        assert!(!f.store.contains_key("all_movies"));
    }

    #[tokio::test]
    async fn test_clear_removes_only_entity_keys() {
        let f = fixture(MockSource::default());
        for id in 1..=3 {
            f.cache.put(movie(id, "Any")).await.unwrap();
        }
        f.store.set("unrelated", b"x".to_vec()).await.unwrap();
        poison_aggregate(&f.store).await;

        let removed = f.cache.clear().await.unwrap();

        assert_eq!(removed, 3);
        assert!(f.store.contains_key("unrelated"));
        assert!(!f.store.contains_key("all_movies"));
        assert_eq!(f.store.len(), 1);
    }
}
