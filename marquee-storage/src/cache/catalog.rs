//! Cached catalog facade.
//!
//! Wires one store, one backend and one key layout into an entity cache and
//! an aggregate cache that share the same invalidation path and counters.

use std::sync::Arc;

use marquee_core::{EntityId, MarqueeResult, Movie};

use super::aggregate::AggregateCache;
use super::config::CacheConfig;
use super::entity::EntityCache;
use super::invalidation::InvalidationCoordinator;
use super::keys::KeySpace;
use super::traits::{CacheStats, CacheableEntity, StatsRecorder};
use crate::source::EntitySource;
use crate::store::KeyValueStore;

/// Two-tier cache over a backend: per-entity slots plus an "all" view.
///
/// Cloning is cheap and clones share the same caches and statistics.
///
/// # Example
///
/// ```ignore
/// let catalog = MovieCatalog::with_defaults(
///     Arc::new(InMemoryStore::new()),
///     Arc::new(FakeMovieSource::default()),
/// )?;
///
/// catalog.put(movie).await?;
/// let all = catalog.list_all().await?;
/// ```
pub struct CachedCatalog<S, B, T>
where
    S: KeyValueStore,
    B: EntitySource<T>,
    T: CacheableEntity,
{
    entities: Arc<EntityCache<S, B, T>>,
    aggregate: Arc<AggregateCache<S, T>>,
    keys: KeySpace,
    stats: StatsRecorder,
}

/// The catalog the service runs with.
pub type MovieCatalog<S, B> = CachedCatalog<S, B, Movie>;

impl<S, B, T> Clone for CachedCatalog<S, B, T>
where
    S: KeyValueStore,
    B: EntitySource<T>,
    T: CacheableEntity,
{
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            aggregate: Arc::clone(&self.aggregate),
            keys: self.keys.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<S, B, T> CachedCatalog<S, B, T>
where
    S: KeyValueStore,
    B: EntitySource<T>,
    T: CacheableEntity,
{
    /// Build a catalog over `store` and `source` with the key layout in `config`.
    ///
    /// Fails with a configuration error if the layout is invalid.
    pub fn new(store: Arc<S>, source: Arc<B>, config: CacheConfig) -> MarqueeResult<Self> {
        let keys = KeySpace::new(&config)?;
        let stats = StatsRecorder::default();

        let aggregate = Arc::new(AggregateCache::new(
            Arc::clone(&store),
            keys.clone(),
            stats.clone(),
        ));
        let invalidator = InvalidationCoordinator::new(Arc::clone(&aggregate), stats.clone());
        let entities = Arc::new(EntityCache::new(
            store,
            source,
            keys.clone(),
            invalidator,
            stats.clone(),
        ));

        tracing::debug!(
            namespace = keys.namespace(),
            aggregate_key = keys.aggregate_key(),
            "Cached catalog initialized"
        );

        Ok(Self {
            entities,
            aggregate,
            keys,
            stats,
        })
    }

    /// Build a catalog keyed by the entity type's own cache name.
    pub fn with_defaults(store: Arc<S>, source: Arc<B>) -> MarqueeResult<Self> {
        Self::new(store, source, CacheConfig::for_entity::<T>())
    }

    /// Every cached entity, served from the aggregate slot when populated.
    ///
    /// Never consults the backend. Entities that were never read or put are
    /// not listed.
    pub async fn list_all(&self) -> MarqueeResult<Vec<T>> {
        self.aggregate.get_all().await
    }

    /// Read-through lookup by identifier.
    pub async fn get(&self, id: EntityId) -> MarqueeResult<Option<T>> {
        self.entities.get(id).await
    }

    /// Cache `entity` under its identifier and return it.
    pub async fn put(&self, entity: T) -> MarqueeResult<T> {
        self.entities.put(entity).await
    }

    /// Drop the cached entry for `id`, if any.
    pub async fn evict(&self, id: EntityId) -> MarqueeResult<()> {
        self.entities.evict(id).await
    }

    /// Drop every cached entity and the aggregate slot.
    pub async fn clear_all(&self) -> MarqueeResult<u64> {
        self.entities.clear().await
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    pub fn entity_cache(&self) -> &EntityCache<S, B, T> {
        &self.entities
    }

    pub fn aggregate_cache(&self) -> &AggregateCache<S, T> {
        &self.aggregate
    }
}
