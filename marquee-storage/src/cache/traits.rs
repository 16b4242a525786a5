//! Cacheable entity marker and cache statistics.

use std::sync::{Arc, RwLock};

use marquee_core::{EntityId, Movie};
use serde::{de::DeserializeOwned, Serialize};

/// Marker trait for types that can be cached.
///
/// # Implementation Requirements
///
/// - `cache_name()` must return a consistent value for all instances and must
///   not contain `:`; it becomes the default key namespace
/// - `entity_id()` must return the identity of this instance; two values with
///   the same id occupy the same cache slot
/// - Implementations must be `Clone`, `Serialize`, and `DeserializeOwned` for
///   cache storage, and `Send + Sync + 'static` for async compatibility
pub trait CacheableEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the cache holding this entity type.
    fn cache_name() -> &'static str;

    /// Get the identifier of this entity.
    fn entity_id(&self) -> EntityId;
}

impl CacheableEntity for Movie {
    fn cache_name() -> &'static str {
        "movies"
    }

    fn entity_id(&self) -> EntityId {
        self.id()
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entity reads served from the store.
    pub hits: u64,
    /// Entity reads that fell through to the backend.
    pub misses: u64,
    /// Backend lookups that returned an entity which was then cached.
    pub backend_fetches: u64,
    /// `get_all` calls served from the aggregate slot.
    pub aggregate_hits: u64,
    /// `get_all` calls that rescanned the entity key space.
    pub aggregate_rebuilds: u64,
    /// Completed aggregate invalidations.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the entity hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Shared counters updated by every cache component.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatsRecorder {
    inner: Arc<RwLock<CacheStats>>,
}

impl StatsRecorder {
    pub(crate) fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.inner.write() {
            update(&mut stats);
        }
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        self.inner.read().map(|s| s.clone()).unwrap_or_default()
    }
}
