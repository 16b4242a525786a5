//! Invalidation coordinator.
//!
//! Every entity-cache miss, put, eviction and clear goes through
//! [`InvalidationCoordinator::invalidate`] before touching the entity slot.
//! Invalidating first means the aggregate slot is already gone when the
//! triggering operation later fails (backend error, store error), so callers
//! pay an extra rebuild at worst and never read a stale "all" view.

use std::fmt;
use std::sync::Arc;

use marquee_core::{EntityId, MarqueeResult};

use super::aggregate::AggregateCache;
use super::traits::{CacheableEntity, StatsRecorder};
use crate::store::KeyValueStore;

/// The entity-cache operation that triggered an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationCause {
    /// Entity read missed and is about to query the backend.
    Miss(EntityId),
    /// Entity written explicitly.
    Put(EntityId),
    /// Entity evicted.
    Evict(EntityId),
    /// Every entity removed.
    Clear,
}

impl fmt::Display for InvalidationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationCause::Miss(id) => write!(f, "miss:{}", id),
            InvalidationCause::Put(id) => write!(f, "put:{}", id),
            InvalidationCause::Evict(id) => write!(f, "evict:{}", id),
            InvalidationCause::Clear => write!(f, "clear"),
        }
    }
}

/// Drops the aggregate slot on behalf of the entity cache.
pub struct InvalidationCoordinator<S, T>
where
    S: KeyValueStore,
    T: CacheableEntity,
{
    aggregate: Arc<AggregateCache<S, T>>,
    stats: StatsRecorder,
}

impl<S, T> InvalidationCoordinator<S, T>
where
    S: KeyValueStore,
    T: CacheableEntity,
{
    pub(crate) fn new(aggregate: Arc<AggregateCache<S, T>>, stats: StatsRecorder) -> Self {
        Self { aggregate, stats }
    }

    /// Invalidate the aggregate slot because of `cause`.
    pub async fn invalidate(&self, cause: InvalidationCause) -> MarqueeResult<()> {
        tracing::info!(
            aggregate_key = self.aggregate.keys().aggregate_key(),
            cause = %cause,
            "Clear all entries for aggregate cache"
        );

        self.aggregate.invalidate().await?;
        self.stats.record(|s| s.invalidations += 1);
        Ok(())
    }
}
