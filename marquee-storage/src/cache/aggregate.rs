//! Aggregate cache: the single-slot "all entities" view.
//!
//! The slot is never written independently of the entity cache. On a miss it
//! is rebuilt by scanning the entity key space, and it is only stored when the
//! rebuild found at least one entity, so a transient empty scan (for example
//! one racing a concurrent clear) is never cached as the answer.

use std::marker::PhantomData;
use std::sync::Arc;

use marquee_core::MarqueeResult;

use super::keys::KeySpace;
use super::traits::{CacheableEntity, StatsRecorder};
use crate::store::{codec, KeyValueStore};

/// Single-slot cache holding the materialized list of every cached entity.
pub struct AggregateCache<S, T>
where
    S: KeyValueStore,
    T: CacheableEntity,
{
    store: Arc<S>,
    keys: KeySpace,
    stats: StatsRecorder,
    _entity: PhantomData<fn() -> T>,
}

impl<S, T> AggregateCache<S, T>
where
    S: KeyValueStore,
    T: CacheableEntity,
{
    pub(crate) fn new(store: Arc<S>, keys: KeySpace, stats: StatsRecorder) -> Self {
        Self {
            store,
            keys,
            stats,
            _entity: PhantomData,
        }
    }

    /// Key layout this cache reads and writes.
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Return every cached entity.
    ///
    /// A populated slot is returned as-is. Otherwise the entity key space is
    /// scanned and the result stored in the slot if it is non-empty. Order is
    /// the store's scan order.
    pub async fn get_all(&self) -> MarqueeResult<Vec<T>> {
        let slot_key = self.keys.aggregate_key();
        if let Some(bytes) = self.store.get(slot_key).await? {
            let entities: Vec<T> = codec::decode(slot_key, &bytes)?;
            if !entities.is_empty() {
                self.stats.record(|s| s.aggregate_hits += 1);
                return Ok(entities);
            }
            tracing::debug!(aggregate_key = slot_key, "Ignoring empty aggregate snapshot");
        }

        self.rebuild().await
    }

    async fn rebuild(&self) -> MarqueeResult<Vec<T>> {
        tracing::info!(cache = self.keys.namespace(), "Get all cached entities");

        let slot_key = self.keys.aggregate_key();
        let keys = self.store.scan_prefix(self.keys.entity_prefix()).await?;

        let mut entities = Vec::with_capacity(keys.len());
        for key in &keys {
            if self.keys.parse_entity_key(key).is_none() {
                tracing::warn!(key = %key, "Skipping key without a valid identifier");
                continue;
            }
            match self.store.get(key).await? {
                Some(bytes) => entities.push(codec::decode::<T>(key, &bytes)?),
                // Evicted between the scan and the read.
                None => tracing::debug!(key = %key, "Entry vanished during rebuild"),
            }
        }

        self.stats.record(|s| s.aggregate_rebuilds += 1);

        if entities.is_empty() {
            tracing::debug!(
                aggregate_key = slot_key,
                "Rebuild found no entities, aggregate slot left empty"
            );
            return Ok(entities);
        }

        let bytes = codec::encode(slot_key, &entities)?;
        self.store.set(slot_key, bytes).await?;
        tracing::debug!(
            aggregate_key = slot_key,
            count = entities.len(),
            "Aggregate slot rebuilt"
        );

        Ok(entities)
    }

    /// Drop the aggregate slot.
    ///
    /// Returns `true` if a snapshot was removed. An already absent slot is
    /// success; any other store failure is returned to the caller.
    pub async fn invalidate(&self) -> MarqueeResult<bool> {
        let slot_key = self.keys.aggregate_key();
        let removed = self.store.delete(slot_key).await?;
        if !removed {
            tracing::debug!(aggregate_key = slot_key, "Aggregate slot already absent");
        }
        Ok(removed)
    }
}
