//! Key layout shared by the entity and aggregate caches.
//!
//! A `KeySpace` can only be built from a validated [`CacheConfig`], so every
//! component holding one agrees on a layout where the aggregate slot never
//! falls inside the entity prefix.

use marquee_core::{ConfigError, EntityId};

use super::config::CacheConfig;

/// Separator between the namespace and the identifier of an entity key.
const SEPARATOR: char = ':';

/// Validated key layout.
///
/// # Format
///
/// - Entity slot: `<namespace>:<id>`, e.g. `movies:15`
/// - Aggregate slot: a single fixed key, e.g. `all_movies`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    /// Private inner data - cannot be constructed externally
    inner: KeySpaceInner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KeySpaceInner {
    namespace: String,
    prefix: String,
    aggregate_key: String,
}

impl KeySpace {
    /// Build the key layout described by `config`.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: KeySpaceInner {
                namespace: config.entity_namespace.clone(),
                prefix: format!("{}{}", config.entity_namespace, SEPARATOR),
                aggregate_key: config.aggregate_key.clone(),
            },
        })
    }

    /// Entity namespace, used as the cache name in log events.
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Prefix shared by every entity key.
    pub fn entity_prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Key of the aggregate slot.
    pub fn aggregate_key(&self) -> &str {
        &self.inner.aggregate_key
    }

    /// Key of the entity slot for `id`.
    pub fn entity_key(&self, id: EntityId) -> String {
        format!("{}{}", self.inner.prefix, id)
    }

    /// Recover the identifier from an entity key.
    ///
    /// Returns `None` if the key is outside the entity prefix or its suffix is
    /// not a canonical integer (so `movies:015` and `movies:+1` are rejected).
    pub fn parse_entity_key(&self, key: &str) -> Option<EntityId> {
        let suffix = key.strip_prefix(self.inner.prefix.as_str())?;
        let id = suffix.parse::<EntityId>().ok()?;
        (id.to_string() == suffix).then_some(id)
    }
}
