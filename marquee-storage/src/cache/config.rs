//! Cache key-space configuration.

use marquee_core::ConfigError;

use super::traits::CacheableEntity;

/// Configuration for the two-tier cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Namespace of the entity slots; keys are `<namespace>:<id>`.
    pub entity_namespace: String,
    /// Key of the single aggregate slot.
    pub aggregate_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entity_namespace: "movies".to_string(),
            aggregate_key: "all_movies".to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config derived from an entity's cache name: `<name>` and `all_<name>`.
    pub fn for_entity<T: CacheableEntity>() -> Self {
        let name = T::cache_name();
        Self {
            entity_namespace: name.to_string(),
            aggregate_key: format!("all_{}", name),
        }
    }

    /// Create CacheConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MARQUEE_ENTITY_NAMESPACE`: Entity key namespace (default: "movies")
    /// - `MARQUEE_AGGREGATE_KEY`: Aggregate slot key (default: "all_movies")
    ///
    /// The result is not validated here; [`CacheConfig::validate`] runs when
    /// a key space is built from it.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let entity_namespace = std::env::var("MARQUEE_ENTITY_NAMESPACE")
            .ok()
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.entity_namespace);

        let aggregate_key = std::env::var("MARQUEE_AGGREGATE_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.aggregate_key);

        Self {
            entity_namespace,
            aggregate_key,
        }
    }

    /// Set the entity namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.entity_namespace = namespace.into();
        self
    }

    /// Set the aggregate slot key.
    pub fn with_aggregate_key(mut self, key: impl Into<String>) -> Self {
        self.aggregate_key = key.into();
        self
    }

    /// Check that the key layout is usable.
    ///
    /// The aggregate key must sit outside the entity prefix, otherwise a
    /// rebuild would scan the aggregate slot as if it were an entity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_namespace.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "entity_namespace".to_string(),
            });
        }
        if self.entity_namespace.contains(':') {
            return Err(ConfigError::InvalidValue {
                field: "entity_namespace".to_string(),
                value: self.entity_namespace.clone(),
                reason: "must not contain ':'".to_string(),
            });
        }
        if self.aggregate_key.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "aggregate_key".to_string(),
            });
        }
        let prefix = format!("{}:", self.entity_namespace);
        if self.aggregate_key.starts_with(&prefix) {
            return Err(ConfigError::InvalidValue {
                field: "aggregate_key".to_string(),
                value: self.aggregate_key.clone(),
                reason: format!("overlaps the entity key prefix {}", prefix),
            });
        }
        Ok(())
    }
}
