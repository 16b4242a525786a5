//! Marquee Storage - Two-Tier Entity Cache
//!
//! Cache-aside storage for catalog entities over a pluggable key-value store,
//! with an aggregate "all entities" view kept consistent by invalidation.

pub mod cache;
pub mod source;
pub mod store;

pub use cache::{
    AggregateCache, CacheConfig, CacheStats, CacheableEntity, CachedCatalog, EntityCache,
    InvalidationCause, InvalidationCoordinator, KeySpace, MovieCatalog,
};
pub use source::{EntitySource, FakeMovieSource};
pub use store::{
    InMemoryStore, KeyValueStore, LmdbStore, LmdbStoreConfig, LmdbStoreError, StoreResult,
};
