//! Two-tier cache with aggregate invalidation.
//!
//! Entities live in per-identifier slots (`movies:15`). A single aggregate
//! slot (`all_movies`) holds the materialized list of every cached entity and
//! is rebuilt from the entity slots on demand.
//!
//! # Consistency
//!
//! The aggregate slot is dropped before every entity-cache miss, put, evict
//! and clear, through the [`InvalidationCoordinator`]. Entity hits leave it
//! alone. An empty rebuild is never stored, so `list_all` re-scans until at
//! least one entity is cached.
//!
//! # Example
//!
//! ```ignore
//! let catalog = MovieCatalog::with_defaults(store, source)?;
//!
//! catalog.put(movie).await?;                 // drops "all_movies"
//! let all = catalog.list_all().await?;       // rebuilds and stores it
//! let same = catalog.get(movie_id).await?;   // hit, "all_movies" kept
//! ```

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod entity;
pub mod invalidation;
pub mod keys;
pub mod traits;

pub use aggregate::AggregateCache;
pub use catalog::{CachedCatalog, MovieCatalog};
pub use config::CacheConfig;
pub use entity::EntityCache;
pub use invalidation::{InvalidationCause, InvalidationCoordinator};
pub use keys::KeySpace;
pub use traits::{CacheStats, CacheableEntity};
