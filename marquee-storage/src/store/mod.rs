//! Key-value store adapters.
//!
//! [`KeyValueStore`] is the only way the caches reach the shared store.
//! Two adapters ship with the crate: [`InMemoryStore`] for tests and
//! embedded use, and [`LmdbStore`] for a persistent memory-mapped store.

pub mod codec;
pub mod lmdb;
pub mod memory;
pub mod traits;

pub use lmdb::{LmdbStore, LmdbStoreConfig, LmdbStoreError};
pub use memory::InMemoryStore;
pub use traits::{KeyValueStore, StoreResult};
