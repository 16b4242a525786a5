//! Key-value store adapter trait.
//!
//! The caches never talk to a concrete store. They go through
//! [`KeyValueStore`], which exposes the handful of per-key operations the
//! two-tier protocol needs over string keys and opaque byte values.

use async_trait::async_trait;
use marquee_core::StoreError;

/// Result alias for store adapter operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Adapter over an external key-value store.
///
/// Implementations must be safe to share between concurrent callers. Each
/// method is atomic for the key(s) it touches; no multi-key transactions are
/// assumed by callers.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Remove `key`.
    ///
    /// Returns `true` if a value was removed and `false` if the key was
    /// already absent. Absence is not an error.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Remove every key starting with `prefix`, returning how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64>;

    /// List every key starting with `prefix`. Order is unspecified.
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}
