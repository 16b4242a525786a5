//! LMDB-backed key-value store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a persistent,
//! memory-mapped store for the entity and aggregate cache slots.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses:
//! - Read transactions for `get` and `scan_prefix`
//! - Write transactions for `set`, `delete`, and `delete_prefix`
//!
//! `delete_prefix` collects and removes the matching keys inside a single
//! write transaction, so a concurrent reader sees either all of them or none.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use marquee_core::{ConfigError, StoreError};

use super::traits::{KeyValueStore, StoreResult};

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A stored key is not valid UTF-8.
    #[error("Invalid key encoding: {0}")]
    KeyEncoding(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for StoreError {
    fn from(e: LmdbStoreError) -> Self {
        match e {
            LmdbStoreError::Transaction(reason) => StoreError::TransactionFailed { reason },
            LmdbStoreError::KeyEncoding(reason) => StoreError::Deserialization {
                key: "<non-utf8>".to_string(),
                reason,
            },
            other => StoreError::Unavailable {
                reason: other.to_string(),
            },
        }
    }
}

/// Location and sizing of an LMDB store.
#[derive(Debug, Clone)]
pub struct LmdbStoreConfig {
    /// Directory holding the LMDB files.
    pub path: PathBuf,
    /// Maximum size of the memory map in megabytes.
    pub max_size_mb: usize,
}

impl LmdbStoreConfig {
    pub fn new(path: impl Into<PathBuf>, max_size_mb: usize) -> Self {
        Self {
            path: path.into(),
            max_size_mb,
        }
    }

    /// Create LmdbStoreConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MARQUEE_LMDB_PATH`: Directory for the LMDB files (required)
    /// - `MARQUEE_LMDB_MAX_SIZE_MB`: Map size in megabytes (default: 64)
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("MARQUEE_LMDB_PATH").map_err(|_| ConfigError::MissingRequired {
            field: "MARQUEE_LMDB_PATH".to_string(),
        })?;

        let max_size_mb = match std::env::var("MARQUEE_LMDB_MAX_SIZE_MB") {
            Ok(raw) => Self::parse_max_size(&raw)?,
            Err(_) => 64,
        };

        Ok(Self::new(path, max_size_mb))
    }

    fn parse_max_size(raw: &str) -> Result<usize, ConfigError> {
        match raw.trim().parse::<usize>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(ConfigError::InvalidValue {
                field: "MARQUEE_LMDB_MAX_SIZE_MB".to_string(),
                value: raw.to_string(),
                reason: "must be a positive integer".to_string(),
            }),
        }
    }
}

/// LMDB-backed key-value store.
///
/// # Example
///
/// ```ignore
/// let store = LmdbStore::new("/tmp/marquee", 64)?;
/// store.set("movies:15", bytes).await?;
/// let keys = store.scan_prefix("movies:").await?;
/// ```
pub struct LmdbStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open (or create) an LMDB store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB store");

        Ok(Self { env, db })
    }

    /// Open a store from an [`LmdbStoreConfig`].
    pub fn open(config: &LmdbStoreConfig) -> Result<Self, LmdbStoreError> {
        Self::new(&config.path, config.max_size_mb)
    }

    /// Iterate over keys matching a prefix and collect them.
    fn collect_keys_with_prefix(
        &self,
        txn: &RoTxn,
        prefix: &[u8],
    ) -> Result<Vec<Vec<u8>>, LmdbStoreError> {
        let iter = self
            .db
            .iter(txn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let mut keys = Vec::new();
        for result in iter {
            let (key, _) = result.map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
            if key.starts_with(prefix) {
                keys.push(key.to_vec());
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl KeyValueStore for LmdbStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let value = self
            .db
            .get(&rtxn, key.as_bytes())
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(value.map(|bytes| bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, key.as_bytes(), &value)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let deleted = self
            .db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(deleted)
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let keys_to_delete = self.collect_keys_with_prefix(&wtxn, prefix.as_bytes())?;

        let mut deleted = 0u64;
        for key in &keys_to_delete {
            if self
                .db
                .delete(&mut wtxn, key)
                .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?
            {
                deleted += 1;
            }
        }

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(deleted)
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let keys = self.collect_keys_with_prefix(&rtxn, prefix.as_bytes())?;

        keys.into_iter()
            .map(|key| {
                String::from_utf8(key)
                    .map_err(|e| StoreError::from(LmdbStoreError::KeyEncoding(e.to_string())))
            })
            .collect()
    }
}
