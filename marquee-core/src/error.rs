//! Error types for MARQUEE operations

use crate::EntityId;
use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Serialization failed for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Malformed value under key {key}: {reason}")]
    Deserialization { key: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Backend collaborator errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend lookup for id {id} failed: {reason}")]
    LookupFailed { id: EntityId, reason: String },

    #[error("Backend lookup for id {id} timed out after {timeout_ms}ms")]
    Timeout { id: EntityId, timeout_ms: u64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Telemetry initialization failed: {reason}")]
    Telemetry { reason: String },
}

/// Master error type for all MARQUEE errors.
#[derive(Debug, Clone, Error)]
pub enum MarqueeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for MARQUEE operations.
pub type MarqueeResult<T> = Result<T, MarqueeError>;

// =============================================================================
// TESTS
// =============================================================================
