//! JSON value codec for cache slots.
//!
//! Entity slots hold one JSON document, the aggregate slot holds a JSON array.
//! Decoding failures surface as [`StoreError::Deserialization`] carrying the
//! offending key, since they mean the store returned malformed data.

use marquee_core::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a value for storage under `key`.
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a value read from `key`.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Deserialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
