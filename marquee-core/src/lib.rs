//! MARQUEE Core - Entity Types
//!
//! Pure data structures shared by every MARQUEE crate: the cached entity,
//! its identifier, the error taxonomy, and the tracing bootstrap.
//! This crate contains no caching logic.

pub mod entity;
pub mod error;
pub mod telemetry;

pub use entity::{EntityId, Movie};
pub use error::{BackendError, ConfigError, MarqueeError, MarqueeResult, StoreError};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};
