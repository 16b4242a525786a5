//! Tracing subscriber initialization
//!
//! Installs a `tracing-subscriber` registry with an env-driven filter and a
//! JSON or human-readable fmt layer. Callers that embed the caches invoke
//! [`init_tracing`] once at startup; the caches themselves only emit events.

use std::str::FromStr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;

/// Default filter directive when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "marquee_storage=debug,info";

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::InvalidValue {
                field: "log_format".to_string(),
                value: other.to_string(),
                reason: "expected \"json\" or \"pretty\"".to_string(),
            }),
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event.
    pub service_name: String,
    /// Output format.
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is absent.
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "marquee".to_string(),
            format: LogFormat::default(),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create TelemetryConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MARQUEE_SERVICE_NAME`: Service name (default: "marquee")
    /// - `MARQUEE_LOG_FORMAT`: "json" or "pretty" (default: json)
    /// - `MARQUEE_LOG_FILTER`: Fallback filter when `RUST_LOG` is unset
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let service_name = std::env::var("MARQUEE_SERVICE_NAME").unwrap_or(defaults.service_name);

        let format = std::env::var("MARQUEE_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.format);

        let default_filter =
            std::env::var("MARQUEE_LOG_FILTER").unwrap_or(defaults.default_filter);

        Self {
            service_name,
            format,
            default_filter,
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };
    result.map_err(|e| ConfigError::Telemetry {
        reason: e.to_string(),
    })?;

    tracing::info!(
        service_name = %config.service_name,
        format = ?config.format,
        "Telemetry initialized"
    );

    Ok(())
}
