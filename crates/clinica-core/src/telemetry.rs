//! Logging initialisation.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human-readable or a JSON fmt layer. `RUST_LOG` overrides the configured
//! level when set.

use serde::{Deserialize, Serialize};

#[cfg(feature = "telemetry")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directive used when neither `RUST_LOG` nor a level is supplied.
pub const DEFAULT_FILTER: &str = "info,clinica=debug,tower_http=debug";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output with targets.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level, e.g. `info` or `debug`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive derived from the configured level.
    ///
    /// Workspace crates and `tower_http` log one level more verbosely than
    /// the base level when the base level is `info`.
    #[must_use]
    pub fn directive(&self) -> String {
        if self.level.eq_ignore_ascii_case("info") {
            DEFAULT_FILTER.to_string()
        } else {
            self.level.to_lowercase()
        }
    }
}

/// Installs the global subscriber.
///
/// Calling this twice is harmless: the second install is ignored.
#[cfg(feature = "telemetry")]
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(format = ?config.format, level = %config.level, "Logging initialized");
    }
}

/// No-op when the `telemetry` feature is disabled.
#[cfg(not(feature = "telemetry"))]
pub fn init_logging(_config: &LoggingConfig) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.directive(), DEFAULT_FILTER);
    }

    #[test]
    fn test_custom_level_directive() {
        let config = LoggingConfig {
            level: "WARN".to_string(),
            format: LogFormat::Json,
        };
        assert_eq!(config.directive(), "warn");
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
