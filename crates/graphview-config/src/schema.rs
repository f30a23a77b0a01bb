//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use graphview_core::Did;
use graphview_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dataplane client configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DataplaneSection {
    /// Timeout for one batched fetch, in milliseconds. A batch that exceeds
    /// it degrades to absence for its ids.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,
}

impl DataplaneSection {
    /// Returns the per-batch fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for DataplaneSection {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    1000
}

/// Pipeline configuration section.
///
/// # Example
///
/// ```
/// use graphview_config::PipelineSection;
///
/// let config = PipelineSection {
///     default_limit: 25,
///     ..Default::default()
/// };
/// assert_eq!(config.max_limit, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Deadline for a whole pipeline run, in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Page size when a request names none.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Largest page size a request may ask for.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl PipelineSection {
    /// Returns the pipeline deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_limit() -> usize {
    50
}

fn default_max_limit() -> usize {
    100
}

/// Label source configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LabelersSection {
    /// Labeler DIDs applied when a request names none. Applied as redacting
    /// sources.
    #[serde(default)]
    pub default: Vec<String>,
}

impl LabelersSection {
    /// Returns the default labelers that parse as DIDs.
    #[must_use]
    pub fn default_dids(&self) -> Vec<Did> {
        self.default
            .iter()
            .filter_map(|did| Did::parse(did).ok())
            .collect()
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Enable metrics collection and export.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus scrape endpoint address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name for telemetry identification.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl TelemetrySection {
    /// Converts this section into the telemetry crate's configuration.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let pretty = self.logging.format == LogFormat::Pretty;
        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .environment(&self.environment)
            .logging(LogConfig {
                enabled: self.logging.enabled,
                level: self.logging.level.clone(),
                json_format: !pretty,
                span_events: pretty,
                file_line_info: self.logging.include_location,
            })
            .metrics(MetricsConfig {
                enabled: self.metrics.enabled,
                addr: self.metrics.addr.clone(),
                ..MetricsConfig::default()
            })
            .build()
    }
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

fn default_service_name() -> String {
    "graphview".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}
