//! Main configuration types.
//!
//! This module provides the top-level [`GraphviewConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, DataplaneSection, LabelersSection, LogFormat, PipelineSection, TelemetrySection,
};
use graphview_core::{Did, MAX_LABELERS};

/// Complete graphview configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use graphview_config::GraphviewConfig;
///
/// let config = GraphviewConfig::default();
/// assert_eq!(config.pipeline.default_limit, 50);
/// assert_eq!(config.dataplane.fetch_timeout_ms, 1000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct GraphviewConfig {
    /// Dataplane client configuration.
    #[serde(default)]
    pub dataplane: DataplaneSection,

    /// Pipeline deadlines and page sizes.
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Default label sources.
    #[serde(default)]
    pub labelers: LabelersSection,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl GraphviewConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> GraphviewConfigBuilder {
        GraphviewConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - a timeout is zero
    /// - `dataplane.fetch_timeout_ms` is not below `pipeline.request_timeout_ms`
    /// - `pipeline.default_limit` is zero or above `pipeline.max_limit`
    /// - a default labeler is not a DID, or there are more than 20
    /// - the metrics address is not a socket address while metrics are enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataplane.fetch_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "dataplane.fetch_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.pipeline.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        // A slow batch must degrade to absence before the request deadline fires.
        if self.dataplane.fetch_timeout_ms >= self.pipeline.request_timeout_ms {
            return Err(ConfigError::invalid_value(
                "dataplane.fetch_timeout_ms",
                format!(
                    "must be below pipeline.request_timeout_ms ({})",
                    self.pipeline.request_timeout_ms
                ),
            ));
        }

        if self.pipeline.max_limit == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.max_limit",
                "must be at least 1",
            ));
        }

        if self.pipeline.default_limit == 0 || self.pipeline.default_limit > self.pipeline.max_limit
        {
            return Err(ConfigError::invalid_value(
                "pipeline.default_limit",
                format!("must be between 1 and {}", self.pipeline.max_limit),
            ));
        }

        if let Some(bad) = self
            .labelers
            .default
            .iter()
            .find(|did| Did::parse(did.as_str()).is_err())
        {
            return Err(ConfigError::invalid_value(
                "labelers.default",
                format!("not a DID: {bad}"),
            ));
        }

        if self.labelers.default.len() > MAX_LABELERS {
            return Err(ConfigError::invalid_value(
                "labelers.default",
                format!("at most {MAX_LABELERS} labelers"),
            ));
        }

        if self.telemetry.metrics.enabled
            && self
                .telemetry
                .metrics
                .addr
                .parse::<std::net::SocketAddr>()
                .is_err()
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.addr",
                format!("invalid socket address: {}", self.telemetry.metrics.addr),
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging with source locations, metrics off, and generous
    /// timeouts for a local dataplane.
    ///
    /// # Example
    ///
    /// ```
    /// use graphview_config::GraphviewConfig;
    ///
    /// let config = GraphviewConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config.telemetry.metrics.enabled = false;
        config.telemetry.environment = "development".to_string();

        config.dataplane.fetch_timeout_ms = 5_000;
        config.pipeline.request_timeout_ms = 30_000;

        config
    }

    /// Create a production configuration preset.
    ///
    /// # Example
    ///
    /// ```
    /// use graphview_config::{GraphviewConfig, LogFormat};
    ///
    /// let config = GraphviewConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.metrics.enabled = true;
        config.telemetry.environment = "production".to_string();

        config
    }
}

/// Builder for [`GraphviewConfig`].
#[derive(Debug, Default)]
pub struct GraphviewConfigBuilder {
    dataplane: Option<DataplaneSection>,
    pipeline: Option<PipelineSection>,
    labelers: Option<LabelersSection>,
    telemetry: Option<TelemetrySection>,
}

impl GraphviewConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dataplane configuration.
    #[must_use]
    pub fn dataplane(mut self, dataplane: DataplaneSection) -> Self {
        self.dataplane = Some(dataplane);
        self
    }

    /// Set the pipeline configuration.
    #[must_use]
    pub fn pipeline(mut self, pipeline: PipelineSection) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the default label sources.
    #[must_use]
    pub fn labelers(mut self, labelers: LabelersSection) -> Self {
        self.labelers = Some(labelers);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> GraphviewConfig {
        GraphviewConfig {
            dataplane: self.dataplane.unwrap_or_default(),
            pipeline: self.pipeline.unwrap_or_default(),
            labelers: self.labelers.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<GraphviewConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
