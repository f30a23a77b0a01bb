//! # Graphview
//!
//! **The read path of a social-graph appview**
//!
//! Every read endpoint runs the same four stages in a fixed order:
//!
//! ```text
//! params → Skeleton → Hydration → Rules → Presentation → { items, cursor }
//!             │           │
//!        list_ids    fetch_by_ids (batched, per kind, concurrent)
//!             └─────┬─────┘
//!               Dataplane
//! ```
//!
//! - [`pipeline`] runs the stages and enforces the contracts between them
//! - [`hydration`] turns ids into records with one batched fetch per kind
//! - [`views`] renders hydrated records
//! - [`endpoints`] assembles `getLists` and `getProfiles` from the stages
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphview::prelude::*;
//! use std::sync::Arc;
//!
//! let config = ConfigLoader::new().with_file("graphview.toml").with_env_prefix("GRAPHVIEW").load()?;
//! let app = graphview::start(Arc::new(MemoryDataplane::new()), config)?;
//!
//! let ctx = app.request_context(None, Some("did:plc:moderator;redact"));
//! let output = get_lists(&app, GetListsParams { actor: "did:plc:alice".into(), ..Default::default() }, &ctx).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/graphview/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;
use thiserror::Error;

// Re-export core types
pub use graphview_core as core;

// Re-export the dataplane contract
pub use graphview_dataplane as dataplane;

// Re-export the hydration engine
pub use graphview_hydration as hydration;

// Re-export the pipeline runner
pub use graphview_pipeline as pipeline;

// Re-export views
pub use graphview_views as views;

// Re-export endpoints
pub use graphview_endpoints as endpoints;

// Re-export configuration
pub use graphview_config as config;

// Re-export telemetry
pub use graphview_telemetry as telemetry;

/// Startup failure.
#[derive(Debug, Error)]
pub enum StartError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] graphview_config::ConfigError),

    /// Logging or metrics could not be initialized.
    #[error("telemetry initialization failed: {0}")]
    Telemetry(#[from] graphview_telemetry::TelemetryError),
}

/// Validates the configuration, initializes telemetry and builds the
/// application context every handler receives.
///
/// Call once per process; telemetry installs global state.
///
/// # Errors
///
/// Returns [`StartError`] if the configuration is invalid or telemetry
/// cannot be initialized.
pub fn start(
    dataplane: Arc<dyn graphview_dataplane::Dataplane>,
    config: graphview_config::GraphviewConfig,
) -> Result<graphview_endpoints::AppContext, StartError> {
    config.validate()?;
    graphview_telemetry::init_telemetry(&config.telemetry.to_telemetry_config())?;

    tracing::info!(
        fetch_timeout_ms = config.dataplane.fetch_timeout_ms,
        request_timeout_ms = config.pipeline.request_timeout_ms,
        default_labelers = config.labelers.default.len(),
        "graphview started"
    );
    Ok(graphview_endpoints::AppContext::new(dataplane, config))
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use graphview::prelude::*;
/// ```
pub mod prelude {
    pub use graphview_core::{
        AtUri, BoxFuture, Did, EntityKind, EntityRef, ErrorCategory, LabelSources,
        RequestContext, RequestId, ServiceError, ServiceResult,
    };

    pub use graphview_dataplane::{Dataplane, DataplaneError, MemoryDataplane};

    pub use graphview_hydration::{HydrationRequest, HydrationState, Hydrator, Lookup};

    pub use graphview_pipeline::{no_rules, Limit, Page, Pipeline, SkeletonState};

    pub use graphview_views::{ListView, ProfileViewBasic, Views};

    pub use graphview_endpoints::{
        get_lists, get_profiles, moderation_rules, AppContext, GetListsOutput, GetListsParams,
        GetProfilesOutput, GetProfilesParams, XrpcOutput,
    };

    pub use graphview_config::{ConfigLoader, GraphviewConfig};

    pub use graphview_telemetry::{init_telemetry, TelemetryConfig};
}
