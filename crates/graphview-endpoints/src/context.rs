//! Process-wide application context.

use graphview_config::GraphviewConfig;
use graphview_core::{Did, LabelSources, RequestContext, ServiceError};
use graphview_dataplane::{Dataplane, DataplaneError};
use graphview_hydration::Hydrator;
use graphview_pipeline::Limit;
use graphview_views::Views;
use std::fmt;
use std::sync::Arc;

/// Everything an endpoint needs, built once at startup and passed to every
/// handler by reference.
#[derive(Clone)]
pub struct AppContext {
    /// The dataplane client, for skeleton listings.
    pub dataplane: Arc<dyn Dataplane>,
    /// The hydrator, sharing the same dataplane.
    pub hydrator: Hydrator,
    /// The view renderer.
    pub views: Views,
    /// Loaded configuration.
    pub config: Arc<GraphviewConfig>,
}

impl AppContext {
    /// Builds the context around a dataplane client.
    pub fn new(dataplane: Arc<dyn Dataplane>, config: GraphviewConfig) -> Self {
        let hydrator = Hydrator::new(Arc::clone(&dataplane))
            .with_fetch_timeout(config.dataplane.fetch_timeout());
        Self {
            dataplane,
            hydrator,
            views: Views::new(),
            config: Arc::new(config),
        }
    }

    /// Builds the per-request context from what the transport layer
    /// extracted: the authenticated viewer and the raw
    /// `atproto-accept-labelers` header.
    #[must_use]
    pub fn request_context(
        &self,
        viewer: Option<Did>,
        accept_labelers: Option<&str>,
    ) -> RequestContext {
        let defaults = self.config.labelers.default_dids();
        let ctx = RequestContext::new()
            .with_label_sources(LabelSources::from_request(accept_labelers, &defaults));
        match viewer {
            Some(viewer) => ctx.with_viewer(viewer),
            None => ctx,
        }
    }

    /// Resolves a requested page size against the configured bounds.
    #[must_use]
    pub fn limit(&self, requested: Option<usize>) -> Limit {
        Limit::resolve(
            requested,
            self.config.pipeline.default_limit,
            self.config.pipeline.max_limit,
        )
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("hydrator", &self.hydrator)
            .field("views", &self.views)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Maps a failed skeleton listing to the error the request fails with.
///
/// A skeleton is a single listing call, so its failure leaves nothing to
/// degrade to.
pub(crate) fn listing_failure(err: DataplaneError) -> ServiceError {
    tracing::warn!(error = %err, "skeleton listing failed");
    ServiceError::unavailable(format!("listing failed: {err}"))
}
