//! Request context types.
//!
//! The [`RequestContext`] carries the viewer and moderation settings of one
//! request through every pipeline stage. It is built once by the transport
//! layer and then only borrowed.

use crate::ids::Did;
use crate::labelers::LabelSources;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request ids sortable in logs.
///
/// # Example
///
/// ```
/// use graphview_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request state shared by reference across all pipeline stages.
///
/// # Example
///
/// ```
/// use graphview_core::{Did, RequestContext};
///
/// let viewer = Did::parse("did:plc:alice").unwrap();
/// let ctx = RequestContext::new().with_viewer(viewer);
/// assert!(ctx.viewer().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    viewer: Option<Did>,
    label_sources: LabelSources,
    include_takedowns: bool,
    started_at: Instant,
}

impl RequestContext {
    /// Creates an unauthenticated context with no label sources.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            viewer: None,
            label_sources: LabelSources::new(),
            include_takedowns: false,
            started_at: Instant::now(),
        }
    }

    /// Creates a context for testing purposes.
    #[must_use]
    pub fn mock() -> Self {
        Self::new()
    }

    /// Returns a new context for the given viewer.
    #[must_use]
    pub fn with_viewer(mut self, viewer: Did) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// Returns a new context with the given label sources.
    #[must_use]
    pub fn with_label_sources(mut self, label_sources: LabelSources) -> Self {
        self.label_sources = label_sources;
        self
    }

    /// Returns a new context that does or does not see taken-down content.
    #[must_use]
    pub fn with_include_takedowns(mut self, include: bool) -> Self {
        self.include_takedowns = include;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the authenticated viewer, if any.
    #[must_use]
    pub const fn viewer(&self) -> Option<&Did> {
        self.viewer.as_ref()
    }

    /// Returns the label sources active for this request.
    #[must_use]
    pub const fn label_sources(&self) -> &LabelSources {
        &self.label_sources
    }

    /// Returns `true` if taken-down content stays visible.
    #[must_use]
    pub const fn include_takedowns(&self) -> bool {
        self.include_takedowns
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_uniqueness() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_context_defaults() {
        let ctx = RequestContext::new();
        assert!(ctx.viewer().is_none());
        assert!(ctx.label_sources().is_empty());
        assert!(!ctx.include_takedowns());
    }

    #[test]
    fn test_context_builder() {
        let viewer = Did::parse("did:plc:alice").expect("valid did");
        let labeler = Did::parse("did:plc:mod").expect("valid did");
        let ctx = RequestContext::mock()
            .with_viewer(viewer.clone())
            .with_label_sources(LabelSources::new().with_source(labeler, true))
            .with_include_takedowns(true);

        assert_eq!(ctx.viewer(), Some(&viewer));
        assert!(ctx.label_sources().redacts("did:plc:mod"));
        assert!(ctx.include_takedowns());
    }

    #[test]
    fn test_clone_keeps_request_id() {
        let ctx = RequestContext::new();
        let copy = ctx.clone();
        assert_eq!(ctx.request_id(), copy.request_id());
    }
}
