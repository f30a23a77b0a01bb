//! The dataplane contract.

use crate::error::DataplaneError;
use graphview_core::{BoxFuture, Did, EntityKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Records returned by a fetch, keyed by id. Ids with no record are missing.
pub type Records = HashMap<String, serde_json::Value>;

/// One batched fetch: every id of a single kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBatch {
    /// Kind of the records to fetch.
    pub kind: EntityKind,
    /// Distinct ids to fetch.
    pub ids: Vec<String>,
    /// The viewer, for kinds that describe the viewer's relationship to a record.
    pub viewer: Option<Did>,
}

impl FetchBatch {
    /// Creates a batch without a viewer.
    #[must_use]
    pub fn new(kind: EntityKind, ids: Vec<String>) -> Self {
        Self {
            kind,
            ids,
            viewer: None,
        }
    }

    /// Returns this batch scoped to a viewer.
    #[must_use]
    pub fn with_viewer(mut self, viewer: Option<Did>) -> Self {
        self.viewer = viewer;
        self
    }
}

/// The name of an ordered, paged listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Listing(&'static str);

impl Listing {
    /// The lists an actor created, newest first.
    pub const ACTOR_LISTS: Self = Self("actor-lists");

    /// Creates a custom listing name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the listing name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A request for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Which listing to page through.
    pub listing: Listing,
    /// The owner of the listing (an actor DID).
    pub owner: String,
    /// Where the previous page ended.
    pub cursor: Option<String>,
    /// Maximum number of ids to return.
    pub limit: usize,
}

/// One page of ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdPage {
    /// Ids in listing order.
    pub ids: Vec<String>,
    /// Cursor for the next page; present only when more ids may follow.
    pub cursor: Option<String>,
}

impl IdPage {
    /// Creates a page. An empty cursor means "no more pages".
    #[must_use]
    pub fn new(ids: Vec<String>, cursor: Option<String>) -> Self {
        Self {
            ids,
            cursor: cursor.filter(|c| !c.is_empty()),
        }
    }

    /// An empty final page.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The batched storage backend.
///
/// Implementations must be cheap to share; the service holds one instance
/// behind an `Arc` for its whole lifetime and every request borrows it.
///
/// # Example
///
/// ```
/// use graphview_core::{BoxFuture, EntityKind};
/// use graphview_dataplane::{Dataplane, DataplaneError, FetchBatch, IdPage, ListingQuery, Records};
///
/// struct Offline;
///
/// impl Dataplane for Offline {
///     fn fetch_by_ids<'a>(&'a self, _batch: FetchBatch) -> BoxFuture<'a, Result<Records, DataplaneError>> {
///         Box::pin(async { Err(DataplaneError::Unreachable("offline".into())) })
///     }
///
///     fn list_ids<'a>(&'a self, _query: ListingQuery) -> BoxFuture<'a, Result<IdPage, DataplaneError>> {
///         Box::pin(async { Ok(IdPage::empty()) })
///     }
/// }
/// ```
pub trait Dataplane: Send + Sync + 'static {
    /// Fetches the records of one kind. Ids without a record are omitted
    /// from the result; no ordering is implied.
    fn fetch_by_ids<'a>(
        &'a self,
        batch: FetchBatch,
    ) -> BoxFuture<'a, Result<Records, DataplaneError>>;

    /// Fetches one page of an ordered listing.
    fn list_ids<'a>(&'a self, query: ListingQuery)
        -> BoxFuture<'a, Result<IdPage, DataplaneError>>;
}

impl<D: Dataplane + ?Sized> Dataplane for Arc<D> {
    fn fetch_by_ids<'a>(
        &'a self,
        batch: FetchBatch,
    ) -> BoxFuture<'a, Result<Records, DataplaneError>> {
        (**self).fetch_by_ids(batch)
    }

    fn list_ids<'a>(
        &'a self,
        query: ListingQuery,
    ) -> BoxFuture<'a, Result<IdPage, DataplaneError>> {
        (**self).list_ids(query)
    }
}
