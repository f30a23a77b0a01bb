//! In-memory dataplane.

use crate::client::{Dataplane, FetchBatch, IdPage, Listing, ListingQuery, Records};
use crate::error::DataplaneError;
use graphview_core::{AtUri, BoxFuture, Did, EntityKind};
use indexmap::IndexSet;
use parking_lot::RwLock;
use std::collections::HashMap;

type RecordKey = (EntityKind, Option<String>, String);

/// A dataplane backed by in-process maps.
///
/// Records are stored per kind, optionally scoped to a viewer. Listings keep
/// insertion order; the cursor of a page is the record key (rkey) of its last
/// id, so a page continues after the item the cursor names.
///
/// # Example
///
/// ```
/// use graphview_core::EntityKind;
/// use graphview_dataplane::{Dataplane, FetchBatch, MemoryDataplane};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let dataplane = MemoryDataplane::new();
/// dataplane.put(EntityKind::ACTOR, "did:plc:alice", json!({"did": "did:plc:alice"}));
///
/// let batch = FetchBatch::new(EntityKind::ACTOR, vec!["did:plc:alice".into(), "did:plc:bob".into()]);
/// let records = dataplane.fetch_by_ids(batch).await.unwrap();
/// assert_eq!(records.len(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryDataplane {
    records: RwLock<HashMap<RecordKey, serde_json::Value>>,
    listings: RwLock<HashMap<(Listing, String), IndexSet<String>>>,
}

impl MemoryDataplane {
    /// Creates an empty dataplane.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record visible to every viewer.
    pub fn put(&self, kind: EntityKind, id: impl Into<String>, record: serde_json::Value) {
        self.records.write().insert((kind, None, id.into()), record);
    }

    /// Stores a record visible only to `viewer`.
    pub fn put_for_viewer(
        &self,
        kind: EntityKind,
        viewer: &Did,
        id: impl Into<String>,
        record: serde_json::Value,
    ) {
        self.records
            .write()
            .insert((kind, Some(viewer.to_string()), id.into()), record);
    }

    /// Removes a record.
    pub fn delete(&self, kind: EntityKind, id: &str) {
        self.records
            .write()
            .retain(|(k, _, key), _| !(*k == kind && key == id));
    }

    /// Appends an id to an owner's listing. Duplicates are ignored.
    pub fn push_listing(&self, listing: Listing, owner: impl Into<String>, id: impl Into<String>) {
        self.listings
            .write()
            .entry((listing, owner.into()))
            .or_default()
            .insert(id.into());
    }

    fn fetch_now(&self, batch: &FetchBatch) -> Records {
        let records = self.records.read();
        let viewer = batch.viewer.as_ref().map(ToString::to_string);
        batch
            .ids
            .iter()
            .filter_map(|id| {
                records
                    .get(&(batch.kind, viewer.clone(), id.clone()))
                    .or_else(|| records.get(&(batch.kind, None, id.clone())))
                    .map(|record| (id.clone(), record.clone()))
            })
            .collect()
    }

    fn list_now(&self, query: &ListingQuery) -> IdPage {
        let listings = self.listings.read();
        let Some(ids) = listings.get(&(query.listing, query.owner.clone())) else {
            return IdPage::empty();
        };

        let start = match &query.cursor {
            None => 0,
            Some(cursor) => match ids.iter().position(|id| cursor_token(id) == cursor) {
                Some(pos) => pos + 1,
                None => return IdPage::empty(),
            },
        };

        let page: Vec<String> = ids.iter().skip(start).take(query.limit).cloned().collect();
        let more = start + page.len() < ids.len();
        let cursor = if more && !page.is_empty() {
            page.last().map(|id| cursor_token(id).to_string())
        } else {
            None
        };
        IdPage::new(page, cursor)
    }
}

fn cursor_token(id: &str) -> &str {
    match AtUri::parse(id) {
        Ok(uri) => match uri.rkey() {
            Some(rkey) => &id[id.len() - rkey.len()..],
            None => id,
        },
        Err(_) => id,
    }
}

impl Dataplane for MemoryDataplane {
    fn fetch_by_ids<'a>(
        &'a self,
        batch: FetchBatch,
    ) -> BoxFuture<'a, Result<Records, DataplaneError>> {
        Box::pin(async move {
            let records = self.fetch_now(&batch);
            tracing::trace!(
                kind = %batch.kind,
                requested = batch.ids.len(),
                found = records.len(),
                "memory dataplane fetch"
            );
            Ok(records)
        })
    }

    fn list_ids<'a>(
        &'a self,
        query: ListingQuery,
    ) -> BoxFuture<'a, Result<IdPage, DataplaneError>> {
        Box::pin(async move {
            let page = self.list_now(&query);
            tracing::trace!(
                listing = %query.listing,
                owner = %query.owner,
                returned = page.ids.len(),
                "memory dataplane listing"
            );
            Ok(page)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list_uri(rkey: &str) -> String {
        format!("at://did:plc:alice/app.bsky.graph.list/{rkey}")
    }

    fn seeded(n: usize) -> MemoryDataplane {
        let dp = MemoryDataplane::new();
        for i in 1..=n {
            dp.push_listing(Listing::ACTOR_LISTS, "did:plc:alice", list_uri(&i.to_string()));
        }
        dp
    }

    fn query(cursor: Option<&str>, limit: usize) -> ListingQuery {
        ListingQuery {
            listing: Listing::ACTOR_LISTS,
            owner: "did:plc:alice".into(),
            cursor: cursor.map(Into::into),
            limit,
        }
    }

    #[tokio::test]
    async fn test_fetch_omits_missing() {
        let dp = MemoryDataplane::new();
        dp.put(EntityKind::LIST, "a", json!({"name": "a"}));
        let records = dp
            .fetch_by_ids(FetchBatch::new(EntityKind::LIST, vec!["a".into(), "b".into()]))
            .await
            .expect("fetch should work");
        assert_eq!(records.len(), 1);
        assert_eq!(records["a"]["name"], "a");
    }

    #[tokio::test]
    async fn test_viewer_scoped_records() {
        let dp = MemoryDataplane::new();
        let alice = Did::parse("did:plc:alice").expect("valid did");
        let bob = Did::parse("did:plc:bob").expect("valid did");
        dp.put_for_viewer(EntityKind::LIST_VIEWER, &alice, "l", json!({"muted": true}));

        let for_alice = dp
            .fetch_by_ids(
                FetchBatch::new(EntityKind::LIST_VIEWER, vec!["l".into()]).with_viewer(Some(alice)),
            )
            .await
            .expect("fetch should work");
        assert_eq!(for_alice.len(), 1);

        let for_bob = dp
            .fetch_by_ids(
                FetchBatch::new(EntityKind::LIST_VIEWER, vec!["l".into()]).with_viewer(Some(bob)),
            )
            .await
            .expect("fetch should work");
        assert!(for_bob.is_empty());
    }

    #[tokio::test]
    async fn test_listing_pages() {
        let dp = seeded(3);

        let first = dp.list_ids(query(None, 2)).await.expect("list should work");
        assert_eq!(first.ids, vec![list_uri("1"), list_uri("2")]);
        assert_eq!(first.cursor.as_deref(), Some("2"));

        let second = dp
            .list_ids(query(first.cursor.as_deref(), 2))
            .await
            .expect("list should work");
        assert_eq!(second.ids, vec![list_uri("3")]);
        assert!(second.cursor.is_none());
    }

    #[tokio::test]
    async fn test_exact_page_has_no_cursor() {
        let dp = seeded(2);
        let page = dp.list_ids(query(None, 2)).await.expect("list should work");
        assert_eq!(page.ids.len(), 2);
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_empty() {
        let dp = seeded(3);
        let page = dp.list_ids(query(Some("zzz"), 10)).await.expect("list should work");
        assert!(page.ids.is_empty());
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn test_unknown_owner_is_empty() {
        let dp = seeded(1);
        let mut q = query(None, 10);
        q.owner = "did:plc:nobody".into();
        assert_eq!(dp.list_ids(q).await.expect("list should work"), IdPage::empty());
    }

    #[test]
    fn test_delete() {
        let dp = MemoryDataplane::new();
        dp.put(EntityKind::ACTOR, "did:plc:a", json!({}));
        dp.delete(EntityKind::ACTOR, "did:plc:a");
        assert!(dp.records.read().is_empty());
    }
}
