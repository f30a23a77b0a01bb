//! A dataplane double that records calls and injects faults.

use graphview_core::{BoxFuture, EntityKind};
use graphview_dataplane::{Dataplane, DataplaneError, FetchBatch, IdPage, ListingQuery, Records};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A failure to inject into dataplane calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The dataplane cannot be reached.
    Unreachable,
    /// The dataplane answers with an error.
    Backend,
    /// The dataplane answers with garbage.
    Malformed,
}

impl Fault {
    fn to_error(self, what: &str) -> DataplaneError {
        match self {
            Self::Unreachable => DataplaneError::Unreachable(format!("injected: {what}")),
            Self::Backend => DataplaneError::Backend(format!("injected: {what}")),
            Self::Malformed => DataplaneError::Malformed(format!("injected: {what}")),
        }
    }
}

#[derive(Default)]
struct Script {
    fetch_faults: HashMap<EntityKind, Fault>,
    all_fault: Option<Fault>,
    listing_fault: Option<Fault>,
    delays: HashMap<EntityKind, Duration>,
}

/// Wraps a dataplane, logging every call and failing or delaying calls on
/// request.
///
/// # Example
///
/// ```
/// use graphview_core::EntityKind;
/// use graphview_dataplane::{Dataplane, FetchBatch, MemoryDataplane};
/// use graphview_test::{Fault, RecordingDataplane};
///
/// # tokio_test::block_on(async {
/// let dataplane = RecordingDataplane::new(MemoryDataplane::new());
/// dataplane.fail_kind(EntityKind::ACTOR, Fault::Backend);
///
/// let result = dataplane
///     .fetch_by_ids(FetchBatch::new(EntityKind::ACTOR, vec!["did:plc:a".into()]))
///     .await;
/// assert!(result.is_err());
/// assert_eq!(dataplane.fetch_count(EntityKind::ACTOR), 1);
/// # });
/// ```
pub struct RecordingDataplane {
    inner: Arc<dyn Dataplane>,
    fetches: Mutex<Vec<FetchBatch>>,
    listings: Mutex<Vec<ListingQuery>>,
    script: Mutex<Script>,
}

impl RecordingDataplane {
    /// Wraps a dataplane.
    pub fn new(inner: impl Dataplane) -> Self {
        Self {
            inner: Arc::new(inner),
            fetches: Mutex::new(Vec::new()),
            listings: Mutex::new(Vec::new()),
            script: Mutex::new(Script::default()),
        }
    }

    /// Fails every fetch of `kind`.
    pub fn fail_kind(&self, kind: EntityKind, fault: Fault) {
        self.script.lock().fetch_faults.insert(kind, fault);
    }

    /// Fails every fetch and listing call.
    pub fn fail_all(&self, fault: Fault) {
        let mut script = self.script.lock();
        script.all_fault = Some(fault);
        script.listing_fault = Some(fault);
    }

    /// Fails every listing call.
    pub fn fail_listings(&self, fault: Fault) {
        self.script.lock().listing_fault = Some(fault);
    }

    /// Delays every fetch of `kind`.
    pub fn delay_kind(&self, kind: EntityKind, delay: Duration) {
        self.script.lock().delays.insert(kind, delay);
    }

    /// Removes all injected faults and delays.
    pub fn heal(&self) {
        *self.script.lock() = Script::default();
    }

    /// Returns every fetch call made, in call order.
    pub fn calls(&self) -> Vec<FetchBatch> {
        self.fetches.lock().clone()
    }

    /// Returns every listing call made, in call order.
    pub fn listing_calls(&self) -> Vec<ListingQuery> {
        self.listings.lock().clone()
    }

    /// Returns the number of fetch calls made for `kind`.
    pub fn fetch_count(&self, kind: EntityKind) -> usize {
        self.fetches.lock().iter().filter(|b| b.kind == kind).count()
    }

    /// Returns every id fetched for `kind`, across calls, in call order.
    pub fn fetched_ids(&self, kind: EntityKind) -> Vec<String> {
        self.fetches
            .lock()
            .iter()
            .filter(|b| b.kind == kind)
            .flat_map(|b| b.ids.iter().cloned())
            .collect()
    }

    /// Forgets all recorded calls.
    pub fn reset_calls(&self) {
        self.fetches.lock().clear();
        self.listings.lock().clear();
    }
}

impl Dataplane for RecordingDataplane {
    fn fetch_by_ids<'a>(
        &'a self,
        batch: FetchBatch,
    ) -> BoxFuture<'a, Result<Records, DataplaneError>> {
        self.fetches.lock().push(batch.clone());
        let (fault, delay) = {
            let script = self.script.lock();
            (
                script
                    .fetch_faults
                    .get(&batch.kind)
                    .copied()
                    .or(script.all_fault),
                script.delays.get(&batch.kind).copied(),
            )
        };
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match fault {
                Some(fault) => Err(fault.to_error(batch.kind.name())),
                None => self.inner.fetch_by_ids(batch).await,
            }
        })
    }

    fn list_ids<'a>(
        &'a self,
        query: ListingQuery,
    ) -> BoxFuture<'a, Result<IdPage, DataplaneError>> {
        self.listings.lock().push(query.clone());
        let fault = self.script.lock().listing_fault;
        Box::pin(async move {
            match fault {
                Some(fault) => Err(fault.to_error(query.listing.name())),
                None => self.inner.list_ids(query).await,
            }
        })
    }
}

impl std::fmt::Debug for RecordingDataplane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingDataplane")
            .field("fetches", &self.fetches.lock().len())
            .field("listings", &self.listings.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphview_dataplane::{Listing, MemoryDataplane};
    use serde_json::json;

    fn inner() -> MemoryDataplane {
        let dp = MemoryDataplane::new();
        dp.put(EntityKind::ACTOR, "did:plc:a", json!({"did": "did:plc:a"}));
        dp
    }

    #[tokio::test]
    async fn test_records_and_forwards() {
        let dp = RecordingDataplane::new(inner());
        let records = dp
            .fetch_by_ids(FetchBatch::new(EntityKind::ACTOR, vec!["did:plc:a".into()]))
            .await
            .expect("fetch should work");

        assert_eq!(records.len(), 1);
        assert_eq!(dp.fetch_count(EntityKind::ACTOR), 1);
        assert_eq!(dp.fetched_ids(EntityKind::ACTOR), vec!["did:plc:a"]);
    }

    #[tokio::test]
    async fn test_kind_fault_only_hits_that_kind() {
        let dp = RecordingDataplane::new(inner());
        dp.fail_kind(EntityKind::LIST, Fault::Unreachable);

        let list = dp
            .fetch_by_ids(FetchBatch::new(EntityKind::LIST, vec!["x".into()]))
            .await;
        assert!(matches!(list, Err(DataplaneError::Unreachable(_))));

        let actor = dp
            .fetch_by_ids(FetchBatch::new(EntityKind::ACTOR, vec!["did:plc:a".into()]))
            .await;
        assert!(actor.is_ok());
    }

    #[tokio::test]
    async fn test_listing_fault_and_heal() {
        let dp = RecordingDataplane::new(inner());
        dp.fail_listings(Fault::Backend);
        let query = ListingQuery {
            listing: Listing::ACTOR_LISTS,
            owner: "did:plc:a".into(),
            cursor: None,
            limit: 10,
        };

        assert!(dp.list_ids(query.clone()).await.is_err());
        dp.heal();
        assert!(dp.list_ids(query).await.is_ok());
        assert_eq!(dp.listing_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let dp = RecordingDataplane::new(inner());
        dp.delay_kind(EntityKind::ACTOR, Duration::from_secs(3));

        let started = tokio::time::Instant::now();
        dp.fetch_by_ids(FetchBatch::new(EntityKind::ACTOR, vec!["did:plc:a".into()]))
            .await
            .expect("fetch should work");
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_reset_calls() {
        let dp = RecordingDataplane::new(inner());
        dp.fetches
            .lock()
            .push(FetchBatch::new(EntityKind::ACTOR, Vec::new()));
        dp.reset_calls();
        assert!(dp.calls().is_empty());
    }
}
