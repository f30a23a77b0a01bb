//! The hydration engine.

use crate::error::HydrationError;
use crate::request::{Decoder, HydrationRequest};
use crate::state::{HydrationState, Slot};
use futures_util::future::join_all;
use graphview_core::{EntityKind, EntityRef, RequestContext};
use graphview_dataplane::{Dataplane, DataplaneError, FetchBatch, Records};
use graphview_telemetry::metrics::{record_hydration_absent, record_hydration_fetch};
use std::sync::Arc;
use std::time::Duration;

/// Default per-batch fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(1000);

/// Fetches records from the dataplane in batched, deduplicated rounds.
///
/// A round issues one fetch per requested kind, all concurrently, and waits
/// for every fetch to settle. Results merge into a [`HydrationState`]:
///
/// - ids the dataplane did not return are recorded absent
/// - records that fail to decode are recorded absent and logged
/// - a failed or timed-out batch records all of its ids absent
///
/// The round fails only when no batch succeeded and at least one failure was
/// a transport failure; see [`HydrationError::DataplaneUnavailable`].
///
/// `Hydrator` is cheap to clone and is built once at startup.
#[derive(Clone)]
pub struct Hydrator {
    dataplane: Arc<dyn Dataplane>,
    fetch_timeout: Duration,
}

struct BatchOutcome {
    kind: EntityKind,
    ids: Vec<String>,
    decode: Decoder,
    result: Result<Records, DataplaneError>,
}

impl Hydrator {
    /// Creates a hydrator over a dataplane.
    #[must_use]
    pub fn new(dataplane: Arc<dyn Dataplane>) -> Self {
        Self {
            dataplane,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Sets the per-batch fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Returns the underlying dataplane.
    #[must_use]
    pub fn dataplane(&self) -> &Arc<dyn Dataplane> {
        &self.dataplane
    }

    /// Returns the per-batch fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Runs one round into a fresh state.
    pub async fn hydrate(
        &self,
        request: HydrationRequest,
        ctx: &RequestContext,
    ) -> Result<HydrationState, HydrationError> {
        let mut state = HydrationState::new();
        self.hydrate_into(&mut state, request, ctx).await?;
        Ok(state)
    }

    /// Runs a round into an existing state.
    ///
    /// Keys that already have an entry are not fetched again, so a dependent
    /// round never repeats work done by an earlier one.
    pub async fn hydrate_into(
        &self,
        state: &mut HydrationState,
        request: HydrationRequest,
        ctx: &RequestContext,
    ) -> Result<(), HydrationError> {
        let batches: Vec<(EntityKind, Vec<String>, Decoder)> = request
            .kinds
            .into_iter()
            .filter_map(|(kind, wanted)| {
                let ids: Vec<String> = wanted
                    .ids
                    .into_iter()
                    .filter(|id| !state.contains(&EntityRef::new(kind, id.as_str())))
                    .collect();
                (!ids.is_empty()).then_some((kind, ids, wanted.decode))
            })
            .collect();

        if batches.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            request_id = %ctx.request_id(),
            kinds = %kind_list(batches.iter().map(|(kind, _, _)| *kind)),
            ids = batches.iter().map(|(_, ids, _)| ids.len()).sum::<usize>(),
            "hydration round"
        );

        let fetches = batches
            .into_iter()
            .map(|(kind, ids, decode)| self.fetch(kind, ids, decode, ctx));
        let outcomes = join_all(fetches).await;

        let kinds = kind_list(outcomes.iter().map(|o| o.kind));
        let mut succeeded = 0usize;
        let mut transport_failure: Option<DataplaneError> = None;

        for outcome in outcomes {
            match outcome.result {
                Ok(records) => {
                    succeeded += 1;
                    record_hydration_fetch(outcome.kind.name(), "ok", outcome.ids.len());
                    merge_records(state, outcome.kind, outcome.ids, outcome.decode, records);
                }
                Err(err) => {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        kind = %outcome.kind,
                        ids = outcome.ids.len(),
                        error = %err,
                        "hydration batch failed; ids recorded absent"
                    );
                    record_hydration_fetch(outcome.kind.name(), err.label(), outcome.ids.len());
                    record_hydration_absent(outcome.kind.name(), outcome.ids.len());
                    for id in outcome.ids {
                        state.insert_slot(EntityRef::new(outcome.kind, id), Slot::Absent);
                    }
                    if err.is_transport() && transport_failure.is_none() {
                        transport_failure = Some(err);
                    }
                }
            }
        }

        match transport_failure {
            Some(source) if succeeded == 0 => {
                Err(HydrationError::DataplaneUnavailable { kinds, source })
            }
            _ => Ok(()),
        }
    }

    async fn fetch(
        &self,
        kind: EntityKind,
        ids: Vec<String>,
        decode: Decoder,
        ctx: &RequestContext,
    ) -> BatchOutcome {
        let batch = FetchBatch::new(kind, ids.clone()).with_viewer(ctx.viewer().cloned());
        let result =
            match tokio::time::timeout(self.fetch_timeout, self.dataplane.fetch_by_ids(batch))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(DataplaneError::Timeout(
                    u64::try_from(self.fetch_timeout.as_millis()).unwrap_or(u64::MAX),
                )),
            };
        BatchOutcome {
            kind,
            ids,
            decode,
            result,
        }
    }
}

fn merge_records(
    state: &mut HydrationState,
    kind: EntityKind,
    ids: Vec<String>,
    decode: Decoder,
    mut records: Records,
) {
    let mut absent = 0usize;
    for id in ids {
        let slot = match records.remove(&id) {
            Some(value) => match decode(value) {
                Ok(record) => Slot::Present(record),
                Err(err) => {
                    tracing::warn!(kind = %kind, id = %id, error = %err, "undecodable record");
                    absent += 1;
                    Slot::Absent
                }
            },
            None => {
                absent += 1;
                Slot::Absent
            }
        };
        state.insert_slot(EntityRef::new(kind, id), slot);
    }
    record_hydration_absent(kind.name(), absent);
}

fn kind_list(kinds: impl Iterator<Item = EntityKind>) -> String {
    kinds.map(|k| k.name()).collect::<Vec<_>>().join(",")
}

impl std::fmt::Debug for Hydrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydrator")
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}
