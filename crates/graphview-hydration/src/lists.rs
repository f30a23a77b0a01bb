//! List hydration.

use crate::engine::Hydrator;
use crate::error::HydrationError;
use crate::labels::apply_label_sources;
use crate::records::{LabelSet, ListAggregate, ListRecord, ListViewerState};
use crate::request::HydrationRequest;
use crate::state::HydrationState;
use graphview_core::RequestContext;
use indexmap::IndexSet;

impl Hydrator {
    /// Hydrates lists in two rounds.
    ///
    /// The first round fetches the list records, their aggregates, labels and
    /// (with a viewer) the viewer's list state. The second round hydrates the
    /// profiles of the creators named by the lists that were found.
    pub async fn hydrate_lists(
        &self,
        uris: &[String],
        ctx: &RequestContext,
    ) -> Result<HydrationState, HydrationError> {
        let mut request = HydrationRequest::new()
            .want::<ListRecord>(uris.iter().cloned())
            .want::<ListAggregate>(uris.iter().cloned())
            .want::<LabelSet>(uris.iter().cloned());
        if ctx.viewer().is_some() {
            request.add::<ListViewerState>(uris.iter().cloned());
        }

        let mut state = self.hydrate(request, ctx).await?;
        apply_label_sources(&mut state, uris.iter().map(String::as_str), ctx.label_sources());

        let creators: Vec<String> = uris
            .iter()
            .filter_map(|uri| state.record::<ListRecord>(uri))
            .map(|list| list.creator.to_string())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();

        if !creators.is_empty() {
            self.hydrate_profiles_into(&mut state, &creators, ctx).await?;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ActorRecord;
    use crate::state::Lookup;
    use graphview_core::{Did, EntityKind};
    use graphview_test::{fixtures, Fault, RecordingDataplane};
    use std::sync::Arc;

    fn alice_lists() -> Vec<String> {
        ["1", "2", "3"]
            .iter()
            .map(|rkey| fixtures::list_uri(fixtures::ALICE, rkey))
            .collect()
    }

    #[tokio::test]
    async fn test_two_rounds_fetch_creators_once() {
        let recording = Arc::new(RecordingDataplane::new(fixtures::social_graph()));
        let hydrator = Hydrator::new(recording.clone());

        let state = hydrator
            .hydrate_lists(&alice_lists(), &RequestContext::mock())
            .await
            .expect("hydration should work");

        assert_eq!(recording.fetch_count(EntityKind::LIST), 1);
        assert_eq!(recording.fetch_count(EntityKind::ACTOR), 1);
        assert_eq!(recording.fetched_ids(EntityKind::ACTOR), vec![fixtures::ALICE]);
        assert!(state.get::<ActorRecord>(fixtures::ALICE).is_found());
        assert!(state
            .get::<ListAggregate>(&fixtures::list_uri(fixtures::ALICE, "1"))
            .is_found());
    }

    #[tokio::test]
    async fn test_labels_fetched_in_one_batch_per_round() {
        let recording = Arc::new(RecordingDataplane::new(fixtures::social_graph()));
        let hydrator = Hydrator::new(recording.clone());

        hydrator
            .hydrate_lists(&alice_lists(), &RequestContext::mock())
            .await
            .expect("hydration should work");

        // list subjects in round one, the creator in round two
        assert_eq!(recording.fetch_count(EntityKind::LABELS), 2);
    }

    #[tokio::test]
    async fn test_no_creator_round_when_no_lists_found() {
        let recording = Arc::new(RecordingDataplane::new(fixtures::social_graph()));
        let hydrator = Hydrator::new(recording.clone());

        let state = hydrator
            .hydrate_lists(
                &[fixtures::list_uri(fixtures::BOB, "missing")],
                &RequestContext::mock(),
            )
            .await
            .expect("hydration should work");

        assert_eq!(recording.fetch_count(EntityKind::ACTOR), 0);
        assert_eq!(
            state.get::<ListRecord>(&fixtures::list_uri(fixtures::BOB, "missing")),
            Lookup::Absent
        );
    }

    #[tokio::test]
    async fn test_viewer_list_state() {
        let recording = Arc::new(RecordingDataplane::new(fixtures::social_graph()));
        let hydrator = Hydrator::new(recording.clone());
        let ctx =
            RequestContext::mock().with_viewer(Did::parse(fixtures::CAROL).expect("valid did"));

        let state = hydrator
            .hydrate_lists(&alice_lists(), &ctx)
            .await
            .expect("hydration should work");

        assert_eq!(recording.fetch_count(EntityKind::LIST_VIEWER), 1);
        let viewer = state
            .record::<ListViewerState>(&fixtures::list_uri(fixtures::ALICE, "1"))
            .expect("carol's list state");
        assert!(viewer.muted);
    }

    #[tokio::test]
    async fn test_creator_failure_keeps_lists() {
        let recording = Arc::new(RecordingDataplane::new(fixtures::social_graph()));
        recording.fail_kind(EntityKind::ACTOR, Fault::Unreachable);
        let hydrator = Hydrator::new(recording.clone());

        let state = hydrator
            .hydrate_lists(&alice_lists(), &RequestContext::mock())
            .await
            .expect("labels still succeed in the creator round");

        assert!(state
            .get::<ListRecord>(&fixtures::list_uri(fixtures::ALICE, "1"))
            .is_found());
        assert_eq!(state.get::<ActorRecord>(fixtures::ALICE), Lookup::Absent);
    }
}
