//! Profile hydration.

use crate::engine::Hydrator;
use crate::error::HydrationError;
use crate::labels::apply_label_sources;
use crate::records::{ActorRecord, ActorViewerState, LabelSet};
use crate::request::HydrationRequest;
use crate::state::HydrationState;
use graphview_core::RequestContext;

impl Hydrator {
    /// Hydrates actor profiles: the profile record, labels on the actor and,
    /// when the request has a viewer, the viewer's relationship to the actor.
    pub async fn hydrate_profiles(
        &self,
        dids: &[String],
        ctx: &RequestContext,
    ) -> Result<HydrationState, HydrationError> {
        let mut state = HydrationState::new();
        self.hydrate_profiles_into(&mut state, dids, ctx).await?;
        Ok(state)
    }

    /// Hydrates actor profiles into an existing state.
    pub async fn hydrate_profiles_into(
        &self,
        state: &mut HydrationState,
        dids: &[String],
        ctx: &RequestContext,
    ) -> Result<(), HydrationError> {
        let mut request = HydrationRequest::new()
            .want::<ActorRecord>(dids.iter().cloned())
            .want::<LabelSet>(dids.iter().cloned());
        if ctx.viewer().is_some() {
            request.add::<ActorViewerState>(dids.iter().cloned());
        }

        self.hydrate_into(state, request, ctx).await?;
        apply_label_sources(state, dids.iter().map(String::as_str), ctx.label_sources());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Lookup;
    use graphview_core::{Did, EntityKind, LabelSources};
    use graphview_test::{fixtures, RecordingDataplane};
    use std::sync::Arc;

    fn dids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_anonymous_skips_viewer_state() {
        let recording = Arc::new(RecordingDataplane::new(fixtures::social_graph()));
        let hydrator = Hydrator::new(recording.clone());

        let state = hydrator
            .hydrate_profiles(&dids(&[fixtures::ALICE]), &RequestContext::mock())
            .await
            .expect("hydration should work");

        assert!(state.get::<ActorRecord>(fixtures::ALICE).is_found());
        assert_eq!(recording.fetch_count(EntityKind::ACTOR_VIEWER), 0);
        assert_eq!(
            state.get::<ActorViewerState>(fixtures::ALICE),
            Lookup::Unrequested
        );
    }

    #[tokio::test]
    async fn test_viewer_state_fetched_for_viewer() {
        let recording = Arc::new(RecordingDataplane::new(fixtures::social_graph()));
        let hydrator = Hydrator::new(recording.clone());
        let ctx = RequestContext::mock()
            .with_viewer(Did::parse(fixtures::CAROL).expect("valid did"));

        let state = hydrator
            .hydrate_profiles(&dids(&[fixtures::ALICE, fixtures::BOB]), &ctx)
            .await
            .expect("hydration should work");

        assert_eq!(recording.fetch_count(EntityKind::ACTOR_VIEWER), 1);
        let bob = state
            .record::<ActorViewerState>(fixtures::BOB)
            .expect("bob's viewer state");
        assert!(bob.blocked_by);
    }

    #[tokio::test]
    async fn test_labels_filtered_to_request_sources() {
        let hydrator = Hydrator::new(Arc::new(fixtures::social_graph()));
        let ctx = RequestContext::mock().with_label_sources(
            LabelSources::new().with_source(Did::parse(fixtures::MODERATOR).expect("valid did"), true),
        );

        let state = hydrator
            .hydrate_profiles(&dids(&[fixtures::MALLORY]), &ctx)
            .await
            .expect("hydration should work");

        let labels = state
            .record::<LabelSet>(fixtures::MALLORY)
            .expect("labels hydrated");
        assert!(labels.labels.iter().all(|l| l.src == fixtures::MODERATOR));
        assert!(!labels.labels.is_empty());
    }
}
