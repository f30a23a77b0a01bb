//! Moderation rules shared by endpoints.

use graphview_core::{EntityKind, EntityRef};
use graphview_hydration::{ActorViewerState, LabelSet, TAKEDOWN_LABEL};
use graphview_pipeline::RulesInput;

/// Hides what the viewer must not see.
///
/// - A subject carrying `!takedown` from a redacting label source is marked
///   invalid, unless the request may see takedowns.
/// - An actor that blocks the viewer is marked invalid.
///
/// Only existing entries are touched.
pub fn moderation_rules<Ctx, P>(input: RulesInput<'_, Ctx, P>) {
    let ctx = input.request;
    let mut hidden: Vec<EntityRef> = Vec::new();

    if !ctx.include_takedowns() {
        for subject in input.hydration.present_ids(EntityKind::LABELS) {
            let Some(labels) = input.hydration.record::<LabelSet>(subject) else {
                continue;
            };
            if labels
                .with_value(TAKEDOWN_LABEL)
                .any(|label| ctx.label_sources().redacts(&label.src))
            {
                hidden.extend(subject_keys(subject));
            }
        }
    }

    if ctx.viewer().is_some() {
        for did in input.hydration.present_ids(EntityKind::ACTOR_VIEWER) {
            if input
                .hydration
                .record::<ActorViewerState>(did)
                .is_some_and(|state| state.blocked_by)
            {
                hidden.push(EntityRef::new(EntityKind::ACTOR, did));
            }
        }
    }

    for key in &hidden {
        if input.hydration.mark_invalid(key) {
            tracing::debug!(%key, "hidden by moderation rules");
        }
    }
}

fn subject_keys(subject: &str) -> Vec<EntityRef> {
    if subject.starts_with("did:") {
        vec![EntityRef::new(EntityKind::ACTOR, subject)]
    } else {
        vec![
            EntityRef::new(EntityKind::LIST, subject),
            EntityRef::new(EntityKind::POST, subject),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphview_core::{Did, LabelSources, RequestContext};
    use graphview_hydration::{ActorRecord, HydrationState, Label, Lookup};
    use graphview_pipeline::SkeletonState;

    const MALLORY: &str = "did:plc:mallory";
    const MODERATOR: &str = "did:plc:moderator";

    fn did(s: &str) -> Did {
        Did::parse(s).expect("valid did")
    }

    fn mallory() -> ActorRecord {
        ActorRecord {
            did: did(MALLORY),
            handle: "mallory.test".to_string(),
            display_name: None,
            description: None,
            avatar: None,
            indexed_at: None,
            takedown_ref: None,
        }
    }

    fn takedown_state() -> HydrationState {
        let mut state = HydrationState::new();
        state.insert(MALLORY, mallory());
        state.insert(
            MALLORY,
            LabelSet {
                labels: vec![Label {
                    src: MODERATOR.to_string(),
                    uri: MALLORY.to_string(),
                    val: TAKEDOWN_LABEL.to_string(),
                    neg: false,
                    cts: None,
                }],
            },
        );
        state
    }

    fn apply(state: &mut HydrationState, request: &RequestContext) {
        let skeleton = SkeletonState::of_kind(EntityKind::ACTOR, [MALLORY], None);
        moderation_rules(RulesInput {
            app: &(),
            params: &(),
            request,
            skeleton: &skeleton,
            hydration: state,
        });
    }

    #[test]
    fn test_redacting_takedown_invalidates() {
        let mut state = takedown_state();
        let request = RequestContext::mock()
            .with_label_sources(LabelSources::new().with_source(did(MODERATOR), true));

        apply(&mut state, &request);
        assert_eq!(state.get::<ActorRecord>(MALLORY), Lookup::Invalid);
    }

    #[test]
    fn test_non_redacting_takedown_only_annotates() {
        let mut state = takedown_state();
        let request = RequestContext::mock()
            .with_label_sources(LabelSources::new().with_source(did(MODERATOR), false));

        apply(&mut state, &request);
        assert!(state.get::<ActorRecord>(MALLORY).is_found());
    }

    #[test]
    fn test_include_takedowns_skips_label_rule() {
        let mut state = takedown_state();
        let request = RequestContext::mock()
            .with_label_sources(LabelSources::new().with_source(did(MODERATOR), true))
            .with_include_takedowns(true);

        apply(&mut state, &request);
        assert!(state.get::<ActorRecord>(MALLORY).is_found());
    }

    #[test]
    fn test_blocked_by_hides_actor_for_viewer() {
        let mut state = HydrationState::new();
        state.insert(MALLORY, mallory());
        state.insert(
            MALLORY,
            ActorViewerState {
                blocked_by: true,
                ..ActorViewerState::default()
            },
        );

        apply(&mut state, &RequestContext::mock());
        assert!(state.get::<ActorRecord>(MALLORY).is_found());

        apply(
            &mut state,
            &RequestContext::mock().with_viewer(did("did:plc:carol")),
        );
        assert!(state.get::<ActorRecord>(MALLORY).is_invalid());
    }

    #[test]
    fn test_never_adds_entries() {
        let mut state = takedown_state();
        let before = state.key_set();
        let request = RequestContext::mock()
            .with_label_sources(LabelSources::new().with_source(did(MODERATOR), true));

        apply(&mut state, &request);
        assert_eq!(state.key_set(), before);
    }
}
