//! Actor views.

use crate::Views;
use graphview_core::RequestContext;
use graphview_hydration::{ActorRecord, ActorViewerState, HydrationState, Label, Lookup};
use serde::{Deserialize, Serialize};

/// The compact profile embedded in other views and returned by `getProfiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewBasic {
    /// The actor's DID.
    pub did: String,
    /// Current handle.
    pub handle: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// The viewer's relationship to the actor; only for authenticated requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ProfileViewerView>,
    /// Labels from the request's label sources.
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// The viewer's relationship to an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewerView {
    /// The viewer muted the actor.
    pub muted: bool,
    /// The actor blocks the viewer.
    pub blocked_by: bool,
    /// The viewer's block record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking: Option<String>,
    /// The viewer's follow record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<String>,
    /// The actor's follow of the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followed_by: Option<String>,
}

impl From<&ActorViewerState> for ProfileViewerView {
    fn from(state: &ActorViewerState) -> Self {
        Self {
            muted: state.muted,
            blocked_by: state.blocked_by,
            blocking: state.blocking.clone(),
            following: state.following.clone(),
            followed_by: state.followed_by.clone(),
        }
    }
}

impl Views {
    /// Renders the basic profile of `did`.
    ///
    /// Returns `None` when the actor is absent, invalid, or taken down and the
    /// request may not see takedowns.
    #[must_use]
    pub fn profile_basic(
        &self,
        did: &str,
        state: &HydrationState,
        ctx: &RequestContext,
    ) -> Option<ProfileViewBasic> {
        let actor = match state.get::<ActorRecord>(did) {
            Lookup::Found(actor) => actor,
            Lookup::Absent | Lookup::Invalid | Lookup::Unrequested => return None,
        };
        if !Self::visible(actor.takedown_ref.as_deref(), ctx) {
            return None;
        }

        let viewer = ctx
            .viewer()
            .and_then(|_| state.record::<ActorViewerState>(did))
            .map(ProfileViewerView::from);

        Some(ProfileViewBasic {
            did: actor.did.to_string(),
            handle: actor.handle.clone(),
            display_name: actor.display_name.clone(),
            avatar: actor.avatar.clone(),
            viewer,
            labels: Self::labels(did, state),
        })
    }
}
