//! List views.

use crate::profile::ProfileViewBasic;
use crate::Views;
use graphview_core::RequestContext;
use graphview_hydration::{
    ActorRecord, HydrationState, Label, ListAggregate, ListRecord, ListViewerState, Lookup,
};
use serde::{Deserialize, Serialize};

/// A list without its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListViewBasic {
    /// The list's AT-URI.
    pub uri: String,
    /// Content hash of the list record.
    pub cid: String,
    /// List name.
    pub name: String,
    /// List purpose.
    pub purpose: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Number of members, when the aggregate was hydrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item_count: Option<u64>,
    /// Labels from the request's label sources.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// The viewer's relationship to the list; only for authenticated requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ListViewerView>,
    /// When the list was indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<String>,
}

/// A list with its creator's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    /// The list's AT-URI.
    pub uri: String,
    /// Content hash of the list record.
    pub cid: String,
    /// The creator's profile; missing when the creator record is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<ProfileViewBasic>,
    /// List name.
    pub name: String,
    /// List purpose.
    pub purpose: String,
    /// List description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Number of members, when the aggregate was hydrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item_count: Option<u64>,
    /// Labels from the request's label sources.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// The viewer's relationship to the list; only for authenticated requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ListViewerView>,
    /// When the list was indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<String>,
}

/// The viewer's relationship to a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListViewerView {
    /// The viewer mutes the list's members.
    pub muted: bool,
    /// The viewer's block-list subscription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<String>,
}

impl From<&ListViewerState> for ListViewerView {
    fn from(state: &ListViewerState) -> Self {
        Self {
            muted: state.muted,
            blocked: state.blocked.clone(),
        }
    }
}

impl Views {
    /// Renders a list without its creator.
    ///
    /// Returns `None` when the list is absent, invalid, or taken down and the
    /// request may not see takedowns.
    #[must_use]
    pub fn list_basic(
        &self,
        uri: &str,
        state: &HydrationState,
        ctx: &RequestContext,
    ) -> Option<ListViewBasic> {
        let list = Self::visible_list(uri, state, ctx)?;
        Some(ListViewBasic {
            uri: list.uri.clone(),
            cid: list.cid.clone(),
            name: list.name.clone(),
            purpose: list.purpose.clone(),
            avatar: list.avatar.clone(),
            list_item_count: Self::item_count(uri, state),
            labels: Self::labels(uri, state),
            viewer: Self::list_viewer(uri, state, ctx),
            indexed_at: list.indexed_at.clone(),
        })
    }

    /// Renders a list with its creator.
    ///
    /// Beyond the rules of [`Views::list_basic`], the list is omitted when its
    /// creator was marked invalid or is hidden by a takedown. A creator whose
    /// record is merely absent leaves `creator` empty.
    #[must_use]
    pub fn list(&self, uri: &str, state: &HydrationState, ctx: &RequestContext) -> Option<ListView> {
        let list = Self::visible_list(uri, state, ctx)?;
        let creator_did = list.creator.as_str();
        let creator = match state.get::<ActorRecord>(creator_did) {
            Lookup::Found(_) => Some(self.profile_basic(creator_did, state, ctx)?),
            Lookup::Invalid => return None,
            Lookup::Absent | Lookup::Unrequested => None,
        };

        Some(ListView {
            uri: list.uri.clone(),
            cid: list.cid.clone(),
            creator,
            name: list.name.clone(),
            purpose: list.purpose.clone(),
            description: list.description.clone(),
            avatar: list.avatar.clone(),
            list_item_count: Self::item_count(uri, state),
            labels: Self::labels(uri, state),
            viewer: Self::list_viewer(uri, state, ctx),
            indexed_at: list.indexed_at.clone(),
        })
    }

    fn visible_list<'a>(
        uri: &str,
        state: &'a HydrationState,
        ctx: &RequestContext,
    ) -> Option<&'a ListRecord> {
        state
            .get::<ListRecord>(uri)
            .found()
            .filter(|list| Self::visible(list.takedown_ref.as_deref(), ctx))
    }

    fn item_count(uri: &str, state: &HydrationState) -> Option<u64> {
        state
            .record::<ListAggregate>(uri)
            .map(|agg| agg.list_item_count)
    }

    fn list_viewer(
        uri: &str,
        state: &HydrationState,
        ctx: &RequestContext,
    ) -> Option<ListViewerView> {
        ctx.viewer()?;
        state.record::<ListViewerState>(uri).map(ListViewerView::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphview_core::{Did, EntityKind, EntityRef};
    use graphview_hydration::{LabelSet, TAKEDOWN_LABEL};

    const ALICE: &str = "did:plc:alice";
    const URI: &str = "at://did:plc:alice/app.bsky.graph.list/1";

    fn list_record(takedown: Option<&str>) -> ListRecord {
        ListRecord {
            uri: URI.to_string(),
            cid: "bafy1".to_string(),
            creator: Did::parse(ALICE).expect("valid did"),
            name: "Friends".to_string(),
            purpose: "app.bsky.graph.defs#curatelist".to_string(),
            description: Some("people I know".to_string()),
            avatar: None,
            indexed_at: Some("2024-01-02T00:00:00.000Z".to_string()),
            takedown_ref: takedown.map(str::to_string),
        }
    }

    fn creator(takedown: Option<&str>) -> ActorRecord {
        ActorRecord {
            did: Did::parse(ALICE).expect("valid did"),
            handle: "alice.test".to_string(),
            display_name: None,
            description: None,
            avatar: None,
            indexed_at: None,
            takedown_ref: takedown.map(str::to_string),
        }
    }

    fn hydrated() -> HydrationState {
        let mut state = HydrationState::new();
        state.insert(URI, list_record(None));
        state.insert(URI, ListAggregate { list_item_count: 3 });
        state.insert(ALICE, creator(None));
        state
    }

    #[test]
    fn test_list_renders_creator_and_count() {
        let view = Views::new()
            .list(URI, &hydrated(), &RequestContext::mock())
            .expect("list should render");

        assert_eq!(view.list_item_count, Some(3));
        assert_eq!(view.creator.expect("creator").handle, "alice.test");

        let json = serde_json::to_value(
            Views::new()
                .list(URI, &hydrated(), &RequestContext::mock())
                .expect("list should render"),
        )
        .expect("serialization should work");
        assert_eq!(json["listItemCount"], 3);
        assert_eq!(json["indexedAt"], "2024-01-02T00:00:00.000Z");
    }

    #[test]
    fn test_absent_creator_leaves_creator_empty() {
        let mut state = hydrated();
        state.remove(&EntityRef::new(EntityKind::ACTOR, ALICE));

        let view = Views::new()
            .list(URI, &state, &RequestContext::mock())
            .expect("list should render");
        assert!(view.creator.is_none());
    }

    #[test]
    fn test_invalid_creator_hides_list() {
        let mut state = hydrated();
        state.mark_invalid(&EntityRef::new(EntityKind::ACTOR, ALICE));

        assert!(Views::new()
            .list(URI, &state, &RequestContext::mock())
            .is_none());
        assert!(Views::new()
            .list_basic(URI, &state, &RequestContext::mock())
            .is_some());
    }

    #[test]
    fn test_taken_down_creator_hides_list() {
        let mut state = hydrated();
        state.insert(ALICE, creator(Some("BRANCH-7")));

        assert!(Views::new()
            .list(URI, &state, &RequestContext::mock())
            .is_none());
    }

    #[test]
    fn test_taken_down_list_hidden_unless_requested() {
        let mut state = hydrated();
        state.insert(URI, list_record(Some("BRANCH-9")));

        assert!(Views::new()
            .list_basic(URI, &state, &RequestContext::mock())
            .is_none());
        assert!(Views::new()
            .list_basic(
                URI,
                &state,
                &RequestContext::mock().with_include_takedowns(true)
            )
            .is_some());
    }

    #[test]
    fn test_labels_and_viewer() {
        let mut state = hydrated();
        state.insert(
            URI,
            LabelSet {
                labels: vec![Label {
                    src: "did:plc:moderator".to_string(),
                    uri: URI.to_string(),
                    val: TAKEDOWN_LABEL.to_string(),
                    neg: false,
                    cts: None,
                }],
            },
        );
        state.insert(
            URI,
            ListViewerState {
                muted: true,
                blocked: None,
            },
        );

        let anonymous = Views::new()
            .list(URI, &state, &RequestContext::mock())
            .expect("list should render");
        assert_eq!(anonymous.labels.len(), 1);
        assert!(anonymous.viewer.is_none());

        let ctx =
            RequestContext::mock().with_viewer(Did::parse("did:plc:carol").expect("valid did"));
        let viewed = Views::new()
            .list(URI, &state, &ctx)
            .expect("list should render");
        assert!(viewed.viewer.expect("viewer state").muted);
    }
}
