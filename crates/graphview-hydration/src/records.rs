//! Hydrated record types.
//!
//! Records arrive from the dataplane as camelCase JSON objects.

use graphview_core::{Did, Entity, EntityKind};
use serde::{Deserialize, Serialize};

/// An actor's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRecord {
    /// The actor's DID.
    pub did: Did,
    /// Current handle.
    pub handle: String,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Profile description.
    #[serde(default)]
    pub description: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// When the profile was indexed.
    #[serde(default)]
    pub indexed_at: Option<String>,
    /// Set when the account was taken down by the service.
    #[serde(default)]
    pub takedown_ref: Option<String>,
}

impl Entity for ActorRecord {
    const KIND: EntityKind = EntityKind::ACTOR;
}

/// The viewer's relationship to an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActorViewerState {
    /// The viewer muted the actor.
    pub muted: bool,
    /// The actor blocks the viewer.
    pub blocked_by: bool,
    /// URI of the viewer's block of the actor.
    pub blocking: Option<String>,
    /// URI of the viewer's follow of the actor.
    pub following: Option<String>,
    /// URI of the actor's follow of the viewer.
    pub followed_by: Option<String>,
}

impl Entity for ActorViewerState {
    const KIND: EntityKind = EntityKind::ACTOR_VIEWER;
}

/// A curation or moderation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecord {
    /// The list's AT-URI.
    pub uri: String,
    /// Content hash of the record.
    pub cid: String,
    /// The actor who created the list.
    pub creator: Did,
    /// List name.
    pub name: String,
    /// List purpose, e.g. `app.bsky.graph.defs#curatelist`.
    pub purpose: String,
    /// List description.
    #[serde(default)]
    pub description: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// When the list was indexed.
    #[serde(default)]
    pub indexed_at: Option<String>,
    /// Set when the list was taken down by the service.
    #[serde(default)]
    pub takedown_ref: Option<String>,
}

impl Entity for ListRecord {
    const KIND: EntityKind = EntityKind::LIST;
}

/// The viewer's relationship to a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListViewerState {
    /// The viewer mutes the list's members.
    pub muted: bool,
    /// URI of the viewer's block-list subscription, if any.
    pub blocked: Option<String>,
}

impl Entity for ListViewerState {
    const KIND: EntityKind = EntityKind::LIST_VIEWER;
}

/// Aggregate counts for a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListAggregate {
    /// Number of members.
    pub list_item_count: u64,
}

impl Entity for ListAggregate {
    const KIND: EntityKind = EntityKind::LIST_AGG;
}

/// A moderation label applied to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// DID of the labeler.
    pub src: String,
    /// Subject the label applies to.
    pub uri: String,
    /// Label value, e.g. `!takedown` or `spam`.
    pub val: String,
    /// This label negates an earlier one with the same `src`, `uri` and `val`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub neg: bool,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cts: Option<String>,
}

/// Value of the label that removes a subject from view.
pub const TAKEDOWN_LABEL: &str = "!takedown";

/// Every label on one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    /// Labels in issue order.
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Entity for LabelSet {
    const KIND: EntityKind = EntityKind::LABELS;
}

impl LabelSet {
    /// Returns `true` if any label has the given value.
    #[must_use]
    pub fn has(&self, val: &str) -> bool {
        self.labels.iter().any(|l| l.val == val)
    }

    /// Returns the labels with the given value.
    pub fn with_value<'a>(&'a self, val: &'a str) -> impl Iterator<Item = &'a Label> + 'a {
        self.labels.iter().filter(move |l| l.val == val)
    }
}
