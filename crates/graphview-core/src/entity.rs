//! Entity kinds and hydration keys.
//!
//! Every hydrated record is addressed by an [`EntityRef`]: the pair of its
//! [`EntityKind`] and identifier. The same identifier may appear under
//! several kinds (a list URI keys the list record, the viewer's state for
//! that list, its aggregates and its labels).

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::fmt;

/// The kind of a hydrated entity.
///
/// Kinds are open-ended: endpoints may define their own with [`EntityKind::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKind(&'static str);

impl EntityKind {
    /// Actor profile records, keyed by DID.
    pub const ACTOR: Self = Self("actor");
    /// The viewer's relationship to an actor, keyed by DID.
    pub const ACTOR_VIEWER: Self = Self("actor-viewer");
    /// Curation/moderation list records, keyed by AT-URI.
    pub const LIST: Self = Self("list");
    /// The viewer's relationship to a list, keyed by AT-URI.
    pub const LIST_VIEWER: Self = Self("list-viewer");
    /// List aggregate counts, keyed by AT-URI.
    pub const LIST_AGG: Self = Self("list-agg");
    /// Moderation labels, keyed by subject (DID or AT-URI).
    pub const LABELS: Self = Self("labels");
    /// Post records, keyed by AT-URI.
    pub const POST: Self = Self("post");

    /// Creates a custom entity kind.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the kind name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// The `(kind, identifier)` key of one hydrated entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntityRef {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity identifier (DID or AT-URI).
    pub id: String,
}

impl EntityRef {
    /// Creates a new entity reference.
    #[must_use]
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Creates a reference to a record of type `E`.
    #[must_use]
    pub fn of<E: Entity>(id: impl Into<String>) -> Self {
        Self::new(E::KIND, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A record type the hydration engine can fetch and decode.
///
/// Records arrive from the dataplane as JSON and are decoded with serde.
///
/// # Example
///
/// ```
/// use graphview_core::{Entity, EntityKind};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Post {
///     text: String,
/// }
///
/// impl Entity for Post {
///     const KIND: EntityKind = EntityKind::POST;
/// }
///
/// assert_eq!(Post::KIND.name(), "post");
/// ```
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    /// The kind this record type is stored under.
    const KIND: EntityKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(EntityKind::LIST.name(), "list");
        assert_eq!(EntityKind::new("feed-generator").to_string(), "feed-generator");
    }

    #[test]
    fn test_entity_ref_display() {
        let key = EntityRef::new(EntityKind::LIST, "at://did:plc:a/app.bsky.graph.list/1");
        assert_eq!(key.to_string(), "list:at://did:plc:a/app.bsky.graph.list/1");
    }

    #[test]
    fn test_same_id_different_kinds_are_distinct() {
        let list = EntityRef::new(EntityKind::LIST, "at://x");
        let labels = EntityRef::new(EntityKind::LABELS, "at://x");
        assert_ne!(list, labels);
    }

    #[test]
    fn test_entity_ref_serializes_kind_as_string() {
        let key = EntityRef::new(EntityKind::ACTOR, "did:plc:a");
        let json = serde_json::to_string(&key).expect("serialization should work");
        assert_eq!(json, r#"{"kind":"actor","id":"did:plc:a"}"#);
    }
}
