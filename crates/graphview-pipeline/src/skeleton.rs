//! Skeleton output.

use graphview_core::{EntityKind, EntityRef};

/// The ordered ids of one page, plus the cursor for the next.
///
/// The order here is the order of the response. An id may appear under
/// several kinds but at most once per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkeletonState {
    /// Ids in response order.
    pub items: Vec<EntityRef>,
    /// Opaque cursor for the next page, forwarded verbatim to the response.
    pub cursor: Option<String>,
}

impl SkeletonState {
    /// Creates a skeleton.
    #[must_use]
    pub fn new(items: Vec<EntityRef>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// Creates a skeleton of ids that share one kind.
    #[must_use]
    pub fn of_kind(
        kind: EntityKind,
        ids: impl IntoIterator<Item = impl Into<String>>,
        cursor: Option<String>,
    ) -> Self {
        Self {
            items: ids.into_iter().map(|id| EntityRef::new(kind, id)).collect(),
            cursor,
        }
    }

    /// An empty final page.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the ids of one kind, in order.
    #[must_use]
    pub fn ids(&self, kind: EntityKind) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.id.clone())
            .collect()
    }

    /// Returns the number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the page has no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_kind_keeps_order() {
        let skeleton = SkeletonState::of_kind(EntityKind::LIST, ["c", "a", "b"], None);
        assert_eq!(skeleton.ids(EntityKind::LIST), vec!["c", "a", "b"]);
        assert!(skeleton.ids(EntityKind::ACTOR).is_empty());
    }

    #[test]
    fn test_empty() {
        let skeleton = SkeletonState::empty();
        assert!(skeleton.is_empty());
        assert!(skeleton.cursor.is_none());
    }
}
