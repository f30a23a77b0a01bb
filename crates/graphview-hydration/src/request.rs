//! What a hydration round should fetch.

use graphview_core::{Entity, EntityKind};
use indexmap::{IndexMap, IndexSet};
use std::any::Any;
use std::sync::Arc;

pub(crate) type Decoded = Arc<dyn Any + Send + Sync>;
pub(crate) type Decoder = fn(serde_json::Value) -> Result<Decoded, serde_json::Error>;

fn decode<E: Entity>(value: serde_json::Value) -> Result<Decoded, serde_json::Error> {
    Ok(Arc::new(serde_json::from_value::<E>(value)?))
}

pub(crate) struct KindRequest {
    pub(crate) ids: IndexSet<String>,
    pub(crate) decode: Decoder,
}

/// The ids to fetch in one round, grouped by kind.
///
/// Ids are deduplicated per kind in first-seen order, so the engine issues
/// exactly one fetch per distinct `(kind, id)` pair.
///
/// ```
/// use graphview_core::{Entity, EntityKind};
/// use graphview_hydration::HydrationRequest;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Post {}
///
/// impl Entity for Post {
///     const KIND: EntityKind = EntityKind::POST;
/// }
///
/// let request = HydrationRequest::new().want::<Post>(["at://a", "at://b", "at://a"]);
/// assert_eq!(request.ids(EntityKind::POST), vec!["at://a", "at://b"]);
/// ```
#[derive(Default)]
pub struct HydrationRequest {
    pub(crate) kinds: IndexMap<EntityKind, KindRequest>,
}

impl HydrationRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds ids of records of type `E`.
    #[must_use]
    pub fn want<E: Entity>(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.add::<E>(ids);
        self
    }

    /// Adds ids of records of type `E` in place.
    pub fn add<E: Entity>(&mut self, ids: impl IntoIterator<Item = impl Into<String>>) {
        let entry = self.kinds.entry(E::KIND).or_insert_with(|| KindRequest {
            ids: IndexSet::new(),
            decode: decode::<E>,
        });
        entry.ids.extend(ids.into_iter().map(Into::into));
    }

    /// Returns the kinds requested, in the order first added.
    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.kinds.keys().copied()
    }

    /// Returns the distinct ids requested for a kind.
    #[must_use]
    pub fn ids(&self, kind: EntityKind) -> Vec<&str> {
        self.kinds
            .get(&kind)
            .map(|k| k.ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if no ids were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.values().all(|k| k.ids.is_empty())
    }
}

impl std::fmt::Debug for HydrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.kinds.iter().map(|(kind, k)| (kind.name(), &k.ids)))
            .finish()
    }
}
