//! The keyed result of hydration.

use graphview_core::{Entity, EntityKind, EntityRef};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// What hydration learned about one key.
#[derive(Clone)]
pub(crate) enum Slot {
    Present(Arc<dyn Any + Send + Sync>),
    Absent,
    Invalid,
}

/// The result of reading one key from a [`HydrationState`].
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, E> {
    /// The record was hydrated.
    Found(&'a E),
    /// The record was requested and does not exist (or could not be fetched).
    Absent,
    /// The record was hydrated and then marked invalid by a rules stage.
    Invalid,
    /// The key was never requested.
    Unrequested,
}

impl<'a, E> Lookup<'a, E> {
    /// Returns the record if it was found.
    #[must_use]
    pub const fn found(self) -> Option<&'a E> {
        match self {
            Self::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Returns `true` if the record was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns `true` if the record was marked invalid.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}

/// Hydrated records keyed by `(kind, id)`.
///
/// Every requested key has an entry: either the decoded record, an explicit
/// absent marker, or an invalid marker set by a rules stage. Keys are never
/// dropped, so "not found" and "never asked for" stay distinguishable.
///
/// Records are stored type-erased and read back by type:
///
/// ```
/// use graphview_core::{Entity, EntityKind};
/// use graphview_hydration::{HydrationState, Lookup};
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Post {
///     text: String,
/// }
///
/// impl Entity for Post {
///     const KIND: EntityKind = EntityKind::POST;
/// }
///
/// let mut state = HydrationState::new();
/// state.insert("at://a", Post { text: "hi".into() });
/// state.insert_absent(graphview_core::EntityRef::of::<Post>("at://b"));
///
/// assert!(state.get::<Post>("at://a").is_found());
/// assert_eq!(state.get::<Post>("at://b"), Lookup::Absent);
/// assert_eq!(state.get::<Post>("at://c"), Lookup::Unrequested);
/// ```
#[derive(Clone, Default)]
pub struct HydrationState {
    slots: HashMap<EntityRef, Slot>,
}

impl HydrationState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a hydrated record, replacing any previous entry.
    pub fn insert<E: Entity>(&mut self, id: impl Into<String>, record: E) {
        self.slots
            .insert(EntityRef::of::<E>(id), Slot::Present(Arc::new(record)));
    }

    /// Records that a key was requested and has no record.
    pub fn insert_absent(&mut self, key: EntityRef) {
        self.slots.insert(key, Slot::Absent);
    }

    pub(crate) fn insert_slot(&mut self, key: EntityRef, slot: Slot) {
        self.slots.insert(key, slot);
    }

    /// Reads a record by id.
    ///
    /// A stored record of a different type than `E` reads as absent.
    #[must_use]
    pub fn get<E: Entity>(&self, id: &str) -> Lookup<'_, E> {
        let key = EntityRef::of::<E>(id);
        match self.slots.get(&key) {
            Some(Slot::Present(record)) => match record.downcast_ref::<E>() {
                Some(record) => Lookup::Found(record),
                None => Lookup::Absent,
            },
            Some(Slot::Absent) => Lookup::Absent,
            Some(Slot::Invalid) => Lookup::Invalid,
            None => Lookup::Unrequested,
        }
    }

    /// Returns the record for `id` if it was found and is still valid.
    #[must_use]
    pub fn record<E: Entity>(&self, id: &str) -> Option<&E> {
        self.get::<E>(id).found()
    }

    /// Returns `true` if the key has an entry of any kind.
    #[must_use]
    pub fn contains(&self, key: &EntityRef) -> bool {
        self.slots.contains_key(key)
    }

    /// Returns `true` if the key holds a valid record.
    #[must_use]
    pub fn is_present(&self, key: &EntityRef) -> bool {
        matches!(self.slots.get(key), Some(Slot::Present(_)))
    }

    /// Marks an entry invalid. Returns `false` if the key has no entry.
    ///
    /// Invalid entries are skipped by presentation like absent ones, but
    /// remain distinguishable for logging and for views that treat a
    /// moderated dependency differently from a missing one.
    pub fn mark_invalid(&mut self, key: &EntityRef) -> bool {
        match self.slots.get_mut(key) {
            Some(slot) => {
                *slot = Slot::Invalid;
                true
            }
            None => false,
        }
    }

    /// Drops the record for a key, leaving it absent. Returns `false` if the
    /// key has no entry.
    pub fn remove(&mut self, key: &EntityRef) -> bool {
        match self.slots.get_mut(key) {
            Some(slot) => {
                *slot = Slot::Absent;
                true
            }
            None => false,
        }
    }

    /// Iterates over every key with an entry.
    pub fn keys(&self) -> impl Iterator<Item = &EntityRef> {
        self.slots.keys()
    }

    /// Returns the set of keys with an entry.
    #[must_use]
    pub fn key_set(&self) -> HashSet<EntityRef> {
        self.slots.keys().cloned().collect()
    }

    /// Iterates over the ids of one kind that hold a valid record.
    pub fn present_ids(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(move |(key, slot)| {
            (key.kind == kind && matches!(slot, Slot::Present(_))).then_some(key.id.as_str())
        })
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing was hydrated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Finds an entry that gained data since `before`.
    ///
    /// An entry may only narrow: present to absent or invalid, absent to
    /// invalid. A present record must keep the same allocation.
    #[must_use]
    pub fn widened_since(&self, before: &Self) -> Option<(&EntityRef, Widening)> {
        self.slots.iter().find_map(|(key, slot)| {
            let widening = match (before.slots.get(key), slot) {
                (None, _) => Widening::Added,
                (Some(Slot::Absent), Slot::Present(_))
                | (Some(Slot::Invalid), Slot::Present(_) | Slot::Absent) => Widening::Revived,
                (Some(Slot::Present(old)), Slot::Present(new)) if !same_record(old, new) => {
                    Widening::Replaced
                }
                _ => return None,
            };
            Some((key, widening))
        })
    }
}

fn same_record(a: &Arc<dyn Any + Send + Sync>, b: &Arc<dyn Any + Send + Sync>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// How an entry gained data between two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widening {
    /// The key had no entry.
    Added,
    /// An absent or invalid entry became present, or invalid became absent.
    Revived,
    /// A present record was swapped for another.
    Replaced,
}

impl Widening {
    /// Returns a short name for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Revived => "revived",
            Self::Replaced => "replaced",
        }
    }
}

impl fmt::Display for Widening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for HydrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self
            .slots
            .iter()
            .map(|(key, slot)| {
                let marker = match slot {
                    Slot::Present(_) => "present",
                    Slot::Absent => "absent",
                    Slot::Invalid => "invalid",
                };
                (key.to_string(), marker)
            })
            .collect();
        keys.sort();
        f.debug_map().entries(keys).finish()
    }
}
