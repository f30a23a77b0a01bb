//! # Graphview Hydration
//!
//! Turns identifiers into records.
//!
//! An endpoint's hydration stage builds a [`HydrationRequest`] naming the ids
//! it needs per record type, and the [`Hydrator`] fetches them from the
//! dataplane:
//!
//! - one batched fetch per kind per round, issued concurrently
//! - ids deduplicated within a request and across dependent rounds
//! - missing, undecodable and failed ids recorded as explicit absence
//!
//! The result is a [`HydrationState`] keyed by `(kind, id)`.
//!
//! ```text
//!  skeleton ids ──► HydrationRequest ──► Hydrator ──► HydrationState
//!                                          │   ▲
//!                          FetchBatch/kind │   │ Records
//!                                          ▼   │
//!                                        Dataplane
//! ```
//!
//! [`Hydrator::hydrate_lists`] and [`Hydrator::hydrate_profiles`] are the
//! domain hydrators used by the list and profile endpoints.

#![doc(html_root_url = "https://docs.rs/graphview-hydration/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod actors;
mod engine;
mod error;
pub mod labels;
mod lists;
pub mod records;
mod request;
mod state;

pub use engine::{Hydrator, DEFAULT_FETCH_TIMEOUT};
pub use error::HydrationError;
pub use records::{
    ActorRecord, ActorViewerState, Label, LabelSet, ListAggregate, ListRecord, ListViewerState,
    TAKEDOWN_LABEL,
};
pub use request::HydrationRequest;
pub use state::{HydrationState, Lookup, Widening};
