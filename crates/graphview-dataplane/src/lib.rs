//! # Graphview Dataplane
//!
//! The narrow contract through which the read path reaches storage.
//!
//! The dataplane answers two questions, both batched:
//!
//! - [`Dataplane::fetch_by_ids`] - the records of one [`EntityKind`] for a set of ids
//! - [`Dataplane::list_ids`] - one page of an ordered listing (e.g. an actor's lists)
//!
//! Missing records are simply left out of a fetch result; the hydration
//! engine turns them into explicit absence.
//!
//! [`MemoryDataplane`] is a complete in-memory implementation used by
//! tests and local development.
//!
//! [`EntityKind`]: graphview_core::EntityKind

#![doc(html_root_url = "https://docs.rs/graphview-dataplane/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod memory;

pub use client::{Dataplane, FetchBatch, IdPage, Listing, ListingQuery, Records};
pub use error::DataplaneError;
pub use memory::MemoryDataplane;
