//! # Graphview Test
//!
//! Test utilities for graphview.
//!
//! - [`RecordingDataplane`] wraps any dataplane, records every call, and
//!   injects per-kind failures and delays
//! - [`fixtures`] seeds a [`MemoryDataplane`](graphview_dataplane::MemoryDataplane)
//!   with a small social graph
//!
//! ## Example
//!
//! ```
//! use graphview_core::EntityKind;
//! use graphview_test::{fixtures, Fault, RecordingDataplane};
//!
//! let dataplane = RecordingDataplane::new(fixtures::social_graph());
//! dataplane.fail_kind(EntityKind::ACTOR, Fault::Unreachable);
//! assert!(dataplane.calls().is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/graphview-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
mod recording;

pub use recording::{Fault, RecordingDataplane};
