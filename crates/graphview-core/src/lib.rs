//! # Graphview Core
//!
//! Core types shared by every stage of the graphview read path.
//!
//! - [`RequestContext`] - Per-request viewer, label sources and request id
//! - [`LabelSources`] - Moderation label sources active for a request
//! - [`Did`] / [`AtUri`] - Identifier syntax
//! - [`EntityKind`] / [`EntityRef`] / [`Entity`] - Hydration keys and record types
//! - [`ServiceError`] - The error type that reaches callers
//! - [`BoxFuture`] - Boxed future used by object-safe async traits and stages

#![doc(html_root_url = "https://docs.rs/graphview-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod entity;
mod error;
mod ids;
mod labelers;

pub use context::{RequestContext, RequestId};
pub use entity::{Entity, EntityKind, EntityRef};
pub use error::{ErrorCategory, ErrorEnvelope, ServiceError, ServiceResult};
pub use ids::{AtUri, Did, IdError};
pub use labelers::{LabelSources, ACCEPT_LABELERS_HEADER, CONTENT_LABELERS_HEADER, MAX_LABELERS};

use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
