//! # Graphview Endpoints
//!
//! Read endpoints assembled from the four pipeline stages.
//!
//! | Method | Skeleton | Hydration | Rules | Presentation |
//! |--------|----------|-----------|-------|--------------|
//! | [`GET_LISTS`] | actor's list listing | [`hydrate_lists`] | none | [`Views::list`] |
//! | [`GET_PROFILES`] | requested DIDs, deduplicated | [`hydrate_profiles`] | [`moderation_rules`] | [`Views::profile_basic`] |
//!
//! Handlers take the process-wide [`AppContext`], the decoded parameters,
//! and the [`RequestContext`](graphview_core::RequestContext) built for the
//! request, and return an [`XrpcOutput`].
//!
//! ## Example
//!
//! ```
//! use graphview_config::GraphviewConfig;
//! use graphview_dataplane::MemoryDataplane;
//! use graphview_endpoints::{get_lists, AppContext, GetListsParams};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let app = AppContext::new(Arc::new(MemoryDataplane::new()), GraphviewConfig::default());
//! let ctx = app.request_context(None, None);
//! let params = GetListsParams {
//!     actor: "did:plc:alice".to_string(),
//!     ..Default::default()
//! };
//!
//! let output = get_lists(&app, params, &ctx).await.unwrap();
//! assert!(output.body.lists.is_empty());
//! # });
//! ```
//!
//! [`hydrate_lists`]: graphview_hydration::Hydrator::hydrate_lists
//! [`hydrate_profiles`]: graphview_hydration::Hydrator::hydrate_profiles
//! [`Views::list`]: graphview_views::Views::list
//! [`Views::profile_basic`]: graphview_views::Views::profile_basic

#![doc(html_root_url = "https://docs.rs/graphview-endpoints/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod get_lists;
mod get_profiles;
mod output;
mod rules;

pub use context::AppContext;
pub use get_lists::{get_lists, GetListsOutput, GetListsParams, GET_LISTS};
pub use get_profiles::{get_profiles, GetProfilesOutput, GetProfilesParams, GET_PROFILES, MAX_ACTORS};
pub use output::{response_headers, XrpcOutput, JSON_ENCODING};
pub use rules::moderation_rules;
