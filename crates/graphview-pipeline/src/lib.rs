//! # Graphview Pipeline
//!
//! Every read endpoint is four stages run in a fixed order:
//!
//! 1. **Skeleton** - select the ordered ids of one page, and the cursor
//! 2. **Hydration** - fetch the records those ids refer to
//! 3. **Rules** - remove or invalidate what the viewer must not see
//! 4. **Presentation** - render the surviving ids in skeleton order
//!
//! Endpoints provide the stages as plain functions; [`Pipeline`] runs them
//! and enforces the contracts between them. Stages never call each other.
//!
//! ## Example
//!
//! ```ignore
//! use graphview_pipeline::{no_rules, Pipeline};
//!
//! let pipeline = Pipeline::new(skeleton, hydration, no_rules::<App, Params>, presentation)
//!     .named("app.bsky.graph.getLists");
//! let page = pipeline.run(&app, params, &request).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/graphview-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod paging;
mod runner;
mod skeleton;
pub mod stages;

pub use paging::{clearly_bad_cursor, Limit, Page};
pub use runner::Pipeline;
pub use skeleton::SkeletonState;
pub use stages::{
    no_rules, Hydration, HydrationInput, Presentation, PresentationInput, Rules, RulesInput,
    Skeleton, SkeletonInput,
};
