//! # Graphview Views
//!
//! The presentation contract: [`Views`] turns hydrated records into the
//! response shapes clients see.
//!
//! Every view method returns `Option`. `None` means the subject must not be
//! shown: its record is absent, a rules stage marked it invalid, or it was
//! taken down and the request may not see takedowns. Presentation stages
//! skip `None` and never substitute a placeholder.
//!
//! All views serialize with camelCase field names.

#![doc(html_root_url = "https://docs.rs/graphview-views/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod list;
mod profile;

pub use list::{ListView, ListViewBasic, ListViewerView};
pub use profile::{ProfileViewBasic, ProfileViewerView};

use graphview_core::RequestContext;
use graphview_hydration::{HydrationState, Label, LabelSet};

/// Renders views from a [`HydrationState`].
///
/// Stateless and shared by every request through the application context.
#[derive(Debug, Clone, Copy, Default)]
pub struct Views {
    _private: (),
}

impl Views {
    /// Creates the view renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Returns `true` if a record with this takedown marker may be shown.
    pub(crate) fn visible(takedown_ref: Option<&str>, ctx: &RequestContext) -> bool {
        takedown_ref.is_none() || ctx.include_takedowns()
    }

    /// Returns the filtered labels on `subject`, or none if none were hydrated.
    pub(crate) fn labels(subject: &str, state: &HydrationState) -> Vec<Label> {
        state
            .record::<LabelSet>(subject)
            .map(|set| set.labels.clone())
            .unwrap_or_default()
    }
}
