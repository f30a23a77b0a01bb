//! Label filtering.
//!
//! Label sets come back from the dataplane with every label ever issued on
//! a subject. Only labels from the request's active sources count, and a
//! negation cancels the matching earlier label.

use crate::records::{Label, LabelSet};
use crate::state::HydrationState;
use graphview_core::LabelSources;

/// Keeps the labels a request should see.
#[must_use]
pub fn filter_labels(set: &LabelSet, sources: &LabelSources) -> LabelSet {
    let mut kept: Vec<Label> = Vec::with_capacity(set.labels.len());
    for label in set.labels.iter().filter(|l| sources.contains(&l.src)) {
        if label.neg {
            kept.retain(|l| !(l.src == label.src && l.uri == label.uri && l.val == label.val));
        } else {
            kept.push(label.clone());
        }
    }
    LabelSet { labels: kept }
}

/// Replaces the label sets of `subjects` in `state` with their filtered form.
pub fn apply_label_sources<'a>(
    state: &mut HydrationState,
    subjects: impl IntoIterator<Item = &'a str>,
    sources: &LabelSources,
) {
    for subject in subjects {
        let filtered = match state.record::<LabelSet>(subject) {
            Some(set) => filter_labels(set, sources),
            None => continue,
        };
        state.insert(subject, filtered);
    }
}
