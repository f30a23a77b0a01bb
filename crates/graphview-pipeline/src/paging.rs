//! Cursor and limit helpers.

use serde::{Deserialize, Serialize};

/// One page of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rendered items in skeleton order.
    pub items: Vec<T>,
    /// Cursor for the next page; present only when more results may exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    /// An empty final page.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
        }
    }
}

/// Returns `true` for cursors this service can never have issued.
///
/// Cursors from the older `<timestamp>::<cid>` scheme contain `::`; a
/// skeleton stage treats them as the end of the results.
#[must_use]
pub fn clearly_bad_cursor(cursor: Option<&str>) -> bool {
    cursor.is_some_and(|c| c.contains("::"))
}

/// A resolved page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Limit(usize);

impl Limit {
    /// Resolves a requested limit: `default` when absent, clamped to `1..=max`.
    #[must_use]
    pub fn resolve(requested: Option<usize>, default: usize, max: usize) -> Self {
        let max = max.max(1);
        Self(requested.unwrap_or(default).clamp(1, max))
    }

    /// Returns the page size.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clearly_bad_cursor() {
        assert!(!clearly_bad_cursor(None));
        assert!(!clearly_bad_cursor(Some("3kabc")));
        assert!(clearly_bad_cursor(Some("1700000000000::bafyabc")));
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(Limit::resolve(None, 50, 100).get(), 50);
        assert_eq!(Limit::resolve(Some(0), 50, 100).get(), 1);
        assert_eq!(Limit::resolve(Some(500), 50, 100).get(), 100);
        assert_eq!(Limit::resolve(Some(7), 50, 100).get(), 7);
    }

    #[test]
    fn test_page_cursor_omitted_when_none() {
        let page: Page<u32> = Page::empty();
        let json = serde_json::to_string(&page).expect("serialization should work");
        assert_eq!(json, r#"{"items":[]}"#);
    }

    proptest! {
        #[test]
        fn limit_always_in_range(requested in proptest::option::of(0usize..10_000), max in 0usize..500) {
            let limit = Limit::resolve(requested, 50, max).get();
            prop_assert!(limit >= 1);
            prop_assert!(limit <= max.max(1));
        }
    }
}
