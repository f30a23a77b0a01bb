//! Dataplane errors.

use thiserror::Error;

/// A failed dataplane call.
#[derive(Debug, Clone, Error)]
pub enum DataplaneError {
    /// The dataplane could not be reached at all.
    #[error("dataplane unreachable: {0}")]
    Unreachable(String),

    /// The call did not complete in time.
    #[error("dataplane call timed out after {0}ms")]
    Timeout(u64),

    /// The dataplane answered with an error.
    #[error("dataplane error: {0}")]
    Backend(String),

    /// The dataplane answered with something that could not be understood.
    #[error("malformed dataplane response: {0}")]
    Malformed(String),
}

impl DataplaneError {
    /// Returns `true` for hard transport failures.
    ///
    /// A hydration round in which every batch failed, at least one of them
    /// with a transport failure, aborts the pipeline.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Returns a short label for metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::Timeout(_) => "timeout",
            Self::Backend(_) => "backend",
            Self::Malformed(_) => "malformed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unreachable_is_transport() {
        assert!(DataplaneError::Unreachable("refused".into()).is_transport());
        assert!(!DataplaneError::Timeout(1000).is_transport());
        assert!(!DataplaneError::Backend("boom".into()).is_transport());
        assert!(!DataplaneError::Malformed("eof".into()).is_transport());
    }

    #[test]
    fn test_display() {
        let err = DataplaneError::Timeout(250);
        assert_eq!(err.to_string(), "dataplane call timed out after 250ms");
        assert_eq!(err.label(), "timeout");
    }
}
