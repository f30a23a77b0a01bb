//! Hydration errors.

use graphview_core::ServiceError;
use graphview_dataplane::DataplaneError;
use thiserror::Error;

/// A hydration round that could not produce a usable state.
///
/// Per-batch failures are not errors; they hydrate as absent. Only a round
/// in which nothing succeeded and the dataplane was unreachable fails.
#[derive(Debug, Error)]
pub enum HydrationError {
    /// Every batch of a round failed, at least one of them with a transport
    /// failure.
    #[error("dataplane unavailable while hydrating {kinds}: {source}")]
    DataplaneUnavailable {
        /// Comma-separated kinds of the failed round.
        kinds: String,
        /// The first transport failure.
        #[source]
        source: DataplaneError,
    },
}

impl From<HydrationError> for ServiceError {
    fn from(err: HydrationError) -> Self {
        match err {
            HydrationError::DataplaneUnavailable { .. } => Self::unavailable(err.to_string()),
        }
    }
}
