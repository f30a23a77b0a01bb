//! Error types for graphview.
//!
//! [`ServiceError`] is the only error a pipeline run surfaces to its caller.
//! Absent records, expired cursors and per-batch fetch failures never become
//! a `ServiceError`; they degrade to smaller or empty pages.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ServiceError`].
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request failed a semantic precondition.
    Validation,
    /// A downstream dependency is unavailable.
    Unavailable,
    /// The request deadline was exceeded.
    Timeout,
    /// Internal invariant violated.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the category name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
        }
    }
}

/// Error returned by a pipeline run.
///
/// # Example
///
/// ```
/// use graphview_core::{ErrorCategory, ServiceError};
///
/// let err = ServiceError::unavailable("dataplane unreachable");
/// assert_eq!(err.category(), ErrorCategory::Unavailable);
/// assert!(err.is_retryable());
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The request parameters are semantically invalid.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable error message.
        message: String,
    },

    /// The dataplane could not serve a whole hydration round.
    #[error("Service unavailable: {message}")]
    Unavailable {
        /// Human-readable error message.
        message: String,
    },

    /// The request deadline passed before the pipeline finished.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// A stage broke the pipeline contract, or another bug surfaced.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ServiceError {
    /// Creates an invalid-request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Unavailable { .. } => ErrorCategory::Unavailable,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns `true` if a client may retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }

    /// Returns the XRPC error name.
    #[must_use]
    pub const fn error_name(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "InvalidRequest",
            Self::Unavailable { .. } => "UpstreamFailure",
            Self::Timeout { .. } => "UpstreamTimeout",
            Self::Internal { .. } => "InternalServerError",
        }
    }

    /// Converts this error to the XRPC error body.
    ///
    /// Internal errors hide their message behind a generic one.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let message = match self {
            Self::Internal { .. } => "Internal Server Error".to_string(),
            Self::InvalidRequest { message }
            | Self::Unavailable { message }
            | Self::Timeout { message } => message.clone(),
        };
        ErrorEnvelope {
            error: self.error_name().to_string(),
            message,
        }
    }
}

/// Serializable XRPC error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Machine-readable error name.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}
