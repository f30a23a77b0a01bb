//! Handler output.

use graphview_core::{LabelSources, RequestContext, CONTENT_LABELERS_HEADER};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// JSON content type for XRPC responses.
pub const JSON_ENCODING: &str = "application/json";

/// What a handler hands back to the transport layer.
#[derive(Debug, Clone)]
pub struct XrpcOutput<T> {
    /// Content type of `body`.
    pub encoding: &'static str,
    /// Response body.
    pub body: T,
    /// Response headers.
    pub headers: HeaderMap,
}

impl<T: Serialize> XrpcOutput<T> {
    /// Wraps a JSON body with the headers every read response carries.
    pub fn json(body: T, ctx: &RequestContext) -> Self {
        Self {
            encoding: JSON_ENCODING,
            body,
            headers: response_headers(ctx.label_sources()),
        }
    }
}

/// Builds the response headers that report which label sources were applied.
#[must_use]
pub fn response_headers(sources: &LabelSources) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if sources.is_empty() {
        return headers;
    }
    match HeaderValue::from_str(&sources.to_header_value()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(CONTENT_LABELERS_HEADER), value);
        }
        Err(err) => tracing::warn!(error = %err, "label sources are not a valid header value"),
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphview_core::Did;

    #[test]
    fn test_content_labelers_header() {
        let sources = LabelSources::new()
            .with_source(Did::parse("did:plc:moderator").expect("valid did"), true)
            .with_source(Did::parse("did:plc:community").expect("valid did"), false);

        let headers = response_headers(&sources);
        assert_eq!(
            headers
                .get(CONTENT_LABELERS_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("did:plc:moderator;redact,did:plc:community")
        );
    }

    #[test]
    fn test_no_header_without_sources() {
        assert!(response_headers(&LabelSources::new()).is_empty());
    }

    #[test]
    fn test_json_output() {
        let output = XrpcOutput::json(vec![1, 2], &RequestContext::mock());
        assert_eq!(output.encoding, "application/json");
        assert_eq!(output.body, vec![1, 2]);
    }
}
