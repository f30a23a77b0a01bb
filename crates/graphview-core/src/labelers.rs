//! Moderation label sources.
//!
//! Clients choose which labelers apply to a request with the
//! `atproto-accept-labelers` header, a comma-separated list of DIDs where a
//! `;redact` parameter asks for content carrying that labeler's takedown
//! labels to be removed rather than annotated:
//!
//! ```text
//! atproto-accept-labelers: did:plc:mod;redact, did:plc:community
//! ```
//!
//! Responses echo the sources that were applied in `atproto-content-labelers`.

use crate::ids::Did;
use std::collections::BTreeSet;

/// Request header naming the label sources a client accepts.
pub const ACCEPT_LABELERS_HEADER: &str = "atproto-accept-labelers";

/// Response header naming the label sources that were applied.
pub const CONTENT_LABELERS_HEADER: &str = "atproto-content-labelers";

/// Maximum number of label sources honored per request.
pub const MAX_LABELERS: usize = 20;

/// The label sources active for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSources {
    dids: Vec<Did>,
    redact: BTreeSet<Did>,
}

impl LabelSources {
    /// Creates an empty set of label sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label source. Duplicates are ignored.
    #[must_use]
    pub fn with_source(mut self, did: Did, redact: bool) -> Self {
        self.push(did, redact);
        self
    }

    fn push(&mut self, did: Did, redact: bool) {
        if self.dids.len() >= MAX_LABELERS || self.dids.contains(&did) {
            return;
        }
        if redact {
            self.redact.insert(did.clone());
        }
        self.dids.push(did);
    }

    /// Parses an `atproto-accept-labelers` header value.
    ///
    /// Returns `None` when the value is malformed; callers then fall back to
    /// their defaults.
    #[must_use]
    pub fn parse_header(value: &str) -> Option<Self> {
        let mut sources = Self::new();
        for item in value.split(',') {
            let mut parts = item.split(';').map(str::trim);
            let did = Did::parse(parts.next()?).ok()?;
            let redact = parts.any(|p| p == "redact" || p == "redact=?1");
            sources.push(did, redact);
        }
        Some(sources)
    }

    /// Resolves the sources for a request from its header, falling back to
    /// `defaults` (always redacting) when the header is absent, malformed or
    /// names no sources.
    #[must_use]
    pub fn from_request(header: Option<&str>, defaults: &[Did]) -> Self {
        match header.and_then(Self::parse_header) {
            Some(parsed) if !parsed.is_empty() => parsed,
            _ => defaults
                .iter()
                .cloned()
                .fold(Self::new(), |acc, did| acc.with_source(did, true)),
        }
    }

    /// Returns the source DIDs in request order.
    #[must_use]
    pub fn dids(&self) -> &[Did] {
        &self.dids
    }

    /// Returns `true` when labels from `src` should be honored.
    #[must_use]
    pub fn contains(&self, src: &str) -> bool {
        self.dids.iter().any(|d| d.as_str() == src)
    }

    /// Returns `true` when `src` asked for redaction.
    #[must_use]
    pub fn redacts(&self, src: &str) -> bool {
        self.redact.iter().any(|d| d.as_str() == src)
    }

    /// Returns `true` if no sources are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dids.is_empty()
    }

    /// Returns the number of active sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dids.len()
    }

    /// Formats the `atproto-content-labelers` response header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        self.dids
            .iter()
            .map(|did| {
                if self.redact.contains(did) {
                    format!("{did};redact")
                } else {
                    did.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn did(s: &str) -> Did {
        Did::parse(s).expect("valid did")
    }

    #[test]
    fn test_parse_header() {
        let sources =
            LabelSources::parse_header("did:plc:mod;redact, did:plc:community").expect("valid");
        assert_eq!(sources.len(), 2);
        assert!(sources.contains("did:plc:mod"));
        assert!(sources.redacts("did:plc:mod"));
        assert!(!sources.redacts("did:plc:community"));
    }

    #[test]
    fn test_parse_header_rejects_malformed() {
        assert!(LabelSources::parse_header("not a did").is_none());
        assert!(LabelSources::parse_header("did:plc:a,,did:plc:b").is_none());
    }

    #[test]
    fn test_parse_header_dedups_and_caps() {
        let header = (0..30)
            .map(|i| format!("did:plc:l{i}"))
            .chain(std::iter::once("did:plc:l0".to_string()))
            .collect::<Vec<_>>()
            .join(",");
        let sources = LabelSources::parse_header(&header).expect("valid");
        assert_eq!(sources.len(), MAX_LABELERS);
    }

    #[test]
    fn test_from_request_falls_back_to_defaults() {
        let defaults = vec![did("did:plc:default")];

        let missing = LabelSources::from_request(None, &defaults);
        assert_eq!(missing.dids(), defaults.as_slice());
        assert!(missing.redacts("did:plc:default"));

        let malformed = LabelSources::from_request(Some("???"), &defaults);
        assert_eq!(malformed.dids(), defaults.as_slice());

        let explicit = LabelSources::from_request(Some("did:plc:other"), &defaults);
        assert_eq!(explicit.dids(), &[did("did:plc:other")]);
    }

    #[test]
    fn test_header_value_round_trip_order() {
        let sources = LabelSources::new()
            .with_source(did("did:plc:b"), false)
            .with_source(did("did:plc:a"), true);
        assert_eq!(sources.to_header_value(), "did:plc:b,did:plc:a;redact");
    }
}
