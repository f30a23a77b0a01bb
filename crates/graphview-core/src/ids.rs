//! Identifier syntax.
//!
//! Actors are addressed by [`Did`]s and records by [`AtUri`]s of the form
//! `at://<did>/<collection>/<rkey>`. The authority of a record URI is the
//! DID of the repository that holds it, i.e. the record's creator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Identifier parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Not a syntactically valid DID.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// Not a syntactically valid AT-URI.
    #[error("invalid AT-URI: {0}")]
    InvalidAtUri(String),
}

const DID_PATTERN: &str = r"^did:[a-z]+:[a-zA-Z0-9._:%-]*[a-zA-Z0-9._-]$";

const AT_URI_PATTERN: &str = r"^at://(?P<authority>[^/?#]+)(?:/(?P<collection>[a-zA-Z0-9.-]+)(?:/(?P<rkey>[a-zA-Z0-9._:~-]+))?)?$";

// Literal patterns, compiled once. `test_patterns_compile` guards the expects.

fn did_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DID_PATTERN).expect("DID pattern compiles"))
}

fn at_uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(AT_URI_PATTERN).expect("AT-URI pattern compiles"))
}

/// A decentralized identifier for an actor, e.g. `did:plc:ewvi7nxzyoun6zhxrhs64oiz`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parses a DID, validating its syntax.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.len() > 2048 || !did_regex().is_match(&value) {
            return Err(IdError::InvalidDid(value));
        }
        Ok(Self(value))
    }

    /// Returns the DID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the DID method, e.g. `plc` or `web`.
    #[must_use]
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Did {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Did {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A record address, e.g. `at://did:plc:abc/app.bsky.graph.list/3kabc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtUri {
    raw: String,
    authority_end: usize,
    collection: Option<(usize, usize)>,
    rkey: Option<(usize, usize)>,
}

impl AtUri {
    /// Parses an AT-URI.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let raw = value.into();
        let caps = match at_uri_regex().captures(&raw) {
            Some(caps) => caps,
            None => return Err(IdError::InvalidAtUri(raw)),
        };
        let authority_end = caps.name("authority").map_or(0, |m| m.end());
        let collection = caps.name("collection").map(|m| (m.start(), m.end()));
        let rkey = caps.name("rkey").map(|m| (m.start(), m.end()));
        Ok(Self {
            raw,
            authority_end,
            collection,
            rkey,
        })
    }

    /// Returns the repository authority (normally a DID).
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.raw["at://".len()..self.authority_end]
    }

    /// Returns the collection NSID, if present.
    #[must_use]
    pub fn collection(&self) -> Option<&str> {
        self.collection.map(|(s, e)| &self.raw[s..e])
    }

    /// Returns the record key, if present.
    #[must_use]
    pub fn rkey(&self) -> Option<&str> {
        self.rkey.map(|(s, e)| &self.raw[s..e])
    }

    /// Returns the full URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for AtUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for AtUri {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(Regex::new(DID_PATTERN).is_ok());
        assert!(Regex::new(AT_URI_PATTERN).is_ok());
    }

    #[test]
    fn test_did_parse() {
        let did = Did::parse("did:plc:ewvi7nxzyoun6zhxrhs64oiz").expect("valid did");
        assert_eq!(did.method(), "plc");
        assert_eq!(did.to_string(), "did:plc:ewvi7nxzyoun6zhxrhs64oiz");

        let web: Did = "did:web:example.com".parse().expect("valid did");
        assert_eq!(web.method(), "web");
    }

    #[test]
    fn test_did_rejects_garbage() {
        assert!(Did::parse("alice.example.com").is_err());
        assert!(Did::parse("did:plc:").is_err());
        assert!(Did::parse("did:PLC:abc").is_err());
        assert!(Did::parse("").is_err());
    }

    #[test]
    fn test_did_serde_validates() {
        let ok: Result<Did, _> = serde_json::from_str("\"did:plc:abc\"");
        assert!(ok.is_ok());
        let bad: Result<Did, _> = serde_json::from_str("\"not-a-did\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_at_uri_parts() {
        let uri = AtUri::parse("at://did:plc:abc/app.bsky.graph.list/3kabc").expect("valid uri");
        assert_eq!(uri.authority(), "did:plc:abc");
        assert_eq!(uri.collection(), Some("app.bsky.graph.list"));
        assert_eq!(uri.rkey(), Some("3kabc"));
    }

    #[test]
    fn test_at_uri_authority_only() {
        let uri = AtUri::parse("at://did:plc:abc").expect("valid uri");
        assert_eq!(uri.authority(), "did:plc:abc");
        assert!(uri.collection().is_none());
        assert!(uri.rkey().is_none());
    }

    #[test]
    fn test_at_uri_rejects_other_schemes() {
        assert!(AtUri::parse("https://example.com/x").is_err());
        assert!(AtUri::parse("at://").is_err());
    }
}
