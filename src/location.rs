//! Schema locations: a fragment-free document URI plus a JSON Pointer.
//!
//! Every type-generation request is keyed by a [`SchemaLocation`]. Two URIs that
//! differ only in how the fragment is spelled (`a.json` vs. `a.json#`, or a
//! percent-encoded vs. literal pointer) normalize to the same location.

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;

use crate::error::{Error, Result};

/// Characters escaped when a pointer is placed into a URI fragment.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'%');

/// One node within a loaded schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaLocation {
    root: Url,
    pointer: String,
}

impl SchemaLocation {
    /// Build a location from a document URI and an unescaped-URI JSON Pointer.
    ///
    /// Any fragment on `root` is discarded.
    pub fn new(root: &Url, pointer: impl Into<String>) -> Self {
        let mut root = root.clone();
        root.set_fragment(None);
        Self {
            root,
            pointer: pointer.into(),
        }
    }

    /// Split a URI into its document and its (percent-decoded) fragment pointer.
    pub fn from_url(url: &Url) -> Self {
        let pointer = url
            .fragment()
            .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        Self::new(url, pointer)
    }

    /// Parse a URI string into a location.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|source| Error::InvalidUri {
            uri: uri.to_string(),
            source,
        })?;
        Ok(Self::from_url(&url))
    }

    /// The fragment-free document URI.
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The JSON Pointer into the document (`""` for the document itself).
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// The canonical URI: document plus pointer as fragment (always present).
    pub fn uri(&self) -> Url {
        let mut uri = self.root.clone();
        let fragment = utf8_percent_encode(&self.pointer, FRAGMENT).to_string();
        uri.set_fragment(Some(&fragment));
        uri
    }

    /// The location of a direct child node named `segment`.
    pub fn child(&self, segment: &str) -> Self {
        Self {
            root: self.root.clone(),
            pointer: format!("{}/{}", self.pointer, escape_segment(segment)),
        }
    }

    /// Resolve a `$ref` value relative to this location.
    pub fn join(&self, reference: &str) -> Result<Self> {
        let joined = self
            .uri()
            .join(reference)
            .map_err(|_| Error::InvalidReference {
                location: self.uri(),
                reference: reference.to_string(),
            })?;
        Ok(Self::from_url(&joined))
    }

    /// Unescaped pointer segments, skipping the leading empty segment.
    pub fn segments(&self) -> impl Iterator<Item = String> + '_ {
        self.pointer
            .split('/')
            .skip(1)
            .map(unescape_segment)
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

/// Escape a single JSON Pointer reference token (RFC 6901).
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Undo [`escape_segment`].
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_spellings_normalize_to_one_location() {
        let a = SchemaLocation::parse("http://example.com/a.json").unwrap();
        let b = SchemaLocation::parse("http://example.com/a.json#").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.uri().as_str(), "http://example.com/a.json#");
    }

    #[test]
    fn child_escapes_pointer_tokens() {
        let root = SchemaLocation::parse("http://example.com/a.json#").unwrap();
        let child = root.child("properties").child("a/b~c");
        assert_eq!(child.pointer(), "/properties/a~1b~0c");
        assert_eq!(
            child.segments().collect::<Vec<_>>(),
            vec!["properties".to_string(), "a/b~c".to_string()]
        );
    }

    #[test]
    fn percent_encoded_fragment_round_trips() {
        let location = SchemaLocation::parse("http://example.com/a.json#").unwrap();
        let child = location.child("properties").child("first name");
        let reparsed = SchemaLocation::from_url(&child.uri());
        assert_eq!(reparsed, child);
        assert_eq!(reparsed.pointer(), "/properties/first name");
    }

    #[test]
    fn join_resolves_fragment_only_reference() {
        let location = SchemaLocation::parse("http://example.com/dir/a.json#/properties/x").unwrap();
        let target = location.join("#/definitions/node").unwrap();
        assert_eq!(target.root().as_str(), "http://example.com/dir/a.json");
        assert_eq!(target.pointer(), "/definitions/node");
    }

    #[test]
    fn join_resolves_relative_document_reference() {
        let location = SchemaLocation::parse("http://example.com/dir/a.json#/properties/x").unwrap();
        let target = location.join("b.json").unwrap();
        assert_eq!(target.root().as_str(), "http://example.com/dir/b.json");
        assert_eq!(target.pointer(), "");
    }
}
