//! Mappings from schema locations to requested type identities.
//!
//! Mappings come from configuration files before a run starts and are extended
//! by the engine whenever it needs a name for an unmapped location.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::location::SchemaLocation;
use crate::type_ref::TypeRef;

/// A pinned or synthesized association from a schema location to a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    target: SchemaLocation,
    type_ref: Option<TypeRef>,
}

impl Mapping {
    pub fn new(target: SchemaLocation, type_ref: Option<TypeRef>) -> Self {
        Self { target, type_ref }
    }

    pub fn target(&self) -> &SchemaLocation {
        &self.target
    }

    /// The requested type; `None` until the engine synthesizes one.
    pub fn type_ref(&self) -> Option<&TypeRef> {
        self.type_ref.as_ref()
    }
}

/// Store of mappings keyed by canonical schema location.
///
/// Performs no validation of the mapped types.
#[derive(Debug, Default)]
pub struct MappingStore {
    mappings: HashMap<SchemaLocation, Mapping>,
}

impl MappingStore {
    pub fn get(&self, location: &SchemaLocation) -> Option<&Mapping> {
        self.mappings.get(location)
    }

    /// Insert a mapping under its target, replacing any previous one.
    pub fn put(&mut self, mapping: Mapping) {
        self.mappings.insert(mapping.target.clone(), mapping);
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// On-disk mapping configuration.
///
/// ```json
/// { "baseUri": "http://example.com/schemas/",
///   "mappings": [
///     { "target": "simple.json#/definitions/type",
///       "typeRef": { "namespace": "com.example", "name": "Type" } },
///     { "target": "other.json#", "className": "com.example.Other" } ] }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingFile {
    #[serde(default)]
    pub base_uri: Option<String>,

    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
}

/// A single entry of a [`MappingFile`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    /// Target URI, possibly relative to the file's base URI.
    pub target: String,

    #[serde(default)]
    pub type_ref: Option<TypeRef>,

    /// Dotted alternative to `typeRef`, e.g. `"com.example.Widget"`.
    #[serde(default)]
    pub class_name: Option<String>,
}

impl MappingFile {
    /// Read and parse a mapping file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve every entry into a [`Mapping`], in file order.
    pub fn resolve(&self) -> Result<Vec<Mapping>> {
        let base = self
            .base_uri
            .as_deref()
            .map(|uri| {
                Url::parse(uri).map_err(|source| Error::InvalidUri {
                    uri: uri.to_string(),
                    source,
                })
            })
            .transpose()?;

        self.mappings
            .iter()
            .map(|entry| {
                let target = match &base {
                    Some(base) => base.join(&entry.target),
                    None => Url::parse(&entry.target),
                }
                .map_err(|source| Error::InvalidUri {
                    uri: entry.target.clone(),
                    source,
                })?;

                let type_ref = match (&entry.type_ref, &entry.class_name) {
                    (Some(type_ref), _) => Some(type_ref.clone()),
                    (None, Some(class_name)) => Some(TypeRef::parse(class_name)?),
                    (None, None) => None,
                };
                Ok(Mapping::new(SchemaLocation::from_url(&target), type_ref))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_is_keyed_by_canonical_location() {
        let mut store = MappingStore::default();
        let target = SchemaLocation::parse("http://example.com/a.json").unwrap();
        store.put(Mapping::new(target, Some(TypeRef::new("pkg", "A"))));

        let same = SchemaLocation::parse("http://example.com/a.json#").unwrap();
        let mapping = store.get(&same).expect("mapping should be found");
        assert_eq!(mapping.type_ref(), Some(&TypeRef::new("pkg", "A")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn mapping_file_resolves_against_base_uri() {
        let file = MappingFile::parse(
            r#"{
                "baseUri": "http://example.com/schemas/",
                "mappings": [
                    {"target": "simple.json#/definitions/type",
                     "typeRef": {"namespace": "com.example.test", "name": "Type"}},
                    {"target": "other.json#", "className": "com.example.test.Other"},
                    {"target": "anon.json#"}
                ]
            }"#,
        )
        .unwrap();
        let mappings = file.resolve().unwrap();
        assert_eq!(mappings.len(), 3);

        assert_eq!(
            mappings[0].target().uri().as_str(),
            "http://example.com/schemas/simple.json#/definitions/type"
        );
        assert_eq!(
            mappings[0].type_ref(),
            Some(&TypeRef::new("com.example.test", "Type"))
        );
        assert_eq!(
            mappings[1].type_ref(),
            Some(&TypeRef::new("com.example.test", "Other"))
        );
        assert_eq!(mappings[2].type_ref(), None);
    }

    #[test]
    fn relative_target_without_base_is_rejected() {
        let file = MappingFile::parse(r#"{"mappings": [{"target": "a.json#"}]}"#).unwrap();
        let err = file.resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidUri { .. }));
    }
}
