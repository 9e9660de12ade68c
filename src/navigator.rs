//! Navigation from a schema location to the schema node it names.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::loader::SchemaLoader;
use crate::location::SchemaLocation;

static NULL: Value = Value::Null;

/// A schema node together with the location it was found at.
///
/// Cloning is cheap: the underlying document is shared.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    document: Rc<Value>,
    location: SchemaLocation,
}

impl SchemaTree {
    pub fn location(&self) -> &SchemaLocation {
        &self.location
    }

    /// The node at this tree's location.
    pub fn node(&self) -> &Value {
        self.document
            .pointer(self.location.pointer())
            .unwrap_or(&NULL)
    }

    /// A keyword of this node, if the node is an object that has it.
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.node().get(keyword)
    }
}

/// Resolves locations against documents obtained from a [`SchemaLoader`].
///
/// Each document is requested from the loader at most once.
pub struct SchemaNavigator {
    loader: Box<dyn SchemaLoader>,
    documents: HashMap<Url, Rc<Value>>,
}

impl SchemaNavigator {
    pub fn new(loader: impl SchemaLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            documents: HashMap::new(),
        }
    }

    /// Find the schema node at `location`.
    ///
    /// Fails with [`Error::MissingSchema`] if the document is unknown or the
    /// pointer does not exist in it.
    pub fn resolve(&mut self, location: &SchemaLocation) -> Result<SchemaTree> {
        let document = self.document(location)?;
        if document.pointer(location.pointer()).is_none() {
            return Err(Error::MissingSchema {
                location: location.uri(),
            });
        }
        Ok(SchemaTree {
            document,
            location: location.clone(),
        })
    }

    fn document(&mut self, location: &SchemaLocation) -> Result<Rc<Value>> {
        if let Some(document) = self.documents.get(location.root()) {
            return Ok(Rc::clone(document));
        }
        let document = self
            .loader
            .load(location.root())?
            .ok_or_else(|| Error::MissingSchema {
                location: location.uri(),
            })?;
        let document = Rc::new(document);
        self.documents
            .insert(location.root().clone(), Rc::clone(&document));
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::loader::PreloadedLoader;

    struct CountingLoader {
        inner: PreloadedLoader,
        calls: Rc<Cell<usize>>,
    }

    impl SchemaLoader for CountingLoader {
        fn load(&self, uri: &Url) -> Result<Option<Value>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.load(uri)
        }
    }

    fn navigator(calls: Rc<Cell<usize>>) -> SchemaNavigator {
        let mut inner = PreloadedLoader::default();
        inner.preload(
            &Url::parse("http://example.com/a.json").unwrap(),
            serde_json::json!({
                "definitions": {"node": {"type": "object"}}
            }),
        );
        SchemaNavigator::new(CountingLoader { inner, calls })
    }

    #[test]
    fn resolves_pointer_into_document() {
        let mut nav = navigator(Rc::new(Cell::new(0)));
        let location = SchemaLocation::parse("http://example.com/a.json#/definitions/node").unwrap();
        let tree = nav.resolve(&location).unwrap();
        assert_eq!(tree.get("type"), Some(&Value::from("object")));
        assert_eq!(tree.location(), &location);
    }

    #[test]
    fn loads_each_document_once() {
        let calls = Rc::new(Cell::new(0));
        let mut nav = navigator(Rc::clone(&calls));
        for pointer in ["", "/definitions", "/definitions/node"] {
            let location =
                SchemaLocation::parse(&format!("http://example.com/a.json#{pointer}")).unwrap();
            nav.resolve(&location).unwrap();
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn missing_pointer_and_document_are_errors() {
        let mut nav = navigator(Rc::new(Cell::new(0)));
        let bad_pointer = SchemaLocation::parse("http://example.com/a.json#/definitions/nope").unwrap();
        assert!(matches!(
            nav.resolve(&bad_pointer),
            Err(Error::MissingSchema { .. })
        ));

        let bad_document = SchemaLocation::parse("http://example.com/b.json#").unwrap();
        assert!(matches!(
            nav.resolve(&bad_document),
            Err(Error::MissingSchema { .. })
        ));
    }
}
