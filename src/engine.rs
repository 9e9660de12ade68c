//! The generation engine: turns schema locations into type identities.
//!
//! Every location moves through a small state machine, recorded as a
//! [`GenerationRecord`]:
//!
//! | From | To | When |
//! |------|----|------|
//! | unseen | `Pending` | first request, before any child is generated |
//! | `Pending` | `Resolved(Some(t))` | a generator produced `t` |
//! | `Pending` | `Resolved(None)` | the schema's kind is `null` |
//! | `Pending` | `Failed(t)` | generation failed and `ignore-missing-types` is set |
//! | `Pending` | unseen | generation failed otherwise (the error propagates) |
//!
//! A request for a `Pending` location returns the type bound by its mapping,
//! which is what lets self-referencing and mutually referencing schemas
//! terminate. Pending arrays and `$ref` aliases emit no type of their own, so
//! they stand for the list of their element type or for their target instead.
//! Resolved and failed locations are never generated again.
//!
//! A synthesized name is given back when its location resolves to some other
//! type, so only emitted types hold names.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use url::Url;

use crate::config::{DEFAULT_NAMESPACE, Feature, FeatureType, Features, IGNORE_MISSING_TYPES};
use crate::emitter::SourceWriter;
use crate::error::{Error, Result};
use crate::generator::{GenerationContext, GeneratorRegistry, TypeGenerator};
use crate::loader::SchemaLoader;
use crate::location::SchemaLocation;
use crate::mapping::{Mapping, MappingStore};
use crate::naming::{NameRegistry, type_name_for};
use crate::navigator::{SchemaNavigator, SchemaTree};
use crate::output::OutputSink;
use crate::resolver;
use crate::type_ref::{KnownTypes, TypeRef};

/// Kind assumed for schemas without a `type` keyword.
const DEFAULT_KIND: &str = "object";

/// One hop from a pending location towards the type it stands for.
enum PendingStep {
    /// A `$ref`-only node: stands for its target.
    Alias(SchemaLocation),
    /// An array: stands for a list of its `items` type.
    Items(SchemaLocation),
}

/// Per-location generation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRecord {
    /// Generation has started and not yet finished.
    Pending,
    /// Generation finished; `None` for locations that produce no type.
    Resolved(Option<TypeRef>),
    /// Generation failed and the requested type is assumed instead.
    Failed(TypeRef),
}

/// Orchestrates navigation, reference resolution, dispatch, and output for
/// one generation run.
///
/// All state is run-scoped; use a fresh engine for an independent run.
pub struct Engine {
    features: Features,
    known_types: KnownTypes,
    mappings: MappingStore,
    names: NameRegistry,
    navigator: SchemaNavigator,
    generators: GeneratorRegistry,
    records: HashMap<SchemaLocation, GenerationRecord>,
    output: Box<dyn OutputSink>,
}

impl Engine {
    /// Create an engine reading schemas through `loader` and writing sources to `output`.
    pub fn new(loader: impl SchemaLoader + 'static, output: impl OutputSink + 'static) -> Self {
        Self {
            features: Features::default(),
            known_types: KnownTypes::default(),
            mappings: MappingStore::default(),
            names: NameRegistry::default(),
            navigator: SchemaNavigator::new(loader),
            generators: GeneratorRegistry::with_defaults(),
            records: HashMap::new(),
            output: Box::new(output),
        }
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    /// Set a feature, returning its previously effective value.
    pub fn set_feature<T: FeatureType>(&mut self, feature: &Feature<T>, value: T) -> T {
        self.features.set(feature, value)
    }

    pub fn known_types_mut(&mut self) -> &mut KnownTypes {
        &mut self.known_types
    }

    pub fn mappings(&self) -> &MappingStore {
        &self.mappings
    }

    /// Add a configured mapping. Its type name is reserved against synthesized names.
    pub fn add_mapping(&mut self, mapping: Mapping) {
        if let Some(type_ref) = mapping.type_ref() {
            self.names.reserve(type_ref);
        }
        self.mappings.put(mapping);
    }

    /// Register (or replace) the generator for a schema kind.
    pub fn register_generator(&mut self, kind: impl Into<String>, generator: impl TypeGenerator + 'static) {
        self.generators.register(kind, generator);
    }

    /// The generation state of `location`, if it has been requested.
    pub fn record(&self, location: &SchemaLocation) -> Option<&GenerationRecord> {
        self.records.get(location)
    }

    /// Generate the type for the schema at `uri`.
    pub fn generate(&mut self, uri: &Url) -> Result<Option<TypeRef>> {
        self.generate_location(&SchemaLocation::from_url(uri))
    }

    /// Generate each of `uris`, stopping at the first failure.
    pub fn generate_all<'u>(
        &mut self,
        uris: impl IntoIterator<Item = &'u Url>,
    ) -> Result<Vec<(Url, Option<TypeRef>)>> {
        let mut results = Vec::new();
        for uri in uris {
            let type_ref = self.generate(uri)?;
            results.push((uri.clone(), type_ref));
        }
        Ok(results)
    }

    /// Generate (or look up) the type for `location`.
    pub fn generate_location(&mut self, location: &SchemaLocation) -> Result<Option<TypeRef>> {
        match self.records.get(location) {
            Some(GenerationRecord::Resolved(type_ref)) => {
                tracing::debug!("{location}: already generated");
                return Ok(type_ref.clone());
            }
            Some(GenerationRecord::Failed(type_ref)) => return Ok(Some(type_ref.clone())),
            Some(GenerationRecord::Pending) => {
                tracing::debug!("{location}: in progress");
                return self.pending_type(location);
            }
            None => {}
        }

        let (mapping, type_ref, synthesized) = self.mapping_for(location);
        self.records.insert(location.clone(), GenerationRecord::Pending);

        match self.generate_internal(&mapping, &type_ref) {
            Ok(generated) => {
                if synthesized && generated.as_ref() != Some(&type_ref) {
                    tracing::debug!("{location}: resolved without emitting {type_ref}, releasing name");
                    self.names.release(&type_ref);
                    self.mappings.put(Mapping::new(location.clone(), None));
                }
                self.records
                    .insert(location.clone(), GenerationRecord::Resolved(generated.clone()));
                Ok(generated)
            }
            Err(e) => {
                let error = Error::CodeGeneration {
                    location: location.uri(),
                    source: Box::new(e),
                };
                if self.features.get(&IGNORE_MISSING_TYPES) {
                    tracing::warn!(
                        "{location}: ignoring generation failure, assuming {type_ref} exists: {}",
                        error.root_cause()
                    );
                    self.records
                        .insert(location.clone(), GenerationRecord::Failed(type_ref.clone()));
                    Ok(Some(type_ref))
                } else {
                    self.records.remove(location);
                    Err(error)
                }
            }
        }
    }

    /// The type a `Pending` location stands for while it is being generated.
    ///
    /// Aliases and arrays are followed through other pending locations; a
    /// cycle of them falls back to the mapped type.
    fn pending_type(&mut self, location: &SchemaLocation) -> Result<Option<TypeRef>> {
        let mut lists = 0usize;
        let mut seen = HashSet::new();
        let mut current = location.clone();
        while self.records.get(&current) == Some(&GenerationRecord::Pending) {
            if !seen.insert(current.clone()) {
                return Ok(self.mapped_type(location));
            }
            match self.pending_step(&current)? {
                Some(PendingStep::Alias(target)) => current = target,
                Some(PendingStep::Items(target)) => {
                    lists += 1;
                    current = target;
                }
                None => break,
            }
        }
        if current == *location {
            return Ok(self.mapped_type(location));
        }

        let element = if self.records.get(&current) == Some(&GenerationRecord::Pending) {
            self.mapped_type(&current)
        } else {
            self.generate_location(&current)?
        };
        let Some(mut type_ref) = element else {
            return Ok(self.mapped_type(location));
        };
        for _ in 0..lists {
            type_ref = TypeRef::list_of(&type_ref);
        }
        Ok(Some(type_ref))
    }

    fn pending_step(&mut self, location: &SchemaLocation) -> Result<Option<PendingStep>> {
        let schema = self.navigator.resolve(location)?;
        if let Some(target) = resolver::reference_target(location, schema.node())? {
            return Ok(Some(PendingStep::Alias(target)));
        }
        if !is_array_kind(&schema) {
            return Ok(None);
        }
        match schema.get("items") {
            Some(items) if !items.is_array() => {
                let target = resolver::target_of(&location.child("items"), items)?;
                Ok(target.map(PendingStep::Items))
            }
            _ => Ok(None),
        }
    }

    fn mapped_type(&self, location: &SchemaLocation) -> Option<TypeRef> {
        self.mappings.get(location).and_then(Mapping::type_ref).cloned()
    }

    /// The mapping for `location`, binding a synthesized type if it has none.
    ///
    /// The flag is set when the type was synthesized by this call.
    fn mapping_for(&mut self, location: &SchemaLocation) -> (Mapping, TypeRef, bool) {
        if let Some(mapping) = self.mappings.get(location) {
            if let Some(type_ref) = mapping.type_ref() {
                return (mapping.clone(), type_ref.clone(), false);
            }
        }

        let namespace = self.features.get(&DEFAULT_NAMESPACE);
        let type_ref = self.names.unique(&namespace, &type_name_for(location));
        tracing::debug!("{location}: no mapping defined, using {type_ref}");
        let mapping = Mapping::new(location.clone(), Some(type_ref.clone()));
        self.mappings.put(mapping.clone());
        (mapping, type_ref, true)
    }

    fn generate_internal(&mut self, mapping: &Mapping, type_ref: &TypeRef) -> Result<Option<TypeRef>> {
        // Pinned primitives and existing types win over whatever the schema says.
        if type_ref.is_primitive() || self.known_types.is_existing(type_ref) {
            return Ok(Some(type_ref.clone()));
        }

        let location = mapping.target();
        let schema = self.navigator.resolve(location)?;
        if let Some(target) = resolver::reference_target(location, schema.node())? {
            tracing::debug!("{location}: alias of {target}");
            return self.generate_location(&target);
        }
        if !schema.node().is_object() {
            return Err(Error::UnsupportedOperation {
                location: location.uri(),
                message: "schema is not an object".to_string(),
            });
        }

        let Some(kind) = schema_kind(&schema)? else {
            return Ok(None);
        };
        let generator = self
            .generators
            .get(&kind)
            .ok_or_else(|| Error::UnsupportedKind {
                location: location.uri(),
                kind: kind.clone(),
            })?;

        let mut writer = SourceWriter::new();
        let generated = {
            let mut ctx = GenerationContext::new(self, mapping, type_ref);
            generator.generate(&mut ctx, &schema, &mut writer)?
        };

        if !writer.is_empty() {
            let written = generated.clone().unwrap_or_else(|| type_ref.clone());
            tracing::info!("{location}: writing {written}");
            self.output.write(&written, &writer.finish())?;
        }
        Ok(generated)
    }
}

/// Whether `schema` declares `array` as its only non-null kind.
fn is_array_kind(schema: &SchemaTree) -> bool {
    match schema.get("type") {
        Some(Value::String(kind)) => kind == "array",
        Some(Value::Array(kinds)) => {
            let mut kinds = kinds.iter().filter_map(Value::as_str).filter(|kind| *kind != "null");
            kinds.next() == Some("array") && kinds.next().is_none()
        }
        _ => false,
    }
}

/// The declared kind of `schema`, `None` for `null`.
///
/// A missing `type` means `object`. In a `type` array `null` members are
/// dropped; exactly one other kind may remain.
fn schema_kind(schema: &SchemaTree) -> Result<Option<String>> {
    let location = schema.location();
    match schema.get("type") {
        None => {
            tracing::warn!("{location}: missing type keyword, assuming '{DEFAULT_KIND}'");
            Ok(Some(DEFAULT_KIND.to_string()))
        }
        Some(Value::String(kind)) if kind == "null" => Ok(None),
        Some(Value::String(kind)) => Ok(Some(kind.clone())),
        Some(Value::Array(kinds)) => {
            let kinds: Vec<&str> = kinds
                .iter()
                .filter_map(Value::as_str)
                .filter(|kind| *kind != "null")
                .collect();
            match kinds.as_slice() {
                [] => Ok(None),
                [kind] => Ok(Some(kind.to_string())),
                _ => Err(Error::UnsupportedKind {
                    location: location.uri(),
                    kind: kinds.join(", "),
                }),
            }
        }
        Some(other) => Err(Error::UnsupportedKind {
            location: location.uri(),
            kind: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::generator::PrimitiveGenerator;
    use crate::loader::PreloadedLoader;
    use crate::output::MemoryOutput;

    const ROOT: &str = "http://example.com/schema.json";

    fn engine(document: Value) -> (Engine, MemoryOutput) {
        let mut loader = PreloadedLoader::default();
        loader.preload(&Url::parse(ROOT).unwrap(), document);
        let output = MemoryOutput::default();
        (Engine::new(loader, output.clone()), output)
    }

    fn location(pointer: &str) -> SchemaLocation {
        SchemaLocation::parse(&format!("{ROOT}#{pointer}")).unwrap()
    }

    #[test]
    fn type_arrays_drop_null() {
        let (mut engine, _) = engine(json!({
            "definitions": {
                "maybe": {"type": ["integer", "null"]},
                "nothing": {"type": ["null"]},
                "either": {"type": ["integer", "string"]}
            }
        }));
        assert_eq!(
            engine.generate_location(&location("/definitions/maybe")).unwrap(),
            Some(TypeRef::long())
        );
        assert_eq!(engine.generate_location(&location("/definitions/nothing")).unwrap(), None);
        let err = engine
            .generate_location(&location("/definitions/either"))
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::UnsupportedKind { .. }));
    }

    #[test]
    fn failed_generation_is_not_cached() {
        let (mut engine, _) = engine(json!({"definitions": {"odd": {"type": "date"}}}));
        let target = location("/definitions/odd");
        assert!(engine.generate_location(&target).is_err());
        assert_eq!(engine.record(&target), None);

        let date = TypeRef::new("java.time", "LocalDate");
        engine.register_generator("date", PrimitiveGenerator::new(date.clone()));
        assert_eq!(engine.generate_location(&target).unwrap(), Some(date));
    }

    #[test]
    fn tolerated_failure_is_recorded() {
        let (mut engine, output) = engine(json!({"definitions": {}}));
        engine.set_feature(&IGNORE_MISSING_TYPES, true);
        let target = location("/definitions/gone");
        let assumed = TypeRef::new("anonymous", "Gone");
        assert_eq!(engine.generate_location(&target).unwrap(), Some(assumed.clone()));
        assert_eq!(engine.record(&target), Some(&GenerationRecord::Failed(assumed)));
        assert_eq!(output.write_count(), 0);
    }

    #[test]
    fn ref_only_node_aliases_its_target() {
        let (mut engine, output) = engine(json!({
            "definitions": {
                "alias": {"$ref": "#/definitions/real"},
                "real": {"type": "object", "properties": {}}
            }
        }));
        let real = engine.generate_location(&location("/definitions/alias")).unwrap();
        assert_eq!(real, Some(TypeRef::new("anonymous", "Real")));
        assert_eq!(output.paths().len(), 1);
    }

    #[test]
    fn pending_alias_stands_for_its_target() {
        let (mut engine, output) = engine(json!({
            "definitions": {
                "alias": {"$ref": "#/definitions/node"},
                "node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/alias"}}}
            }
        }));
        let node = TypeRef::new("anonymous", "Node");
        assert_eq!(engine.generate_location(&location("/definitions/alias")).unwrap(), Some(node.clone()));
        assert!(output.source_of(&node).unwrap().contains("\tprivate Node next;\n"));
        assert_eq!(output.write_count(), 1);
    }

    #[test]
    fn pending_array_stands_for_a_list() {
        let (mut engine, output) = engine(json!({
            "definitions": {
                "nodes": {"type": ["array", "null"], "items": {"$ref": "#/definitions/node"}},
                "node": {"type": "object", "properties": {"children": {"$ref": "#/definitions/nodes"}}}
            }
        }));
        let node = TypeRef::new("anonymous", "Node");
        assert_eq!(
            engine.generate_location(&location("/definitions/nodes")).unwrap(),
            Some(TypeRef::list_of(&node))
        );
        assert!(output.source_of(&node).unwrap().contains("\tprivate List<Node> children;\n"));
        assert!(output.get("anonymous/Nodes.java").is_none());
    }

    #[test]
    fn array_of_itself_terminates() {
        let (mut engine, output) = engine(json!({
            "definitions": {"nested": {"type": "array", "items": {"$ref": "#/definitions/nested"}}}
        }));
        assert!(engine.generate_location(&location("/definitions/nested")).is_ok());
        assert_eq!(output.write_count(), 0);
    }

    #[test]
    fn unemitted_synthesized_names_are_released() {
        let (mut engine, _) = engine(json!({
            "definitions": {"plain": {"type": "string"}}
        }));
        let plain = location("/definitions/plain");
        assert_eq!(engine.generate_location(&plain).unwrap(), Some(TypeRef::string()));
        assert_eq!(engine.mappings().get(&plain).and_then(Mapping::type_ref), None);
        assert!(!engine.names.is_taken("anonymous", "Plain"));
    }

    #[test]
    fn non_object_schema_is_unsupported() {
        let (mut engine, _) = engine(json!({"definitions": {"flag": true}}));
        let err = engine
            .generate_location(&location("/definitions/flag"))
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::UnsupportedOperation { .. }));
    }

    #[test]
    fn configured_mapping_names_are_not_reused() {
        let (mut engine, _) = engine(json!({
            "definitions": {"type": {"type": "object"}}
        }));
        engine.add_mapping(Mapping::new(
            location("/definitions/other"),
            Some(TypeRef::new("anonymous", "Type")),
        ));
        assert_eq!(
            engine.generate_location(&location("/definitions/type")).unwrap(),
            Some(TypeRef::new("anonymous", "Type2"))
        );
    }
}
