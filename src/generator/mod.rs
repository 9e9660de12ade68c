//! Per-kind type generators and their dispatch registry.
//!
//! Each JSON Schema `type` value is served by one [`TypeGenerator`]. The
//! registry is keyed by kind string, so new kinds can be added with
//! [`GeneratorRegistry::register`] without touching the engine.
//!
//! | Kind | Generator | Emits |
//! |------|-----------|-------|
//! | `object` | [`ObjectGenerator`] | class with fields and accessors |
//! | `array` | [`ArrayGenerator`] | nothing, returns `List<T>` |
//! | `string` | [`StringGenerator`] | enum (if `enum` is present) |
//! | `integer`, `number`, `boolean` | [`PrimitiveGenerator`] | nothing |

mod array;
mod object;
mod primitive;
mod string;

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

pub use array::ArrayGenerator;
pub use object::ObjectGenerator;
pub use primitive::PrimitiveGenerator;
pub use string::StringGenerator;

use crate::config::Features;
use crate::emitter::SourceWriter;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::location::SchemaLocation;
use crate::mapping::Mapping;
use crate::navigator::SchemaTree;
use crate::resolver;
use crate::type_ref::{TypeRef, builtin_for_kind};

/// Generates the type for one schema kind.
pub trait TypeGenerator {
    /// Produce the type for `schema`, writing any type body through `writer`.
    ///
    /// Returns `None` only for schemas that legitimately produce no type.
    /// Errors from sub-type generation must be propagated unchanged.
    fn generate(
        &self,
        ctx: &mut GenerationContext<'_>,
        schema: &SchemaTree,
        writer: &mut SourceWriter,
    ) -> Result<Option<TypeRef>>;
}

/// What a generator can see of the engine while generating one location.
pub struct GenerationContext<'a> {
    engine: &'a mut Engine,
    mapping: &'a Mapping,
    type_ref: &'a TypeRef,
}

impl<'a> GenerationContext<'a> {
    pub(crate) fn new(engine: &'a mut Engine, mapping: &'a Mapping, type_ref: &'a TypeRef) -> Self {
        Self {
            engine,
            mapping,
            type_ref,
        }
    }

    /// The location being generated.
    pub fn location(&self) -> &SchemaLocation {
        self.mapping.target()
    }

    /// The type requested for the location being generated.
    pub fn type_ref(&self) -> &TypeRef {
        self.type_ref
    }

    pub fn features(&self) -> &Features {
        self.engine.features()
    }

    /// Generate (or look up) the type of another location.
    pub fn generate(&mut self, location: &SchemaLocation) -> Result<Option<TypeRef>> {
        self.engine.generate_location(location)
    }

    /// Like [`generate`](Self::generate), but a location without a type is an error.
    pub fn require_type(&mut self, location: &SchemaLocation) -> Result<TypeRef> {
        self.generate(location)?
            .ok_or_else(|| Error::InvalidTypeReference {
                location: location.uri(),
            })
    }

    /// The type of the child schema `node` found at `location`, following `$ref`.
    ///
    /// Returns `Ok(None)` if `node` is not a container value.
    pub fn child_type(&mut self, location: &SchemaLocation, node: &Value) -> Result<Option<TypeRef>> {
        match resolver::target_of(location, node)? {
            Some(target) => self.require_type(&target).map(Some),
            None => Ok(None),
        }
    }
}

/// Kind string → generator.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Rc<dyn TypeGenerator>>,
}

impl GeneratorRegistry {
    /// Registry with generators for every kind except `null`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register("object", ObjectGenerator);
        registry.register("array", ArrayGenerator);
        registry.register("string", StringGenerator);
        for kind in ["integer", "number", "boolean"] {
            if let Some(type_ref) = builtin_for_kind(kind) {
                registry.register(kind, PrimitiveGenerator::new(type_ref));
            }
        }
        registry
    }

    /// Register `generator` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, generator: impl TypeGenerator + 'static) {
        self.generators.insert(kind.into(), Rc::new(generator));
    }

    pub fn get(&self, kind: &str) -> Option<Rc<dyn TypeGenerator>> {
        self.generators.get(kind).cloned()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_non_null_kinds() {
        let registry = GeneratorRegistry::with_defaults();
        assert_eq!(
            registry.kinds(),
            vec!["array", "boolean", "integer", "number", "object", "string"]
        );
        assert!(registry.get("null").is_none());
    }
}
