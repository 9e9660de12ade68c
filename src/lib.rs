//! Generate Java bean sources from JSON Schema.
//!
//! `jsonschema-bean-gen` walks `$ref`/JSON-Pointer graphs starting at the
//! requested schema locations, assigns each distinct location one Java type,
//! and writes that type's source exactly once per run.
//!
//! # Features
//!
//! - Object schemas become classes with one field and getter/setter pair per property
//! - Arrays become `java.util.List<T>`; integers, numbers, booleans map to primitives
//! - String `enum`s become Java enums or classes with `String` constants
//! - Self-referencing and mutually referencing schemas terminate
//! - Locations can be pinned to custom or pre-existing types via mapping files
//! - Deterministic names for anonymous types (`Type`, `Type2`, ...)
//! - Optional degraded mode that assumes missing types exist
//!
//! # Usage
//!
//! ```no_run
//! use jsonschema_bean_gen::engine::Engine;
//! use jsonschema_bean_gen::loader::DirectoryLoader;
//! use jsonschema_bean_gen::mapping::Mapping;
//! use jsonschema_bean_gen::location::SchemaLocation;
//! use jsonschema_bean_gen::output::DirectoryOutput;
//! use jsonschema_bean_gen::type_ref::TypeRef;
//! use url::Url;
//!
//! let root = Url::parse("http://example.com/schemas/")?;
//! let loader = DirectoryLoader::new(root.clone(), "schemas/");
//! let mut engine = Engine::new(loader, DirectoryOutput::new("src/main/java"));
//!
//! let widget = root.join("widget.json#")?;
//! engine.add_mapping(Mapping::new(
//!     SchemaLocation::from_url(&widget),
//!     Some(TypeRef::new("com.example", "Widget")),
//! ));
//! let generated = engine.generate(&widget)?;
//! assert_eq!(generated, Some(TypeRef::new("com.example", "Widget")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod generator;
pub mod loader;
pub mod location;
pub mod mapping;
pub mod naming;
pub mod navigator;
pub mod output;
pub mod resolver;
pub mod type_ref;
