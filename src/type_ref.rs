//! Generated-type identities and the built-in Java types they can refer to.
//!
//! # Kind Mapping Table
//!
//! | JSON Schema kind | Java type | Notes |
//! |------------------|-----------|-------|
//! | `integer` | `long` | 64-bit |
//! | `number` | `double` | |
//! | `boolean` | `boolean` | |
//! | `string` | `java.lang.String` | Unless it carries an `enum` |
//! | `array` | `java.util.List<T>` | Element type boxed |
//! | `object` | generated class | |
//! | `null` | none | Not referenceable |

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Java primitive type names. These live in no package and cannot be imported.
const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    "boolean", "char", "byte", "short", "int", "long", "float", "double", "void",
];

/// Package whose types are visible without an import.
pub const IMPLICIT_NAMESPACE: &str = "java.lang";

/// Identity of a generated (or pre-existing) target-language type.
///
/// Equality is structural: `List<Foo>` and `List<Bar>` are different identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default)]
    namespace: String,
    name: String,
    #[serde(default)]
    type_arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    pub fn with_arguments(
        namespace: impl Into<String>,
        name: impl Into<String>,
        type_arguments: Vec<TypeRef>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            type_arguments,
        }
    }

    /// Parse a dotted name: `"com.example.Widget"` → (`com.example`, `Widget`).
    ///
    /// A name without dots lands in the empty namespace.
    pub fn parse(qualified: &str) -> Result<Self> {
        let (namespace, name) = match qualified.rsplit_once('.') {
            Some((namespace, name)) => (namespace, name),
            None => ("", qualified),
        };
        if name.is_empty() {
            return Err(Error::Config(format!("invalid type name '{qualified}'")));
        }
        Ok(Self::new(namespace, name))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_arguments(&self) -> &[TypeRef] {
        &self.type_arguments
    }

    /// `namespace.name` without type arguments.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Whether this is one of the Java primitive types.
    pub fn is_primitive(&self) -> bool {
        self.namespace.is_empty() && PRIMITIVE_TYPE_NAMES.contains(&self.name.as_str())
    }

    /// The reference type to use for this type inside generic arguments.
    pub fn boxed(&self) -> TypeRef {
        if !self.is_primitive() {
            return self.clone();
        }
        let boxed = match self.name.as_str() {
            "boolean" => "Boolean",
            "char" => "Character",
            "byte" => "Byte",
            "short" => "Short",
            "int" => "Integer",
            "long" => "Long",
            "float" => "Float",
            "double" => "Double",
            _ => "Void",
        };
        TypeRef::new(IMPLICIT_NAMESPACE, boxed)
    }

    pub fn string() -> Self {
        TypeRef::new(IMPLICIT_NAMESPACE, "String")
    }

    pub fn long() -> Self {
        TypeRef::new("", "long")
    }

    pub fn double() -> Self {
        TypeRef::new("", "double")
    }

    pub fn boolean() -> Self {
        TypeRef::new("", "boolean")
    }

    pub fn void() -> Self {
        TypeRef::new("", "void")
    }

    /// `java.util.List<element>` with the element boxed.
    pub fn list_of(element: &TypeRef) -> Self {
        TypeRef::with_arguments("java.util", "List", vec![element.boxed()])
    }

    /// `java.util.Map<String, value>` with the value boxed.
    pub fn string_map_of(value: &TypeRef) -> Self {
        TypeRef::with_arguments("java.util", "Map", vec![TypeRef::string(), value.boxed()])
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for (i, argument) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Map a plain JSON Schema kind to its built-in Java type.
///
/// Returns `None` for kinds that need a generator (`object`, `array`) or
/// produce no type (`null`).
pub fn builtin_for_kind(kind: &str) -> Option<TypeRef> {
    match kind {
        "integer" => Some(TypeRef::long()),
        "number" => Some(TypeRef::double()),
        "boolean" => Some(TypeRef::boolean()),
        "string" => Some(TypeRef::string()),
        _ => None,
    }
}

/// Registry of target-language types that already exist and are never generated.
#[derive(Debug, Clone)]
pub struct KnownTypes {
    names: BTreeSet<String>,
}

impl Default for KnownTypes {
    fn default() -> Self {
        let names = [
            "java.lang.Boolean",
            "java.lang.Byte",
            "java.lang.Character",
            "java.lang.Double",
            "java.lang.Float",
            "java.lang.Integer",
            "java.lang.Long",
            "java.lang.Number",
            "java.lang.Object",
            "java.lang.Short",
            "java.lang.String",
            "java.math.BigDecimal",
            "java.math.BigInteger",
            "java.net.URI",
            "java.time.Instant",
            "java.time.LocalDate",
            "java.time.OffsetDateTime",
            "java.util.Date",
            "java.util.List",
            "java.util.Map",
            "java.util.Set",
            "java.util.UUID",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        Self { names }
    }
}

impl KnownTypes {
    /// Declare an additional existing type by its dotted name.
    pub fn register(&mut self, qualified_name: impl Into<String>) {
        self.names.insert(qualified_name.into());
    }

    pub fn is_existing(&self, type_ref: &TypeRef) -> bool {
        self.names.contains(&type_ref.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mapping() {
        assert_eq!(builtin_for_kind("integer"), Some(TypeRef::long()));
        assert_eq!(builtin_for_kind("number"), Some(TypeRef::double()));
        assert_eq!(builtin_for_kind("boolean"), Some(TypeRef::boolean()));
        assert_eq!(builtin_for_kind("string"), Some(TypeRef::string()));
        assert_eq!(builtin_for_kind("object"), None);
        assert_eq!(builtin_for_kind("null"), None);
    }

    #[test]
    fn parse_splits_on_last_dot() {
        let parsed = TypeRef::parse("com.example.Widget").unwrap();
        assert_eq!(parsed.namespace(), "com.example");
        assert_eq!(parsed.name(), "Widget");

        let bare = TypeRef::parse("long").unwrap();
        assert_eq!(bare.namespace(), "");
        assert!(bare.is_primitive());

        assert!(TypeRef::parse("com.example.").is_err());
    }

    #[test]
    fn type_arguments_distinguish_identities() {
        let foo = TypeRef::new("pkg", "Foo");
        let bar = TypeRef::new("pkg", "Bar");
        assert_ne!(TypeRef::list_of(&foo), TypeRef::list_of(&bar));
        assert_eq!(TypeRef::list_of(&foo), TypeRef::list_of(&foo));
    }

    #[test]
    fn list_boxes_primitive_elements() {
        let list = TypeRef::list_of(&TypeRef::long());
        assert_eq!(list.to_string(), "java.util.List<java.lang.Long>");
    }

    #[test]
    fn display_joins_arguments() {
        let map = TypeRef::string_map_of(&TypeRef::new("pkg", "Foo"));
        assert_eq!(map.to_string(), "java.util.Map<java.lang.String, pkg.Foo>");
    }

    #[test]
    fn known_types_include_builtins_and_registered() {
        let mut known = KnownTypes::default();
        assert!(known.is_existing(&TypeRef::string()));
        assert!(!known.is_existing(&TypeRef::new("com.example", "Money")));
        known.register("com.example.Money");
        assert!(known.is_existing(&TypeRef::new("com.example", "Money")));
    }
}
