//! Naming rules for synthesized types, fields, accessors, and enum constants.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `#/definitions/street-address` | [`type_name_for`] | `StreetAddress` |
//! | `#/properties/a/properties/b` | [`type_name_for`] | `AB` |
//! | `#` | [`type_name_for`] | `Type` |
//! | `first-name` | [`field_name`] | `firstName` |
//! | `class` | [`field_name`] | `class_` |
//! | `Service Ticket` | [`enum_constant_name`] | `SERVICE_TICKET` |

use std::collections::HashSet;

use crate::location::{SchemaLocation, unescape_segment};
use crate::type_ref::TypeRef;

/// Name used when a pointer contributes no meaningful segment.
pub const FALLBACK_TYPE_NAME: &str = "Type";

/// Pointer segments that only describe schema structure.
const STRUCTURAL_SEGMENTS: &[&str] = &["", "properties", "definitions", "$defs"];

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

/// Derive a raw type name from the pointer of `location`.
///
/// Structural segments are dropped, the rest are upper-camel-cased and
/// concatenated. `:` is treated as a segment separator.
pub fn type_name_for(location: &SchemaLocation) -> String {
    let pointer = location.pointer().replace(':', "/");
    let name: String = pointer
        .split('/')
        .map(unescape_segment)
        .filter(|segment| !STRUCTURAL_SEGMENTS.contains(&segment.as_str()))
        .map(|segment| to_pascal_case(&segment))
        .collect();

    if name.is_empty() {
        FALLBACK_TYPE_NAME.to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Convert arbitrary text to PascalCase, dropping characters that cannot
/// appear in a Java identifier.
///
/// - `"street-address"` → `"StreetAddress"`
/// - `"node"` → `"Node"`
/// - `"iPhone_model"` → `"IPhoneModel"`
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .map(capitalize)
        .collect()
}

/// Upper-case the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Turn a JSON property name into a Java field identifier.
///
/// - `"name"` → `"name"`
/// - `"first-name"` → `"firstName"`
/// - `"2fa"` → `"_2fa"`
/// - `"class"` → `"class_"`
pub fn field_name(property: &str) -> String {
    let mut words = property.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty());
    let mut name = words.next().map(str::to_string).unwrap_or_default();
    for word in words {
        name.push_str(&capitalize(word));
    }

    if name.is_empty() {
        return "_".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if JAVA_KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

/// Accessor method name for a field: `("get", "firstName")` → `"getFirstName"`.
pub fn accessor_name(prefix: &str, field: &str) -> String {
    format!("{prefix}{}", capitalize(field.trim_start_matches('_')))
}

/// Convert an enum value to a SCREAMING_SNAKE constant name.
///
/// - `"Logon"` → `"LOGON"`
/// - `"Service Ticket Request"` → `"SERVICE_TICKET_REQUEST"`
/// - `"TLP:AMBER+STRICT"` → `"TLP_AMBER_STRICT"`
/// - `"1st"` → `"_1ST"`
pub fn enum_constant_name(value: &str) -> String {
    let upper: String = value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_uppercase().next().unwrap_or(c)
            } else {
                '_'
            }
        })
        .collect();
    let mut name = upper
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Run-scoped registry of type names already bound in a namespace.
///
/// Collisions are resolved with a deterministic counter suffix so the same
/// input always yields the same names.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<(String, String)>,
}

impl NameRegistry {
    /// Record `type_ref` as taken.
    pub fn reserve(&mut self, type_ref: &TypeRef) {
        self.taken
            .insert((type_ref.namespace().to_string(), type_ref.name().to_string()));
    }

    /// Make `type_ref` available again.
    pub fn release(&mut self, type_ref: &TypeRef) {
        self.taken
            .remove(&(type_ref.namespace().to_string(), type_ref.name().to_string()));
    }

    pub fn is_taken(&self, namespace: &str, name: &str) -> bool {
        self.taken
            .contains(&(namespace.to_string(), name.to_string()))
    }

    /// Reserve and return a free name based on `raw_name` in `namespace`.
    ///
    /// `Type` is tried first, then `Type2`, `Type3`, and so on.
    pub fn unique(&mut self, namespace: &str, raw_name: &str) -> TypeRef {
        let mut candidate = raw_name.to_string();
        let mut counter = 1u32;
        while self.is_taken(namespace, &candidate) {
            counter += 1;
            candidate = format!("{raw_name}{counter}");
        }
        let type_ref = TypeRef::new(namespace, candidate);
        self.reserve(&type_ref);
        type_ref
    }
}
