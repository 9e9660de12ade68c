//! `$ref` dereferencing for child schemas.
//!
//! A node with a `$ref` keyword is a pure indirection: `id` and every sibling
//! keyword next to `$ref` are ignored. The same rule applies to property
//! schemas, array `items`, and `additionalProperties`.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::location::SchemaLocation;

/// Callbacks for [`visit`].
pub trait SchemaVisitor {
    type Output;

    /// The node was a `$ref`; `target` is the resolved location.
    fn on_reference(&mut self, target: SchemaLocation) -> Result<Self::Output>;

    /// The node is a schema in its own right.
    fn on_schema(&mut self, location: SchemaLocation, node: &Value) -> Result<Self::Output>;
}

/// Dispatch `node` found at `location` to `visitor`.
///
/// Returns `Ok(None)` without calling the visitor if `node` is not a
/// container value.
pub fn visit<V: SchemaVisitor>(
    location: &SchemaLocation,
    node: &Value,
    visitor: &mut V,
) -> Result<Option<V::Output>> {
    if !(node.is_object() || node.is_array()) {
        return Ok(None);
    }
    let output = match reference_target(location, node)? {
        Some(target) => visitor.on_reference(target)?,
        None => visitor.on_schema(location.clone(), node)?,
    };
    Ok(Some(output))
}

/// The location `node` refers to if it is a `$ref` indirection.
pub fn reference_target(location: &SchemaLocation, node: &Value) -> Result<Option<SchemaLocation>> {
    match node.get("$ref") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(reference)) => location.join(reference).map(Some),
        Some(other) => Err(Error::InvalidReference {
            location: location.uri(),
            reference: other.to_string(),
        }),
    }
}

/// The location whose type describes `node`: the `$ref` target, or
/// `location` itself for an inline schema.
pub fn target_of(location: &SchemaLocation, node: &Value) -> Result<Option<SchemaLocation>> {
    struct Target;

    impl SchemaVisitor for Target {
        type Output = SchemaLocation;

        fn on_reference(&mut self, target: SchemaLocation) -> Result<SchemaLocation> {
            Ok(target)
        }

        fn on_schema(&mut self, location: SchemaLocation, _node: &Value) -> Result<SchemaLocation> {
            Ok(location)
        }
    }

    visit(location, node, &mut Target)
}
