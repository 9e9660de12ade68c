use serde_json::Value;

use super::{GenerationContext, TypeGenerator};
use crate::emitter::SourceWriter;
use crate::error::{Error, Result};
use crate::navigator::SchemaTree;
use crate::type_ref::TypeRef;

/// Generator for `"type": "array"` schemas.
///
/// Arrays never produce a compilation unit of their own: the result is
/// `java.util.List` of the (boxed) element type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayGenerator;

impl TypeGenerator for ArrayGenerator {
    fn generate(
        &self,
        ctx: &mut GenerationContext<'_>,
        schema: &SchemaTree,
        _writer: &mut SourceWriter,
    ) -> Result<Option<TypeRef>> {
        let location = schema.location().child("items");
        let element = match schema.get("items") {
            None | Some(Value::Null) => {
                return Err(Error::UnsupportedOperation {
                    location: schema.location().uri(),
                    message: "cannot generate for arrays without 'items'".to_string(),
                });
            }
            Some(Value::Array(_)) => {
                return Err(Error::UnsupportedOperation {
                    location: schema.location().uri(),
                    message: "tuple-typed 'items' are not supported".to_string(),
                });
            }
            Some(items) if !items.is_object() => {
                tracing::warn!("{location}: 'items' is not a schema object");
                return Err(Error::UnsupportedOperation {
                    location: schema.location().uri(),
                    message: "'items' must be a schema".to_string(),
                });
            }
            Some(items) => ctx.child_type(&location, items)?,
        };

        let element = element.ok_or_else(|| Error::InvalidTypeReference {
            location: location.uri(),
        })?;
        Ok(Some(TypeRef::list_of(&element)))
    }
}
