use super::{GenerationContext, TypeGenerator};
use crate::emitter::SourceWriter;
use crate::error::Result;
use crate::navigator::SchemaTree;
use crate::type_ref::TypeRef;

/// Maps a kind straight to a built-in type without emitting anything.
#[derive(Debug, Clone)]
pub struct PrimitiveGenerator {
    type_ref: TypeRef,
}

impl PrimitiveGenerator {
    pub fn new(type_ref: TypeRef) -> Self {
        Self { type_ref }
    }
}

impl TypeGenerator for PrimitiveGenerator {
    fn generate(
        &self,
        _ctx: &mut GenerationContext<'_>,
        _schema: &SchemaTree,
        _writer: &mut SourceWriter,
    ) -> Result<Option<TypeRef>> {
        Ok(Some(self.type_ref.clone()))
    }
}
