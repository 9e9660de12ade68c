//! Classes with one field and accessor pair per property.

use std::collections::HashSet;

use serde_json::Value;

use super::{GenerationContext, TypeGenerator};
use crate::emitter::{Kind, SourceWriter, Visibility};
use crate::error::Result;
use crate::naming::{accessor_name, field_name};
use crate::navigator::SchemaTree;
use crate::type_ref::TypeRef;

/// Field holding schema-typed `additionalProperties`.
const ADDITIONAL_PROPERTIES_FIELD: &str = "additionalProperties";

/// Generator for `"type": "object"` schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectGenerator;

#[derive(Debug)]
struct Property {
    field: String,
    type_ref: TypeRef,
}

impl TypeGenerator for ObjectGenerator {
    fn generate(
        &self,
        ctx: &mut GenerationContext<'_>,
        schema: &SchemaTree,
        writer: &mut SourceWriter,
    ) -> Result<Option<TypeRef>> {
        let type_ref = ctx.type_ref().clone();
        let mut properties = Vec::new();
        let mut fields = HashSet::new();

        if let Some(Value::Object(declared)) = schema.get("properties") {
            let base = schema.location().child("properties");
            for (name, node) in declared {
                let location = base.child(name);
                match ctx.child_type(&location, node)? {
                    Some(property_type) => properties.push(Property {
                        field: unique_field(&mut fields, field_name(name)),
                        type_ref: property_type,
                    }),
                    None => tracing::warn!("{location}: not a container value, skipping property"),
                }
            }
        }

        if let Some(node) = schema.get("additionalProperties") {
            let location = schema.location().child("additionalProperties");
            if let Some(value_type) = ctx.child_type(&location, node)? {
                properties.push(Property {
                    field: unique_field(&mut fields, ADDITIONAL_PROPERTIES_FIELD.to_string()),
                    type_ref: TypeRef::string_map_of(&value_type),
                });
            }
        }

        writer.write_package(&type_ref);
        for property in &properties {
            writer.write_import(&property.type_ref);
        }

        writer.with_type(&type_ref, Kind::Class, Visibility::Public, |w| {
            for property in &properties {
                w.write_field(Visibility::Private, &property.type_ref, &property.field);
            }
            for property in &properties {
                write_accessors(w, property);
            }
            Ok(())
        })?;

        Ok(Some(type_ref))
    }
}

fn write_accessors(writer: &mut SourceWriter, property: &Property) {
    writer.write_blank_line();
    writer.write_method_start(
        Visibility::Public,
        Some(&property.type_ref),
        &accessor_name("get", &property.field),
        &[],
    );
    writer.write_code(&[&format!("return {};", property.field)]);
    writer.write_method_end();

    writer.write_blank_line();
    writer.write_method_start(
        Visibility::Public,
        Some(&TypeRef::void()),
        &accessor_name("set", &property.field),
        &[(&property.type_ref, "value")],
    );
    writer.write_code(&[&format!("this.{} = value;", property.field)]);
    writer.write_method_end();
}

/// Number a field whose accessor stem is already taken.
///
/// Different properties can share an identifier (`a-b`, `a_b`) or only an
/// accessor (`x`, `X`). `taken` holds the accessor stems seen so far.
fn unique_field(taken: &mut HashSet<String>, field: String) -> String {
    let mut candidate = field.clone();
    let mut counter = 1u32;
    while !taken.insert(accessor_name("", &candidate)) {
        counter += 1;
        candidate = format!("{field}{counter}");
    }
    candidate
}
