//! Strings, and the enums they become when constrained by `enum`.
//!
//! Two enum styles are supported, selected by the `enum-style` feature:
//!
//! ```java
//! // native
//! public enum Color {
//!     RED("red"),
//!     GREEN("green");
//!     ...
//! }
//!
//! // constants
//! public class Color {
//!     public static final String RED = "red";
//!     ...
//! }
//! ```

use std::collections::HashSet;

use serde_json::Value;

use super::{GenerationContext, TypeGenerator};
use crate::config::{ENUM_STYLE, EnumStyle, SIMPLE_PLAIN_TYPES};
use crate::emitter::{Kind, SourceWriter, Visibility, string_literal};
use crate::error::{Error, Result};
use crate::naming::enum_constant_name;
use crate::navigator::SchemaTree;
use crate::type_ref::TypeRef;

/// Field backing the wire value of native enum constants.
const VALUE_FIELD: &str = "value";

/// Generator for `"type": "string"` schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringGenerator;

#[derive(Debug)]
struct EnumValue {
    constant: String,
    value: String,
}

impl TypeGenerator for StringGenerator {
    fn generate(
        &self,
        ctx: &mut GenerationContext<'_>,
        schema: &SchemaTree,
        writer: &mut SourceWriter,
    ) -> Result<Option<TypeRef>> {
        let values = match schema.get("enum") {
            Some(values) if !ctx.features().get(&SIMPLE_PLAIN_TYPES) => values,
            _ => return Ok(Some(TypeRef::string())),
        };
        let Value::Array(values) = values else {
            return Err(Error::UnsupportedOperation {
                location: schema.location().uri(),
                message: "'enum' must be an array".to_string(),
            });
        };

        let values = enum_values(values);
        let type_ref = ctx.type_ref().clone();
        writer.write_package(&type_ref);
        match ctx.features().get(&ENUM_STYLE) {
            EnumStyle::Native => write_native(writer, &type_ref, &values)?,
            EnumStyle::Constants => write_constants(writer, &type_ref, &values)?,
        }
        Ok(Some(type_ref))
    }
}

/// Constant names for the non-null values, numbered on collision.
fn enum_values(values: &[Value]) -> Vec<EnumValue> {
    let mut taken = HashSet::new();
    let mut result = Vec::with_capacity(values.len());
    for value in values {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let base = enum_constant_name(&value);
        let mut constant = base.clone();
        let mut counter = 1u32;
        while !taken.insert(constant.clone()) {
            counter += 1;
            constant = format!("{base}_{counter}");
        }
        result.push(EnumValue { constant, value });
    }
    result
}

fn write_native(writer: &mut SourceWriter, type_ref: &TypeRef, values: &[EnumValue]) -> Result<()> {
    let string = TypeRef::string();
    writer.with_type(type_ref, Kind::Enum, Visibility::Public, |w| {
        if values.is_empty() {
            w.write_code(&[";"]);
        }
        for (i, value) in values.iter().enumerate() {
            let literal = string_literal(&value.value);
            w.write_enum_constant(&value.constant, Some(&literal), i + 1 == values.len());
        }
        w.write_blank_line();
        w.write_final_field(Visibility::Private, &string, VALUE_FIELD);

        w.write_blank_line();
        w.write_method_start(Visibility::Private, None, type_ref.name(), &[(&string, VALUE_FIELD)]);
        w.write_code(&[&format!("this.{VALUE_FIELD} = {VALUE_FIELD};")]);
        w.write_method_end();

        w.write_blank_line();
        w.write_method_start(Visibility::Public, Some(&string), "getValue", &[]);
        w.write_code(&[&format!("return {VALUE_FIELD};")]);
        w.write_method_end();
        Ok(())
    })
}

fn write_constants(writer: &mut SourceWriter, type_ref: &TypeRef, values: &[EnumValue]) -> Result<()> {
    let string = TypeRef::string();
    writer.with_type(type_ref, Kind::Class, Visibility::Public, |w| {
        for value in values {
            w.write_constant(
                Visibility::Public,
                &string,
                &value.constant,
                &string_literal(&value.value),
            );
        }
        w.write_blank_line();
        w.write_method_start(Visibility::Private, None, type_ref.name(), &[]);
        w.write_method_end();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn enum_values_skip_null_and_number_collisions() {
        let values = enum_values(
            json!(["red", null, "Red", 3, "dark red"])
                .as_array()
                .unwrap(),
        );
        let constants: Vec<&str> = values.iter().map(|v| v.constant.as_str()).collect();
        assert_eq!(constants, vec!["RED", "RED_2", "_3", "DARK_RED"]);
        assert_eq!(values[2].value, "3");
    }

    #[test]
    fn native_style_writes_backing_value() {
        let type_ref = TypeRef::new("pkg", "Color");
        let values = enum_values(json!(["red", "green"]).as_array().unwrap());
        let mut writer = SourceWriter::new();
        writer.write_package(&type_ref);
        write_native(&mut writer, &type_ref, &values).unwrap();
        let out = writer.finish();

        assert!(out.contains("public enum Color {\n\tRED(\"red\"),\n\tGREEN(\"green\");\n"));
        assert!(out.contains("\tprivate final String value;\n"));
        assert!(out.contains("\tprivate Color(String value) {\n\t\tthis.value = value;\n\t}\n"));
        assert!(out.contains("\tpublic String getValue() {\n"));
    }

    #[test]
    fn empty_native_enum_still_terminates_constants() {
        let type_ref = TypeRef::new("pkg", "Nothing");
        let mut writer = SourceWriter::new();
        write_native(&mut writer, &type_ref, &[]).unwrap();
        assert!(writer.finish().starts_with("public enum Nothing {\n\t;\n"));
    }

    #[test]
    fn constants_style_writes_private_constructor() {
        let type_ref = TypeRef::new("pkg", "Color");
        let values = enum_values(json!(["red"]).as_array().unwrap());
        let mut writer = SourceWriter::new();
        write_constants(&mut writer, &type_ref, &values).unwrap();
        let out = writer.finish();

        assert!(out.contains("public class Color {\n\tpublic static final String RED = \"red\";\n"));
        assert!(out.contains("\tprivate Color() {\n\t}\n"));
    }
}
