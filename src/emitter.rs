//! Structured emission of Java source text.
//!
//! A [`SourceWriter`] buffers exactly one compilation unit: the package
//! declaration, deduplicated imports, and one (possibly nested) type body.
//! Type references are written in the shortest form that still resolves
//! unambiguously; anything that would clash is written fully qualified.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::type_ref::{IMPLICIT_NAMESPACE, TypeRef};

/// The kind of type declaration to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Class,
    Enum,
}

impl Kind {
    pub fn keyword(self) -> &'static str {
        match self {
            Kind::Class => "class",
            Kind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// The modifier followed by a space.
    fn prefix(self) -> &'static str {
        match self {
            Visibility::Public => "public ",
            Visibility::Private => "private ",
        }
    }
}

/// A method parameter: its type and name.
pub type Parameter<'a> = (&'a TypeRef, &'a str);

/// Buffered writer for one Java source file.
#[derive(Debug)]
pub struct SourceWriter {
    out: String,
    indent: &'static str,
    indent_level: usize,
    namespace: String,
    /// Simple names declared by the type(s) being written.
    declared: BTreeSet<String>,
    /// Imported qualified name → simple name.
    imported: BTreeMap<String, String>,
    /// Simple names of referenced types from the writer's own package.
    local: BTreeSet<String>,
    open_types: Vec<TypeRef>,
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: "\t",
            indent_level: 0,
            namespace: String::new(),
            declared: BTreeSet::new(),
            imported: BTreeMap::new(),
            local: BTreeSet::new(),
            open_types: Vec::new(),
        }
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Close the buffer and return its contents.
    pub fn finish(self) -> String {
        debug_assert!(self.open_types.is_empty(), "unclosed type body");
        self.out
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.out.push_str(self.indent);
        }
    }

    fn write_line(&mut self, line: &str) {
        self.write_indent();
        self.out.push_str(line);
        self.out.push('\n');
    }

    pub fn write_blank_line(&mut self) {
        self.out.push('\n');
    }

    /// Write the package declaration for `type_ref` and reserve its simple name.
    pub fn write_package(&mut self, type_ref: &TypeRef) {
        self.namespace = type_ref.namespace().to_string();
        self.declared.insert(type_ref.name().to_string());
        if !self.namespace.is_empty() {
            self.out.push_str(&format!("package {};\n", self.namespace));
        }
    }

    /// Import `type_ref` and its type arguments where needed.
    ///
    /// Nothing is written for primitives, same-package and `java.lang` types,
    /// repeated imports, or types whose simple name is already taken.
    /// Same-package names are remembered so a `java.lang` type of the same
    /// simple name is written qualified.
    pub fn write_import(&mut self, type_ref: &TypeRef) {
        self.import_one(type_ref);
        for argument in type_ref.type_arguments() {
            self.write_import(argument);
        }
    }

    fn import_one(&mut self, type_ref: &TypeRef) {
        let namespace = type_ref.namespace();
        let simple = type_ref.name();
        if namespace == self.namespace && !namespace.is_empty() {
            self.local.insert(simple.to_string());
            return;
        }
        if namespace.is_empty() || namespace == IMPLICIT_NAMESPACE {
            return;
        }
        let qualified = type_ref.qualified_name();
        if self.imported.contains_key(&qualified) {
            return;
        }
        if self.declared.contains(simple)
            || self.local.contains(simple)
            || self.imported.values().any(|s| s == simple)
        {
            return;
        }
        self.imported.insert(qualified.clone(), simple.to_string());
        self.out.push_str(&format!("import {qualified};\n"));
    }

    /// The shortest spelling of `type_ref` that resolves to it here.
    pub fn short_name(&self, type_ref: &TypeRef) -> String {
        let mut name = if self.resolves_unqualified(type_ref) {
            type_ref.name().to_string()
        } else {
            type_ref.qualified_name()
        };
        if !type_ref.type_arguments().is_empty() {
            let arguments: Vec<String> = type_ref
                .type_arguments()
                .iter()
                .map(|argument| self.short_name(argument))
                .collect();
            name.push('<');
            name.push_str(&arguments.join(", "));
            name.push('>');
        }
        name
    }

    fn resolves_unqualified(&self, type_ref: &TypeRef) -> bool {
        let namespace = type_ref.namespace();
        let simple = type_ref.name();
        if namespace.is_empty() {
            return true;
        }
        let qualified = type_ref.qualified_name();
        if self.imported.contains_key(&qualified) {
            return true;
        }
        let shadowed_by_import = self
            .imported
            .iter()
            .any(|(other, s)| s == simple && *other != qualified);
        if namespace == self.namespace {
            return !shadowed_by_import;
        }
        if namespace == IMPLICIT_NAMESPACE {
            return !shadowed_by_import
                && !self.declared.contains(simple)
                && !self.local.contains(simple);
        }
        false
    }

    /// Open a type declaration. Must be paired with [`write_type_end`](Self::write_type_end).
    pub fn write_type_start(&mut self, type_ref: &TypeRef, kind: Kind, visibility: Visibility) {
        if self.open_types.is_empty() && !self.out.is_empty() {
            self.write_blank_line();
        }
        self.declared.insert(type_ref.name().to_string());
        let line = format!(
            "{}{} {} {{",
            visibility.prefix(),
            kind.keyword(),
            type_ref.name()
        );
        self.write_line(&line);
        self.indent_level += 1;
        self.open_types.push(type_ref.clone());
    }

    /// Close the innermost open type declaration.
    pub fn write_type_end(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.write_line("}");
        self.open_types.pop();
    }

    /// Write a type body with `body`, closing it even if `body` fails.
    pub fn with_type<F>(
        &mut self,
        type_ref: &TypeRef,
        kind: Kind,
        visibility: Visibility,
        body: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.write_type_start(type_ref, kind, visibility);
        let result = body(self);
        self.write_type_end();
        result
    }

    /// The type currently being written, if any.
    pub fn current_type(&self) -> Option<&TypeRef> {
        self.open_types.last()
    }

    pub fn write_field(&mut self, visibility: Visibility, type_ref: &TypeRef, name: &str) {
        let line = format!(
            "{}{} {};",
            visibility.prefix(),
            self.short_name(type_ref),
            name
        );
        self.write_line(&line);
    }

    pub fn write_final_field(&mut self, visibility: Visibility, type_ref: &TypeRef, name: &str) {
        let line = format!(
            "{}final {} {};",
            visibility.prefix(),
            self.short_name(type_ref),
            name
        );
        self.write_line(&line);
    }

    /// Write `static final` constant with an already-formatted initializer.
    pub fn write_constant(
        &mut self,
        visibility: Visibility,
        type_ref: &TypeRef,
        name: &str,
        initializer: &str,
    ) {
        let line = format!(
            "{}static final {} {} = {};",
            visibility.prefix(),
            self.short_name(type_ref),
            name,
            initializer
        );
        self.write_line(&line);
    }

    /// Write one enum constant; `last` terminates the constant list.
    pub fn write_enum_constant(&mut self, name: &str, argument: Option<&str>, last: bool) {
        let terminator = if last { ';' } else { ',' };
        let line = match argument {
            Some(argument) => format!("{name}({argument}){terminator}"),
            None => format!("{name}{terminator}"),
        };
        self.write_line(&line);
    }

    /// Open a method body. `return_type` is `None` for constructors.
    pub fn write_method_start(
        &mut self,
        visibility: Visibility,
        return_type: Option<&TypeRef>,
        name: &str,
        parameters: &[Parameter<'_>],
    ) {
        let parameters: Vec<String> = parameters
            .iter()
            .map(|(type_ref, name)| format!("{} {}", self.short_name(type_ref), name))
            .collect();
        let return_type = return_type
            .map(|t| format!("{} ", self.short_name(t)))
            .unwrap_or_default();
        let line = format!(
            "{}{}{}({}) {{",
            visibility.prefix(),
            return_type,
            name,
            parameters.join(", ")
        );
        self.write_line(&line);
        self.indent_level += 1;
    }

    pub fn write_code(&mut self, lines: &[&str]) {
        for line in lines {
            self.write_line(line);
        }
    }

    pub fn write_method_end(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.write_line("}");
    }
}

/// Quote `value` as a Java string literal.
pub fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c if c.is_control() => literal.push_str(&format!("\\u{:04x}", c as u32)),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn widget() -> TypeRef {
        TypeRef::new("pkg", "Widget")
    }

    #[test]
    fn package_then_imports_then_type() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        w.write_import(&TypeRef::new("other", "Gadget"));
        w.write_type_start(&widget(), Kind::Class, Visibility::Public);
        w.write_field(Visibility::Private, &TypeRef::new("other", "Gadget"), "gadget");
        w.write_type_end();
        assert_eq!(
            w.finish(),
            "package pkg;\nimport other.Gadget;\n\npublic class Widget {\n\tprivate Gadget gadget;\n}\n"
        );
    }

    #[test]
    fn same_type_imported_once() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        let gadget = TypeRef::new("other", "Gadget");
        w.write_import(&gadget);
        w.write_import(&gadget);
        assert_eq!(w.finish().matches("import other.Gadget;").count(), 1);
    }

    #[test]
    fn clashing_simple_names_are_qualified() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        let first = TypeRef::new("a", "Item");
        let second = TypeRef::new("b", "Item");
        w.write_import(&first);
        w.write_import(&second);
        assert_eq!(w.short_name(&first), "Item");
        assert_eq!(w.short_name(&second), "b.Item");
        let out = w.finish();
        assert!(out.contains("import a.Item;"));
        assert!(!out.contains("import b.Item;"));
    }

    #[test]
    fn skips_builtin_and_same_package_imports() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        w.write_import(&TypeRef::string());
        w.write_import(&TypeRef::long());
        w.write_import(&TypeRef::new("pkg", "Sibling"));
        assert_eq!(w.finish(), "package pkg;\n");
    }

    #[test]
    fn own_name_is_reserved_against_imports() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        let foreign = TypeRef::new("other", "Widget");
        w.write_import(&foreign);
        assert_eq!(w.short_name(&foreign), "other.Widget");
        assert_eq!(w.short_name(&widget()), "Widget");
    }

    #[test]
    fn same_package_type_shadowed_by_import_is_qualified() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        w.write_import(&TypeRef::new("other", "Part"));
        assert_eq!(w.short_name(&TypeRef::new("pkg", "Part")), "pkg.Part");
    }

    #[test]
    fn same_package_name_qualifies_java_lang_type() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        let local = TypeRef::new("pkg", "String");
        w.write_import(&local);
        w.write_import(&TypeRef::string());
        assert_eq!(w.short_name(&local), "String");
        assert_eq!(w.short_name(&TypeRef::string()), "java.lang.String");
        assert_eq!(w.finish(), "package pkg;\n");
    }

    #[test]
    fn same_package_name_blocks_foreign_import() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        let local = TypeRef::new("pkg", "Part");
        let foreign = TypeRef::new("other", "Part");
        w.write_import(&local);
        w.write_import(&foreign);
        assert_eq!(w.short_name(&local), "Part");
        assert_eq!(w.short_name(&foreign), "other.Part");
        assert!(!w.finish().contains("import other.Part;"));
    }

    #[test]
    fn generic_arguments_are_imported_and_shortened() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        let list = TypeRef::list_of(&TypeRef::new("other", "Gadget"));
        w.write_import(&list);
        assert_eq!(w.short_name(&list), "List<Gadget>");
        let out = w.finish();
        assert!(out.contains("import java.util.List;"));
        assert!(out.contains("import other.Gadget;"));
    }

    #[test]
    fn methods_are_indented_inside_types() {
        let mut w = SourceWriter::new();
        w.write_package(&widget());
        w.write_type_start(&widget(), Kind::Class, Visibility::Public);
        w.write_method_start(
            Visibility::Public,
            Some(&TypeRef::void()),
            "setName",
            &[(&TypeRef::string(), "value")],
        );
        w.write_code(&["this.name = value;"]);
        w.write_method_end();
        w.write_type_end();
        let out = w.finish();
        assert!(out.contains("\tpublic void setName(String value) {\n\t\tthis.name = value;\n\t}\n"));
    }

    #[test]
    fn with_type_closes_on_error() {
        let mut w = SourceWriter::new();
        let result = w.with_type(&widget(), Kind::Class, Visibility::Public, |_| {
            Err(Error::Config("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(w.current_type().is_none());
        assert!(w.finish().ends_with("}\n"));
    }

    #[test]
    fn nested_types_track_depth() {
        let mut w = SourceWriter::new();
        let inner = TypeRef::new("pkg", "Inner");
        w.write_type_start(&widget(), Kind::Class, Visibility::Public);
        w.write_type_start(&inner, Kind::Enum, Visibility::Public);
        assert_eq!(w.current_type(), Some(&inner));
        w.write_type_end();
        assert_eq!(w.current_type(), Some(&widget()));
        w.write_type_end();
        assert!(w.finish().contains("\tpublic enum Inner {\n\t}\n"));
    }

    #[test]
    fn string_literals_are_escaped() {
        assert_eq!(string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(string_literal("plain"), "\"plain\"");
    }
}
