//! Rust structs and enums deriving serde traits, in a single `mod.rs`.
//!
//! Generated code uses fully qualified paths (`serde::Serialize`,
//! `std::collections::BTreeMap`) so it can be dropped into any module
//! without `use` statements.

use super::{
    GENERATED_BY, OutputFile, Recursion, Target, check_container_hint, overridden_definitions,
    string_hint, write_wrapped_comment,
};
use crate::error::{JtdCodegenError, UnsupportedConstructError};
use crate::json_pointer;
use crate::naming::{Case, ConstantScope, NamingConvention, ResolvedNames};
use crate::registry::{
    DefId, Definition, DefinitionKind, EnumValue, Member, Registry, TypeRef, TypeRefKind,
};
use crate::schema::PrimitiveType;
use std::fmt::Write;
use std::path::PathBuf;

const ID: &str = "rust";
const TYPE_HINT: &str = "rustType";
const CONTAINER_HINT: &str = "rustContainer";
const DERIVE_HINT: &str = "rustCustomDerive";

const BASE_DERIVES: &str = "Debug, Clone, serde::Serialize, serde::Deserialize";

const KEYWORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Prelude names generated code refers to unqualified.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Box", "Err", "None", "Ok", "Option", "Result", "Some", "String", "Vec",
];

pub const NAMING: NamingConvention = NamingConvention {
    type_case: Case::PASCAL,
    member_case: Case::SNAKE,
    constant_case: Case::PASCAL,
    keywords: KEYWORDS,
    initialisms: &[],
    constant_scope: ConstantScope::PerEnum,
    reserved_type_names: RESERVED_TYPE_NAMES,
};

/// Rust with serde derives.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTarget;

impl RustTarget {
    /// Renders every definition as Rust items, without the file header, so
    /// the result can be spliced into an existing module.
    ///
    /// # Errors
    ///
    /// Returns `JtdCodegenError::Unsupported` for a malformed `rustType`,
    /// `rustContainer` or `rustCustomDerive` hint.
    pub fn render_items(
        registry: &Registry,
        names: &ResolvedNames,
    ) -> Result<String, JtdCodegenError> {
        let renderer = Renderer {
            registry,
            names,
            overridden: overridden_definitions(registry, TYPE_HINT),
            recursion: Recursion::new(registry),
        };
        let mut out = String::new();
        for definition in registry.iter() {
            if renderer.overridden[definition.id.index()] {
                continue;
            }
            renderer.definition(&mut out, definition)?;
        }
        Ok(out)
    }
}

impl Target for RustTarget {
    fn id(&self) -> &'static str {
        ID
    }

    fn naming(&self) -> &NamingConvention {
        &NAMING
    }

    fn render(
        &self,
        registry: &Registry,
        names: &ResolvedNames,
    ) -> Result<Vec<OutputFile>, JtdCodegenError> {
        let mut contents: String = format!("//! {GENERATED_BY}\n\n");
        contents.push_str(&Self::render_items(registry, names)?);
        Ok(vec![OutputFile {
            path: PathBuf::from("mod.rs"),
            contents,
        }])
    }
}

struct Renderer<'a> {
    registry: &'a Registry,
    names: &'a ResolvedNames,
    overridden: Vec<bool>,
    recursion: Recursion,
}

impl Renderer<'_> {
    fn definition(&self, out: &mut String, definition: &Definition) -> Result<(), JtdCodegenError> {
        let type_name: &str = self.names.type_name(definition.id);
        write_wrapped_comment(out, "/// ", definition.metadata.description())?;
        writeln!(out, "#[derive({})]", derives(definition)?)?;
        match &definition.kind {
            DefinitionKind::Struct {
                members,
                additional_properties,
            } => {
                if !additional_properties {
                    writeln!(out, "#[serde(deny_unknown_fields)]")?;
                }
                self.write_struct(out, definition.id, type_name, members)?;
            }
            DefinitionKind::UnionVariant { members, .. } => {
                self.write_struct(out, definition.id, type_name, members)?;
            }
            DefinitionKind::Enum { values } => write_enum(out, self.names, definition.id, values)?,
            DefinitionKind::UnionBase { tag, variants } => {
                writeln!(out, "#[serde(tag = \"{}\")]", tag.escape_default())?;
                writeln!(out, "pub enum {type_name} {{")?;
                let constants: &[String] = &self.names.get(definition.id).constants;
                for (variant, constant) in variants.iter().zip(constants) {
                    let DefinitionKind::UnionVariant { tag_value, .. } =
                        &self.registry.get(*variant).kind
                    else {
                        continue;
                    };
                    writeln!(out, "    #[serde(rename = \"{}\")]", tag_value.escape_default())?;
                    writeln!(out, "    {constant}({}),", self.definition_type(*variant)?)?;
                }
                writeln!(out, "}}")?;
            }
            DefinitionKind::ValueWrapper { inner } => {
                let inner_type: String = self.type_expr(inner, Some(definition.id))?;
                writeln!(out, "#[serde(transparent)]")?;
                writeln!(out, "pub struct {type_name}(pub {inner_type});")?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_struct(
        &self,
        out: &mut String,
        id: DefId,
        type_name: &str,
        members: &[Member],
    ) -> Result<(), JtdCodegenError> {
        writeln!(out, "pub struct {type_name} {{")?;
        for (member, field) in members.iter().zip(&self.names.get(id).members) {
            let mut field_type: String = self.type_expr(&member.type_ref, Some(id))?;
            write_wrapped_comment(out, "    /// ", member.description())?;
            if *field != member.json_name {
                writeln!(
                    out,
                    "    #[serde(rename = \"{}\")]",
                    member.json_name.escape_default()
                )?;
            }
            if !member.required {
                writeln!(
                    out,
                    "    #[serde(default, skip_serializing_if = \"Option::is_none\")]"
                )?;
                if !field_type.starts_with("Option<") {
                    field_type = format!("Option<{field_type}>");
                }
            }
            writeln!(out, "    pub {field}: {field_type},")?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }

    /// The Rust type for a position. `holder` is the definition holding the
    /// value directly, used to box references that close a cycle.
    fn type_expr(
        &self,
        type_ref: &TypeRef,
        holder: Option<DefId>,
    ) -> Result<String, JtdCodegenError> {
        if let Some(custom) = string_hint(ID, &type_ref.metadata, TYPE_HINT, &type_ref.pointer)? {
            return Ok(custom.to_string());
        }
        let container: Option<String> = check_container_hint(ID, type_ref, CONTAINER_HINT)?;
        let rendered: String = match &type_ref.kind {
            TypeRefKind::Empty => return Ok("serde_json::Value".to_string()),
            TypeRefKind::Primitive(primitive) => primitive_type(*primitive).to_string(),
            TypeRefKind::Elements(item) => {
                let item_type: String = self.type_expr(item, None)?;
                let container: &str = container.as_deref().unwrap_or("Vec");
                format!("{container}<{item_type}>")
            }
            TypeRefKind::Values(item) => {
                let item_type: String = self.type_expr(item, None)?;
                let container: &str = container
                    .as_deref()
                    .unwrap_or("std::collections::BTreeMap");
                format!("{container}<String, {item_type}>")
            }
            TypeRefKind::Definition(id) => {
                let name: String = self.definition_type(*id)?;
                if holder.is_some_and(|holder| self.recursion.needs_indirection(holder, *id)) {
                    format!("Box<{name}>")
                } else {
                    name
                }
            }
        };
        if type_ref.nullable {
            Ok(format!("Option<{rendered}>"))
        } else {
            Ok(rendered)
        }
    }

    /// The name a definition is referred to by: its override, if any.
    fn definition_type(&self, id: DefId) -> Result<String, UnsupportedConstructError> {
        let definition: &Definition = self.registry.get(id);
        let custom: Option<&str> =
            string_hint(ID, &definition.metadata, TYPE_HINT, &definition.pointer)?;
        Ok(custom.map_or_else(|| self.names.type_name(id).to_string(), str::to_string))
    }
}

fn write_enum(
    out: &mut String,
    names: &ResolvedNames,
    id: DefId,
    values: &[EnumValue],
) -> std::fmt::Result {
    writeln!(out, "pub enum {} {{", names.type_name(id))?;
    for (value, constant) in values.iter().zip(&names.get(id).constants) {
        write_wrapped_comment(out, "    /// ", value.description.as_deref())?;
        writeln!(out, "    #[serde(rename = \"{}\")]", value.value.escape_default())?;
        writeln!(out, "    {constant},")?;
    }
    writeln!(out, "}}")
}

/// The derive list: the serde baseline plus any `rustCustomDerive` entries.
fn derives(definition: &Definition) -> Result<String, UnsupportedConstructError> {
    let Some(custom) = string_hint(ID, &definition.metadata, DERIVE_HINT, &definition.pointer)?
    else {
        return Ok(BASE_DERIVES.to_string());
    };
    let mut derives: String = BASE_DERIVES.to_string();
    for entry in custom.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let is_path: bool = entry.split("::").all(|segment| {
            segment.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
        if !is_path {
            return Err(UnsupportedConstructError {
                target: ID,
                path: json_pointer::descend(&definition.pointer, &["metadata", DERIVE_HINT]),
                construct: format!("`{entry}` is not a derive macro path"),
            });
        }
        derives.push_str(", ");
        derives.push_str(entry);
    }
    Ok(derives)
}

const fn primitive_type(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "bool",
        PrimitiveType::String => "String",
        PrimitiveType::Timestamp => "chrono::DateTime<chrono::FixedOffset>",
        PrimitiveType::Float32 => "f32",
        PrimitiveType::Float64 => "f64",
        PrimitiveType::Int8 => "i8",
        PrimitiveType::Uint8 => "u8",
        PrimitiveType::Int16 => "i16",
        PrimitiveType::Uint16 => "u16",
        PrimitiveType::Int32 => "i32",
        PrimitiveType::Uint32 => "u32",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::render_target;
    use crate::expand::expand;
    use crate::parse::parse_schema;

    fn render_rust(schema_json: &str, root_name: &str) -> Result<String, JtdCodegenError> {
        let schema = parse_schema(schema_json).expect("valid schema");
        let registry = expand(&schema, root_name);
        let mut files = render_target(&RustTarget, &registry)?.files;
        assert_eq!(files.len(), 1);
        let file = files.remove(0);
        assert_eq!(file.path, PathBuf::from("mod.rs"));
        Ok(file.contents)
    }

    #[test]
    fn struct_with_required_optional_and_renamed_fields() {
        let schema_json = r#"{
            "metadata": { "description": "A user." },
            "properties": {
                "name": { "type": "string" },
                "createdAt": { "type": "timestamp" },
                "tags": { "elements": { "type": "string" } }
            },
            "optionalProperties": {
                "nickname": { "type": "string", "nullable": true },
                "age": { "type": "uint8" }
            }
        }"#;
        let actual = render_rust(schema_json, "User").expect("rendered");
        let expected = r#"//! Generated by jtd-codegen. Do not edit manually.

/// A user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub tags: Vec<String>,
}

"#;
        assert_eq!(expected, actual, "optional and nullable fields collapse to one Option");
    }

    #[test]
    fn discriminator_renders_internally_tagged_enum() {
        let schema_json = r#"{
            "discriminator": "kind",
            "mapping": {
                "square": {
                    "properties": {
                        "side": { "type": "float64" },
                        "color": { "enum": ["red", "dark-blue"] }
                    }
                },
                "circle": { "properties": { "radius": { "type": "float64" } } }
            }
        }"#;
        let actual = render_rust(schema_json, "Shape").expect("rendered");
        let expected = r#"//! Generated by jtd-codegen. Do not edit manually.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum Shape {
    #[serde(rename = "circle")]
    Circle(ShapeCircle),
    #[serde(rename = "square")]
    Square(ShapeSquare),
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShapeCircle {
    pub radius: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShapeSquare {
    pub color: ShapeSquareColor,
    pub side: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum ShapeSquareColor {
    #[serde(rename = "red")]
    Red,
    #[serde(rename = "dark-blue")]
    DarkBlue,
}

"#;
        assert_eq!(expected, actual, "variants are newtype variants over their structs");
    }

    #[test]
    fn recursive_reference_is_boxed() {
        let schema_json = r#"{
            "definitions": {
                "node": {
                    "properties": {
                        "value": { "type": "int32" },
                        "next": { "ref": "node", "nullable": true },
                        "children": { "elements": { "ref": "node" } }
                    }
                }
            },
            "ref": "node"
        }"#;
        let actual = render_rust(schema_json, "List").expect("rendered");
        let expected = r#"//! Generated by jtd-codegen. Do not edit manually.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct List(pub Node);

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub children: Vec<Node>,
    pub next: Option<Box<Node>>,
    pub value: i32,
}

"#;
        assert_eq!(expected, actual, "only the by-value self reference is boxed");
    }

    #[test]
    fn overrides_replace_types_and_extend_derives() {
        let schema_json = r#"{
            "metadata": { "rustCustomDerive": "PartialEq, Eq" },
            "additionalProperties": true,
            "properties": {
                "id": { "type": "string", "metadata": { "rustType": "uuid::Uuid" } },
                "labels": {
                    "values": { "type": "string" },
                    "metadata": { "rustContainer": "std::collections::HashMap" }
                },
                "extra": {
                    "metadata": { "rustType": "crate::Extra" },
                    "properties": { "inner": { "enum": ["a"] } }
                },
                "any": {}
            }
        }"#;
        let actual = render_rust(schema_json, "Root").expect("rendered");
        let expected = r#"//! Generated by jtd-codegen. Do not edit manually.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Root {
    pub any: serde_json::Value,
    pub extra: crate::Extra,
    pub id: uuid::Uuid,
    pub labels: std::collections::HashMap<String, String>,
}

"#;
        assert_eq!(expected, actual, "overridden definitions are not emitted");
    }

    #[test]
    fn keyword_members_and_wrapped_descriptions() {
        let schema_json: String = serde_json::json!({
            "properties": {
                "type": {
                    "type": "boolean",
                    "metadata": {
                        "description": concat!(
                            "Whether the thing is of the type that this very long ",
                            "description keeps describing."
                        )
                    }
                }
            }
        })
        .to_string();
        let actual = render_rust(&schema_json, "Root").expect("rendered");
        let expected = r#"//! Generated by jtd-codegen. Do not edit manually.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Root {
    /// Whether the thing is of the type that this very long description keeps
    /// describing.
    #[serde(rename = "type")]
    pub type_: bool,
}

"#;
        assert_eq!(expected, actual);
    }

    #[test]
    fn invalid_custom_derive_is_unsupported() {
        let error = render_rust(
            r#"{ "metadata": { "rustCustomDerive": "PartialEq, 1Bad" }, "properties": {} }"#,
            "Root",
        )
        .expect_err("invalid derive");
        match error {
            JtdCodegenError::Unsupported(error) => {
                assert_eq!(error.target, "rust");
                assert_eq!(error.path, "/metadata/rustCustomDerive");
            }
            other => panic!("expected unsupported construct, got {other}"),
        }
    }

    #[test]
    fn reserved_prelude_names_are_avoided() {
        let actual = render_rust(
            r#"{
                "definitions": { "option": { "type": "string" } },
                "properties": { "a": { "ref": "option" } }
            }"#,
            "Root",
        )
        .expect("rendered");
        assert!(actual.contains("pub struct Option0(pub String);"));
        assert!(actual.contains("pub a: Option0,"));
    }
}
