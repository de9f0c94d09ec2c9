//! TypeScript interfaces and type aliases, in a single `index.ts`.
//!
//! Interfaces describe the wire shape directly: property keys are the JSON
//! names, quoted when they are not identifiers.

use super::{
    GENERATED_BY, OutputFile, Target, overridden_definitions, string_hint, write_doc_block,
};
use crate::error::{JtdCodegenError, UnsupportedConstructError};
use crate::naming::{Case, ConstantScope, NamingConvention, ResolvedNames};
use crate::registry::{DefId, Definition, DefinitionKind, Member, Registry, TypeRef, TypeRefKind};
use crate::schema::PrimitiveType;
use std::fmt::Write;
use std::path::PathBuf;

const ID: &str = "typescript";
const TYPE_HINT: &str = "typescriptType";
const FILE_NAME: &str = "index.ts";

const KEYWORDS: &[&str] = &[
    "any", "as", "boolean", "break", "case", "catch", "class", "const", "constructor", "continue",
    "debugger", "declare", "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "from", "function", "get", "if", "implements", "import", "in", "instanceof",
    "interface", "let", "module", "new", "null", "number", "of", "package", "private",
    "protected", "public", "require", "return", "set", "static", "string", "super", "switch",
    "symbol", "this", "throw", "true", "try", "type", "typeof", "var", "void", "while", "with",
    "yield",
];

pub const NAMING: NamingConvention = NamingConvention {
    type_case: Case::PASCAL,
    member_case: Case::CAMEL,
    constant_case: Case::PASCAL,
    keywords: KEYWORDS,
    initialisms: &[],
    constant_scope: ConstantScope::PerEnum,
    reserved_type_names: &[],
};

/// TypeScript declarations for `JSON.parse` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptTarget;

impl Target for TypeScriptTarget {
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
        let renderer = Renderer { registry, names };
        let overridden: Vec<bool> = overridden_definitions(registry, TYPE_HINT);
        let mut contents = String::new();
        writeln!(contents, "// {GENERATED_BY}")?;
        for definition in registry.iter() {
            if overridden[definition.id.index()] {
                continue;
            }
            writeln!(contents)?;
            renderer.definition(&mut contents, definition)?;
        }
        Ok(vec![OutputFile {
            path: PathBuf::from(FILE_NAME),
            contents,
        }])
    }
}

struct Renderer<'a> {
    registry: &'a Registry,
    names: &'a ResolvedNames,
}

impl Renderer<'_> {
    fn definition(&self, out: &mut String, definition: &Definition) -> Result<(), JtdCodegenError> {
        let type_name: &str = self.names.type_name(definition.id);
        write_tsdoc(out, "", definition.metadata.description())?;
        match &definition.kind {
            DefinitionKind::Struct { members, .. } => {
                writeln!(out, "export interface {type_name} {{")?;
                self.write_members(out, members)?;
                writeln!(out, "}}")?;
            }
            DefinitionKind::UnionVariant {
                parent,
                tag_value,
                members,
                ..
            } => {
                let DefinitionKind::UnionBase { tag, .. } = &self.registry.get(*parent).kind else {
                    return Err(UnsupportedConstructError {
                        target: ID,
                        path: definition.pointer.clone(),
                        construct: "union variant outside a discriminator".to_string(),
                    }
                    .into());
                };
                writeln!(out, "export interface {type_name} {{")?;
                writeln!(out, "  {}: {};", property_key(tag)?, ts_string(tag_value)?)?;
                self.write_members(out, members)?;
                writeln!(out, "}}")?;
            }
            DefinitionKind::Enum { values } => {
                let constants: &[String] = &self.names.get(definition.id).constants;
                writeln!(out, "export enum {type_name} {{")?;
                for (value, constant) in values.iter().zip(constants) {
                    write_tsdoc(out, "  ", value.description.as_deref())?;
                    writeln!(out, "  {constant} = {},", ts_string(&value.value)?)?;
                }
                writeln!(out, "}}")?;
            }
            DefinitionKind::UnionBase { variants, .. } => {
                let variant_types: Vec<String> = variants
                    .iter()
                    .map(|variant| self.definition_type(*variant))
                    .collect::<Result<_, _>>()?;
                let union: String = if variant_types.is_empty() {
                    "never".to_string()
                } else {
                    variant_types.join(" | ")
                };
                writeln!(out, "export type {type_name} = {union};")?;
            }
            DefinitionKind::ValueWrapper { inner } => {
                writeln!(out, "export type {type_name} = {};", self.type_expr(inner)?)?;
            }
        }
        Ok(())
    }

    fn write_members(&self, out: &mut String, members: &[Member]) -> Result<(), JtdCodegenError> {
        for member in members {
            let optional: &str = if member.required { "" } else { "?" };
            write_tsdoc(out, "  ", member.description())?;
            writeln!(
                out,
                "  {}{optional}: {};",
                property_key(&member.json_name)?,
                self.type_expr(&member.type_ref)?
            )?;
        }
        Ok(())
    }

    fn type_expr(&self, type_ref: &TypeRef) -> Result<String, JtdCodegenError> {
        if let Some(custom) = string_hint(ID, &type_ref.metadata, TYPE_HINT, &type_ref.pointer)? {
            return Ok(custom.to_string());
        }
        let rendered: String = match &type_ref.kind {
            TypeRefKind::Empty => return Ok("any".to_string()),
            TypeRefKind::Primitive(primitive) => primitive_type(*primitive).to_string(),
            TypeRefKind::Elements(item) => {
                let item_type: String = self.type_expr(item)?;
                if item_type.contains('|') {
                    format!("({item_type})[]")
                } else {
                    format!("{item_type}[]")
                }
            }
            TypeRefKind::Values(item) => format!("{{ [key: string]: {} }}", self.type_expr(item)?),
            TypeRefKind::Definition(id) => self.definition_type(*id)?,
        };
        if type_ref.nullable {
            Ok(format!("{rendered} | null"))
        } else {
            Ok(rendered)
        }
    }

    fn definition_type(&self, id: DefId) -> Result<String, UnsupportedConstructError> {
        let definition: &Definition = self.registry.get(id);
        let custom: Option<&str> =
            string_hint(ID, &definition.metadata, TYPE_HINT, &definition.pointer)?;
        Ok(custom.map_or_else(|| self.names.type_name(id).to_string(), str::to_string))
    }
}

fn write_tsdoc(out: &mut String, indent: &str, description: Option<&str>) -> std::fmt::Result {
    write_doc_block(out, indent, description, "*\\/")
}

/// An interface property key: the bare name when it is an identifier,
/// otherwise a string literal.
fn property_key(json_name: &str) -> Result<String, serde_json::Error> {
    let identifier: bool = json_name
        .starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && json_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        Ok(json_name.to_string())
    } else {
        ts_string(json_name)
    }
}

/// A TypeScript string literal. JSON string escapes are valid TypeScript
/// escapes.
fn ts_string(value: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

const fn primitive_type(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "boolean",
        PrimitiveType::String | PrimitiveType::Timestamp => "string",
        PrimitiveType::Float32
        | PrimitiveType::Float64
        | PrimitiveType::Int8
        | PrimitiveType::Uint8
        | PrimitiveType::Int16
        | PrimitiveType::Uint16
        | PrimitiveType::Int32
        | PrimitiveType::Uint32 => "number",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::render_target;
    use crate::expand::expand;
    use crate::parse::parse_schema;
    use pretty_assertions::assert_eq;

    fn render_typescript(schema_json: &str) -> Result<String, JtdCodegenError> {
        let schema = parse_schema(schema_json).expect("valid schema");
        let registry = expand(&schema, "Root");
        let mut files = render_target(&TypeScriptTarget, &registry)?.files;
        assert_eq!(files.len(), 1);
        let file = files.remove(0);
        assert_eq!(file.path, PathBuf::from("index.ts"));
        Ok(file.contents)
    }

    #[test]
    fn interface_members_keep_wire_names() {
        let actual = render_typescript(
            r#"{
                "metadata": { "description": "A user." },
                "properties": {
                    "user_id": { "type": "string", "metadata": { "description": "Primary key." } },
                    "tags": { "elements": { "type": "string", "nullable": true } },
                    "created-at": { "type": "timestamp" }
                },
                "optionalProperties": {
                    "scores": { "values": { "type": "float64" } },
                    "owner": { "type": "uint32", "nullable": true }
                }
            }"#,
        )
        .expect("rendered");
        let expected = r#"// Generated by jtd-codegen. Do not edit manually.

/**
 * A user.
 */
export interface Root {
  "created-at": string;
  owner?: number | null;
  scores?: { [key: string]: number };
  tags: (string | null)[];
  /**
   * Primary key.
   */
  user_id: string;
}
"#;
        assert_eq!(expected, actual);
    }

    #[test]
    fn enum_members_carry_wire_values_and_docs() {
        let actual = render_typescript(
            r#"{
                "metadata": { "enumDescription": { "done": "Finished */ here." } },
                "enum": ["in_progress", "done"]
            }"#,
        )
        .expect("rendered");
        let expected = r#"// Generated by jtd-codegen. Do not edit manually.

export enum Root {
  InProgress = "in_progress",
  /**
   * Finished *\/ here.
   */
  Done = "done",
}
"#;
        assert_eq!(expected, actual);
    }

    #[test]
    fn discriminator_is_a_union_of_tagged_interfaces() {
        let actual = render_typescript(
            r#"{
                "discriminator": "kind",
                "mapping": {
                    "square": { "properties": { "side": { "type": "float64" } } },
                    "circle": { "properties": { "radius": { "type": "float64" } } }
                }
            }"#,
        )
        .expect("rendered");
        let expected = r#"// Generated by jtd-codegen. Do not edit manually.

export type Root = RootCircle | RootSquare;

export interface RootCircle {
  kind: "circle";
  radius: number;
}

export interface RootSquare {
  kind: "square";
  side: number;
}
"#;
        assert_eq!(expected, actual);
    }

    #[test]
    fn type_override_replaces_and_suppresses_definition() {
        let actual = render_typescript(
            r#"{
                "definitions": {
                    "money": {
                        "metadata": { "typescriptType": "Decimal" },
                        "properties": { "cents": { "type": "int32" } }
                    }
                },
                "properties": {
                    "price": { "ref": "money" },
                    "id": { "type": "string", "metadata": { "typescriptType": "UserId" } }
                }
            }"#,
        )
        .expect("rendered");
        let expected = r"// Generated by jtd-codegen. Do not edit manually.

export interface Root {
  id: UserId;
  price: Decimal;
}
";
        assert_eq!(expected, actual);
    }

    #[test]
    fn non_struct_root_becomes_alias() {
        let actual = render_typescript(
            r#"{
                "definitions": { "item": { "enum": ["a"] } },
                "elements": { "ref": "item" }
            }"#,
        )
        .expect("rendered");
        let expected = r#"// Generated by jtd-codegen. Do not edit manually.

export type Root = Item[];

export enum Item {
  A = "a",
}
"#;
        assert_eq!(expected, actual);
    }

    #[test]
    fn empty_schema_is_any_even_when_nullable() {
        let actual = render_typescript(
            r#"{ "properties": { "extra": { "nullable": true }, "list": { "values": {} } } }"#,
        )
        .expect("rendered");
        assert!(actual.contains("  extra: any;\n"));
        assert!(actual.contains("  list: { [key: string]: any };\n"));
    }

    #[test]
    fn property_keys_are_quoted_only_when_needed() {
        assert_eq!(property_key("$ref_1").expect("key"), "$ref_1");
        assert_eq!(property_key("type").expect("key"), "type");
        assert_eq!(property_key("1st").expect("key"), "\"1st\"");
        assert_eq!(property_key("a b").expect("key"), "\"a b\"");
        assert_eq!(property_key("").expect("key"), "\"\"");
    }
}
