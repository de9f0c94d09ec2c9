//! Go structs with `encoding/json` tags, in a single `<package>.go`.

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
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

const ID: &str = "go";
const TYPE_HINT: &str = "goType";
const CONTAINER_HINT: &str = "goContainer";
const DISCRIMINATOR_HINT: &str = "goDiscriminatorType";

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

/// The initialisms `golint` upper-cases.
const INITIALISMS: &[&str] = &[
    "acl", "api", "ascii", "cpu", "css", "dns", "eof", "guid", "html", "http", "https", "id",
    "ip", "json", "lhs", "qps", "ram", "rhs", "rpc", "sla", "smtp", "sql", "ssh", "tcp", "tls",
    "ttl", "udp", "ui", "uid", "uri", "url", "utf8", "uuid", "vm", "xml", "xmpp", "xsrf", "xss",
];

pub const NAMING: NamingConvention = NamingConvention {
    type_case: Case::PASCAL,
    member_case: Case::PASCAL,
    constant_case: Case::PASCAL,
    keywords: KEYWORDS,
    initialisms: INITIALISMS,
    constant_scope: ConstantScope::Global,
    reserved_type_names: &[],
};

/// Go with `encoding/json`.
#[derive(Debug, Clone)]
pub struct GoTarget {
    package: String,
}

impl GoTarget {
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl Target for GoTarget {
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
        let renderer = Renderer {
            registry,
            names,
            recursion: Recursion::new(registry),
        };
        let overridden: Vec<bool> = overridden_definitions(registry, TYPE_HINT);
        let mut imports: BTreeSet<&'static str> = BTreeSet::new();
        let mut items: Vec<String> = Vec::new();
        for definition in registry.iter() {
            if overridden[definition.id.index()] {
                continue;
            }
            let mut item = String::new();
            renderer.definition(&mut item, definition, &mut imports)?;
            items.push(item);
        }

        let mut contents = String::new();
        writeln!(contents, "// {GENERATED_BY}")?;
        writeln!(contents)?;
        writeln!(contents, "package {}", self.package)?;
        if !imports.is_empty() {
            writeln!(contents)?;
            writeln!(contents, "import (")?;
            for import in &imports {
                writeln!(contents, "\t\"{import}\"")?;
            }
            writeln!(contents, ")")?;
        }
        for item in items {
            writeln!(contents)?;
            contents.push_str(&item);
        }
        Ok(vec![OutputFile {
            path: PathBuf::from(format!("{}.go", self.package)),
            contents,
        }])
    }
}

struct Renderer<'a> {
    registry: &'a Registry,
    names: &'a ResolvedNames,
    recursion: Recursion,
}

impl Renderer<'_> {
    fn definition(
        &self,
        out: &mut String,
        definition: &Definition,
        imports: &mut BTreeSet<&'static str>,
    ) -> Result<(), JtdCodegenError> {
        let type_name: &str = self.names.type_name(definition.id);
        write_wrapped_comment(out, "// ", definition.metadata.description())?;
        match &definition.kind {
            DefinitionKind::Struct { members, .. }
            | DefinitionKind::UnionVariant { members, .. } => {
                writeln!(out, "type {type_name} struct {{")?;
                let fields: &[String] = &self.names.get(definition.id).members;
                for (member, field) in members.iter().zip(fields) {
                    self.write_field(out, definition.id, member, field, imports)?;
                }
                writeln!(out, "}}")?;
            }
            DefinitionKind::Enum { values } => {
                write_enum(out, type_name, values, &self.names.get(definition.id).constants)?;
            }
            DefinitionKind::UnionBase { tag, variants } => {
                self.write_union(out, definition, tag, variants, imports)?;
            }
            DefinitionKind::ValueWrapper { inner } => {
                let inner_type: String = self.type_expr(inner, Some(definition.id), imports)?;
                if matches!(inner.kind, TypeRefKind::Definition(_)) {
                    writeln!(out, "type {type_name} = {inner_type}")?;
                } else {
                    writeln!(out, "type {type_name} {inner_type}")?;
                }
            }
        }
        Ok(())
    }

    fn write_field(
        &self,
        out: &mut String,
        holder: DefId,
        member: &Member,
        field: &str,
        imports: &mut BTreeSet<&'static str>,
    ) -> Result<(), JtdCodegenError> {
        let type_ref: &TypeRef = &member.type_ref;
        let mut field_type: String = self.type_expr(type_ref, Some(holder), imports)?;
        let nilable: bool = field_type.starts_with('*') || is_nilable(type_ref);
        if !member.required && !nilable {
            field_type = format!("*{field_type}");
        }
        let tag_name: String = json_tag_name(&member.json_name, &type_ref.pointer)?;
        let omitempty: &str = if member.required { "" } else { ",omitempty" };
        write_wrapped_comment(out, "\t// ", member.description())?;
        writeln!(out, "\t{field} {field_type} `json:\"{tag_name}{omitempty}\"`")?;
        Ok(())
    }

    fn write_union(
        &self,
        out: &mut String,
        definition: &Definition,
        tag: &str,
        variants: &[DefId],
        imports: &mut BTreeSet<&'static str>,
    ) -> Result<(), JtdCodegenError> {
        imports.insert("encoding/json");
        imports.insert("fmt");
        let names = self.names.get(definition.id);
        let Some(tag_member) = names.tag_member.as_deref() else {
            return Err(UnsupportedConstructError {
                target: ID,
                path: definition.pointer.clone(),
                construct: "discriminator without a tag member".to_string(),
            }
            .into());
        };
        let tag_type: &str = string_hint(
            ID,
            &definition.metadata,
            DISCRIMINATOR_HINT,
            &definition.pointer,
        )?
        .unwrap_or("string");
        let tag_name: String = json_tag_name(
            tag,
            &json_pointer::child(&definition.pointer, "discriminator"),
        )?;

        let mut cases: Vec<UnionCase<'_>> = Vec::with_capacity(variants.len());
        for (variant, field) in variants.iter().zip(&names.members) {
            let DefinitionKind::UnionVariant { tag_value, .. } = &self.registry.get(*variant).kind
            else {
                continue;
            };
            let variant_type: String = self.definition_type(*variant)?;
            if !is_embeddable(&variant_type) {
                return Err(UnsupportedConstructError {
                    target: ID,
                    path: json_pointer::descend(&self.registry.get(*variant).pointer, &[
                        "metadata", TYPE_HINT,
                    ]),
                    construct: format!("variant type `{variant_type}` cannot be embedded"),
                }
                .into());
            }
            cases.push(UnionCase {
                tag_value: go_string(tag_value)?,
                field,
                variant_type,
            });
        }

        let union = Union {
            type_name: self.names.type_name(definition.id),
            tag_member,
            tag_type,
            tag_name,
            cases,
        };
        union.write_struct(out)?;
        writeln!(out)?;
        union.write_marshal(out)?;
        writeln!(out)?;
        union.write_unmarshal(out)?;
        Ok(())
    }

    /// The Go type for a position. `holder` is the definition holding the
    /// value directly, used to point at references that close a cycle.
    fn type_expr(
        &self,
        type_ref: &TypeRef,
        holder: Option<DefId>,
        imports: &mut BTreeSet<&'static str>,
    ) -> Result<String, JtdCodegenError> {
        if let Some(custom) = string_hint(ID, &type_ref.metadata, TYPE_HINT, &type_ref.pointer)? {
            return Ok(custom.to_string());
        }
        let container: Option<String> = check_container_hint(ID, type_ref, CONTAINER_HINT)?;
        let rendered: String = match &type_ref.kind {
            TypeRefKind::Empty => return Ok("interface{}".to_string()),
            TypeRefKind::Primitive(PrimitiveType::Timestamp) => {
                imports.insert("time");
                "time.Time".to_string()
            }
            TypeRefKind::Primitive(primitive) => primitive_type(*primitive).to_string(),
            TypeRefKind::Elements(item) => {
                let item_type: String = self.type_expr(item, None, imports)?;
                match container {
                    Some(container) => format!("{container}[{item_type}]"),
                    None => format!("[]{item_type}"),
                }
            }
            TypeRefKind::Values(item) => {
                let item_type: String = self.type_expr(item, None, imports)?;
                match container {
                    Some(container) => format!("{container}[string, {item_type}]"),
                    None => format!("map[string]{item_type}"),
                }
            }
            TypeRefKind::Definition(id) => {
                let name: String = self.definition_type(*id)?;
                let recursive: bool =
                    holder.is_some_and(|holder| self.recursion.needs_indirection(holder, *id));
                if recursive && !type_ref.nullable {
                    format!("*{name}")
                } else {
                    name
                }
            }
        };
        if type_ref.nullable && !is_nilable(type_ref) {
            Ok(format!("*{rendered}"))
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

/// A discriminated union as a struct holding one field per variant, with
/// JSON methods that read and write the tag alongside the variant's fields.
struct Union<'a> {
    type_name: &'a str,
    tag_member: &'a str,
    tag_type: &'a str,
    tag_name: String,
    cases: Vec<UnionCase<'a>>,
}

struct UnionCase<'a> {
    /// Quoted Go literal.
    tag_value: String,
    field: &'a str,
    variant_type: String,
}

impl Union<'_> {
    fn write_struct(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "type {} struct {{", self.type_name)?;
        writeln!(out, "\t{} {}", self.tag_member, self.tag_type)?;
        for case in &self.cases {
            writeln!(out, "\t{} {}", case.field, case.variant_type)?;
        }
        writeln!(out, "}}")
    }

    fn write_marshal(&self, out: &mut String) -> std::fmt::Result {
        let Self {
            type_name,
            tag_member,
            tag_type,
            tag_name,
            ..
        } = self;
        writeln!(out, "func (v {type_name}) MarshalJSON() ([]byte, error) {{")?;
        writeln!(out, "\tswitch v.{tag_member} {{")?;
        for case in &self.cases {
            writeln!(out, "\tcase {}:", case.tag_value)?;
            writeln!(out, "\t\treturn json.Marshal(struct {{")?;
            writeln!(out, "\t\t\tT {tag_type} `json:\"{tag_name}\"`")?;
            writeln!(out, "\t\t\t{}", case.variant_type)?;
            writeln!(out, "\t\t}}{{v.{tag_member}, v.{}}})", case.field)?;
        }
        writeln!(out, "\t}}")?;
        writeln!(out)?;
        writeln!(
            out,
            "\treturn nil, fmt.Errorf(\"bad {tag_member} value: %s\", v.{tag_member})"
        )?;
        writeln!(out, "}}")
    }

    fn write_unmarshal(&self, out: &mut String) -> std::fmt::Result {
        let Self {
            type_name,
            tag_member,
            tag_type,
            tag_name,
            ..
        } = self;
        writeln!(out, "func (v *{type_name}) UnmarshalJSON(b []byte) error {{")?;
        writeln!(out, "\tvar t struct {{")?;
        writeln!(out, "\t\tT {tag_type} `json:\"{tag_name}\"`")?;
        writeln!(out, "\t}}")?;
        writeln!(out)?;
        writeln!(out, "\tif err := json.Unmarshal(b, &t); err != nil {{")?;
        writeln!(out, "\t\treturn err")?;
        writeln!(out, "\t}}")?;
        writeln!(out)?;
        writeln!(out, "\tvar err error")?;
        writeln!(out, "\tswitch t.T {{")?;
        for case in &self.cases {
            writeln!(out, "\tcase {}:", case.tag_value)?;
            writeln!(out, "\t\terr = json.Unmarshal(b, &v.{})", case.field)?;
        }
        writeln!(out, "\tdefault:")?;
        writeln!(out, "\t\terr = fmt.Errorf(\"bad {tag_member} value: %s\", t.T)")?;
        writeln!(out, "\t}}")?;
        writeln!(out)?;
        writeln!(out, "\tif err != nil {{")?;
        writeln!(out, "\t\treturn err")?;
        writeln!(out, "\t}}")?;
        writeln!(out)?;
        writeln!(out, "\tv.{tag_member} = t.T")?;
        writeln!(out, "\treturn nil")?;
        writeln!(out, "}}")
    }
}

fn write_enum(
    out: &mut String,
    type_name: &str,
    values: &[EnumValue],
    constants: &[String],
) -> Result<(), JtdCodegenError> {
    writeln!(out, "type {type_name} string")?;
    writeln!(out)?;
    writeln!(out, "const (")?;
    for (value, constant) in values.iter().zip(constants) {
        write_wrapped_comment(out, "\t// ", value.description.as_deref())?;
        writeln!(out, "\t{constant} {type_name} = {}", go_string(&value.value)?)?;
    }
    writeln!(out, ")")?;
    Ok(())
}

/// Whether the zero value of the unpointed type already means "absent".
fn is_nilable(type_ref: &TypeRef) -> bool {
    type_ref.metadata.hint(TYPE_HINT).is_none()
        && matches!(
            type_ref.kind,
            TypeRefKind::Empty | TypeRefKind::Elements(_) | TypeRefKind::Values(_)
        )
}

/// A type name usable as an embedded field: `Name` or `pkg.Name`.
fn is_embeddable(type_name: &str) -> bool {
    let identifier = |part: &str| {
        part.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let parts: Vec<&str> = type_name.split('.').collect();
    parts.len() <= 2 && parts.iter().all(|part| identifier(part))
}

/// The name part of a `json:"..."` struct tag. `encoding/json` ignores tag
/// names with characters outside this set and falls back to the field name.
/// Letters and digits are any Unicode alphanumerics, close to Go's
/// `unicode.IsLetter` and `unicode.IsDigit`.
fn json_tag_name(json_name: &str, pointer: &str) -> Result<String, UnsupportedConstructError> {
    let valid: bool = !json_name.is_empty()
        && json_name
            .chars()
            .all(|c| c.is_alphanumeric() || "!#$%&()*+-./:;<=>?@[]^_{|}~ ".contains(c));
    if !valid {
        return Err(UnsupportedConstructError {
            target: ID,
            path: pointer.to_string(),
            construct: format!("property name {json_name:?} cannot appear in a struct tag"),
        });
    }
    // A bare "-" tag means "skip this field".
    if json_name == "-" {
        return Ok("-,".to_string());
    }
    Ok(json_name.to_string())
}

/// A Go interpreted string literal. JSON string escapes are valid Go escapes.
fn go_string(value: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

const fn primitive_type(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "bool",
        PrimitiveType::String => "string",
        PrimitiveType::Timestamp => "time.Time",
        PrimitiveType::Float32 => "float32",
        PrimitiveType::Float64 => "float64",
        PrimitiveType::Int8 => "int8",
        PrimitiveType::Uint8 => "uint8",
        PrimitiveType::Int16 => "int16",
        PrimitiveType::Uint16 => "uint16",
        PrimitiveType::Int32 => "int32",
        PrimitiveType::Uint32 => "uint32",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::render_target;
    use crate::expand::expand;
    use crate::parse::parse_schema;

    fn render_go(schema_json: &str) -> Result<String, JtdCodegenError> {
        let schema = parse_schema(schema_json).expect("valid schema");
        let registry = expand(&schema, "Root");
        let mut files = render_target(&GoTarget::new("example"), &registry)?.files;
        assert_eq!(files.len(), 1);
        let file = files.remove(0);
        assert_eq!(file.path, PathBuf::from("example.go"));
        Ok(file.contents)
    }

    #[test]
    fn struct_fields_use_pointers_for_optional_and_nullable() {
        let actual = render_go(
            r#"{
                "properties": {
                    "user_id": { "type": "string" },
                    "created_at": { "type": "timestamp", "nullable": true },
                    "tags": { "elements": { "type": "string" } }
                },
                "optionalProperties": {
                    "score": { "type": "float64" },
                    "extra": { "values": { "type": "int32" } }
                }
            }"#,
        )
        .expect("rendered");
        let expected = "// Generated by jtd-codegen. Do not edit manually.

package example

import (
\t\"time\"
)

type Root struct {
\tCreatedAt *time.Time `json:\"created_at\"`
\tExtra map[string]int32 `json:\"extra,omitempty\"`
\tScore *float64 `json:\"score,omitempty\"`
\tTags []string `json:\"tags\"`
\tUserID string `json:\"user_id\"`
}
";
        assert_eq!(expected, actual, "initialisms are upper-cased in field names");
    }

    #[test]
    fn enum_constants_are_package_level_and_prefixed() {
        let actual = render_go(
            r#"{
                "metadata": { "description": "Job state." },
                "enum": ["in_progress", "done"]
            }"#,
        )
        .expect("rendered");
        let expected = "// Generated by jtd-codegen. Do not edit manually.

package example

// Job state.
type Root string

const (
\tRootInProgress Root = \"in_progress\"
\tRootDone Root = \"done\"
)
";
        assert_eq!(expected, actual);
    }

    #[test]
    fn discriminator_renders_marshal_methods() {
        let actual = render_go(
            r#"{
                "discriminator": "foo",
                "mapping": {
                    "BAR_BAZ": { "properties": { "baz": { "type": "string" } } },
                    "QUUX": { "properties": { "quuz": { "type": "string" } } }
                }
            }"#,
        )
        .expect("rendered");
        let expected = "// Generated by jtd-codegen. Do not edit manually.

package example

import (
\t\"encoding/json\"
\t\"fmt\"
)

type Root struct {
\tFoo string
\tBarBaz RootBarBaz
\tQuux RootQuux
}

func (v Root) MarshalJSON() ([]byte, error) {
\tswitch v.Foo {
\tcase \"BAR_BAZ\":
\t\treturn json.Marshal(struct {
\t\t\tT string `json:\"foo\"`
\t\t\tRootBarBaz
\t\t}{v.Foo, v.BarBaz})
\tcase \"QUUX\":
\t\treturn json.Marshal(struct {
\t\t\tT string `json:\"foo\"`
\t\t\tRootQuux
\t\t}{v.Foo, v.Quux})
\t}

\treturn nil, fmt.Errorf(\"bad Foo value: %s\", v.Foo)
}

func (v *Root) UnmarshalJSON(b []byte) error {
\tvar t struct {
\t\tT string `json:\"foo\"`
\t}

\tif err := json.Unmarshal(b, &t); err != nil {
\t\treturn err
\t}

\tvar err error
\tswitch t.T {
\tcase \"BAR_BAZ\":
\t\terr = json.Unmarshal(b, &v.BarBaz)
\tcase \"QUUX\":
\t\terr = json.Unmarshal(b, &v.Quux)
\tdefault:
\t\terr = fmt.Errorf(\"bad Foo value: %s\", t.T)
\t}

\tif err != nil {
\t\treturn err
\t}

\tv.Foo = t.T
\treturn nil
}

type RootBarBaz struct {
\tBaz string `json:\"baz\"`
}

type RootQuux struct {
\tQuuz string `json:\"quuz\"`
}
";
        assert_eq!(expected, actual, "variant structs carry no tag field");
    }

    #[test]
    fn discriminator_type_override_changes_tag_type() {
        let actual = render_go(
            r#"{
                "metadata": { "goDiscriminatorType": "Kind" },
                "discriminator": "kind",
                "mapping": { "a": { "properties": {} } }
            }"#,
        )
        .expect("rendered");
        assert!(actual.contains("\tKind Kind\n"));
        assert!(actual.contains("\t\tT Kind `json:\"kind\"`\n"));
    }

    #[test]
    fn wrappers_and_recursive_references() {
        let actual = render_go(
            r#"{
                "definitions": {
                    "node": {
                        "properties": {
                            "next": { "ref": "node" },
                            "children": { "elements": { "ref": "node" } }
                        }
                    },
                    "ids": { "elements": { "type": "string" } }
                },
                "ref": "node"
            }"#,
        )
        .expect("rendered");
        assert!(actual.contains("type Root = Node\n"));
        assert!(actual.contains("type Ids []string\n"));
        assert!(actual.contains("\tNext *Node `json:\"next\"`\n"));
        assert!(actual.contains("\tChildren []Node `json:\"children\"`\n"));
    }

    #[test]
    fn dash_property_name_keeps_its_tag() {
        let actual =
            render_go(r#"{ "properties": { "-": { "type": "string" } } }"#).expect("rendered");
        assert!(actual.contains("\tEmpty string `json:\"-,\"`\n"));
    }

    #[test]
    fn tag_names_accept_unicode_letters_and_listed_punctuation() {
        for accepted in ["é", "日本", "a.b:c", "a b", "x-y_z", "$ref", "[0]", "{a|b}", "~@^"] {
            assert_eq!(
                json_tag_name(accepted, "/p").expect("valid tag name"),
                accepted,
                "{accepted:?} should be kept"
            );
        }
        for rejected in ["", "a,b", "a\"b", "a\\b", "a`b", "a'b", "a\tb", "a\u{7f}b"] {
            assert!(
                json_tag_name(rejected, "/p").is_err(),
                "{rejected:?} should be rejected"
            );
        }
    }

    #[test]
    fn property_name_with_comma_is_unsupported() {
        let error = render_go(r#"{ "properties": { "a,b": { "type": "string" } } }"#)
            .expect_err("comma in tag");
        match error {
            JtdCodegenError::Unsupported(error) => {
                assert_eq!(error.target, "go");
                assert_eq!(error.path, "/properties/a,b");
            }
            other => panic!("expected unsupported construct, got {other}"),
        }
    }
}
