//! Java classes annotated for Jackson, one file per type.

use super::{
    GENERATED_BY, OutputFile, Target, check_container_hint, overridden_definitions, string_hint,
    write_doc_block,
};
use crate::error::{JtdCodegenError, UnsupportedConstructError};
use crate::naming::{Case, ConstantScope, NamingConvention, ResolvedNames};
use crate::registry::{DefId, Definition, DefinitionKind, Member, Registry, TypeRef, TypeRefKind};
use crate::schema::PrimitiveType;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::debug;

const ID: &str = "java-jackson";
const TYPE_HINT: &str = "javaJacksonType";
const CONTAINER_HINT: &str = "javaJacksonContainer";

const JSON_CREATOR: &str = "com.fasterxml.jackson.annotation.JsonCreator";
const JSON_IGNORE_PROPERTIES: &str = "com.fasterxml.jackson.annotation.JsonIgnoreProperties";
const JSON_INCLUDE: &str = "com.fasterxml.jackson.annotation.JsonInclude";
const JSON_PROPERTY: &str = "com.fasterxml.jackson.annotation.JsonProperty";
const JSON_SUB_TYPES: &str = "com.fasterxml.jackson.annotation.JsonSubTypes";
const JSON_TYPE_INFO: &str = "com.fasterxml.jackson.annotation.JsonTypeInfo";
const JSON_VALUE: &str = "com.fasterxml.jackson.annotation.JsonValue";
const JSON_SERIALIZE: &str = "com.fasterxml.jackson.databind.annotation.JsonSerialize";
const OFFSET_DATE_TIME: &str = "java.time.OffsetDateTime";
const LIST: &str = "java.util.List";
const MAP: &str = "java.util.Map";

const HELPER_IMPORTS: &[&str] = &[
    "com.fasterxml.jackson.core.JsonGenerator",
    "com.fasterxml.jackson.core.JsonParser",
    "com.fasterxml.jackson.core.JsonProcessingException",
    "com.fasterxml.jackson.databind.DeserializationContext",
    "com.fasterxml.jackson.databind.JsonDeserializer",
    "com.fasterxml.jackson.databind.JsonSerializer",
    "com.fasterxml.jackson.databind.SerializerProvider",
    "com.fasterxml.jackson.databind.annotation.JsonDeserialize",
    JSON_SERIALIZE,
    "java.io.IOException",
];

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "record", "return",
    "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "var", "void", "volatile", "while", "yield",
];

/// `java.lang` types, imported annotation names and the unsigned helpers.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Boolean",
    "Byte",
    "Double",
    "Float",
    "Integer",
    "JsonCreator",
    "JsonIgnoreProperties",
    "JsonInclude",
    "JsonProperty",
    "JsonSerialize",
    "JsonSubTypes",
    "JsonTypeInfo",
    "JsonValue",
    "List",
    "Map",
    "Object",
    "OffsetDateTime",
    "Override",
    "Short",
    "String",
    "UnsignedByte",
    "UnsignedInteger",
    "UnsignedShort",
];

pub const NAMING: NamingConvention = NamingConvention {
    type_case: Case::PASCAL,
    member_case: Case::CAMEL,
    constant_case: Case::SCREAMING_SNAKE,
    keywords: KEYWORDS,
    initialisms: &[],
    constant_scope: ConstantScope::PerEnum,
    reserved_type_names: RESERVED_TYPE_NAMES,
};

/// Java with Jackson annotations, in one package.
#[derive(Debug, Clone)]
pub struct JavaJacksonTarget {
    package: String,
}

impl JavaJacksonTarget {
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl Target for JavaJacksonTarget {
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
            package: &self.package,
            registry,
            names,
        };
        let overridden: Vec<bool> = overridden_definitions(registry, TYPE_HINT);
        let mut files: Vec<OutputFile> = Vec::new();
        let mut unsigned: BTreeSet<Unsigned> = BTreeSet::new();
        for definition in registry.iter() {
            if overridden[definition.id.index()] {
                continue;
            }
            let mut uses = Uses::default();
            let mut body = String::new();
            renderer.definition(&mut body, definition, &mut uses)?;
            files.push(renderer.file(names.type_name(definition.id), &uses.imports, &body)?);
            unsigned.extend(uses.unsigned);
        }
        for helper in unsigned {
            debug!(helper = helper.class(), "emitting unsigned helper class");
            let mut body = String::new();
            write_unsigned_helper(&mut body, helper)?;
            let imports: BTreeSet<&'static str> = HELPER_IMPORTS.iter().copied().collect();
            files.push(renderer.file(helper.class(), &imports, &body)?);
        }
        Ok(files)
    }
}

/// Imports and helper classes one generated file depends on.
#[derive(Debug, Default)]
struct Uses {
    imports: BTreeSet<&'static str>,
    unsigned: BTreeSet<Unsigned>,
}

/// Java has no unsigned integers; these get small wrapper classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Unsigned {
    Byte,
    Short,
    Integer,
}

impl Unsigned {
    const fn class(self) -> &'static str {
        match self {
            Self::Byte => "UnsignedByte",
            Self::Short => "UnsignedShort",
            Self::Integer => "UnsignedInteger",
        }
    }

    const fn primitive(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "int",
        }
    }

    const fn boxed(self) -> &'static str {
        match self {
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Integer => "Integer",
        }
    }
}

struct Renderer<'a> {
    package: &'a str,
    registry: &'a Registry,
    names: &'a ResolvedNames,
}

impl Renderer<'_> {
    fn file(
        &self,
        type_name: &str,
        imports: &BTreeSet<&'static str>,
        body: &str,
    ) -> Result<OutputFile, JtdCodegenError> {
        let mut contents = String::new();
        writeln!(contents, "// {GENERATED_BY}")?;
        writeln!(contents)?;
        writeln!(contents, "package {};", self.package)?;
        writeln!(contents)?;
        if !imports.is_empty() {
            for import in imports {
                writeln!(contents, "import {import};")?;
            }
            writeln!(contents)?;
        }
        contents.push_str(body);
        Ok(OutputFile {
            path: PathBuf::from(format!("{type_name}.java")),
            contents,
        })
    }

    fn definition(
        &self,
        out: &mut String,
        definition: &Definition,
        uses: &mut Uses,
    ) -> Result<(), JtdCodegenError> {
        let type_name: &str = self.names.type_name(definition.id);
        match &definition.kind {
            DefinitionKind::Struct {
                members,
                additional_properties,
            } => self.write_class(out, definition, members, *additional_properties, None, uses),
            DefinitionKind::UnionVariant {
                parent,
                members,
                additional_properties,
                ..
            } => {
                let base: String = self.definition_type(*parent)?;
                self.write_class(
                    out,
                    definition,
                    members,
                    *additional_properties,
                    Some(&base),
                    uses,
                )
            }
            DefinitionKind::Enum { values } => {
                write_javadoc(out, "", definition.metadata.description())?;
                uses.imports.insert(JSON_PROPERTY);
                writeln!(out, "public enum {type_name} {{")?;
                let constants: &[String] = &self.names.get(definition.id).constants;
                for (index, (value, constant)) in values.iter().zip(constants).enumerate() {
                    if index > 0 {
                        writeln!(out)?;
                    }
                    write_javadoc(out, "    ", value.description.as_deref())?;
                    writeln!(out, "    @JsonProperty({})", java_string(&value.value)?)?;
                    writeln!(out, "    {constant},")?;
                }
                writeln!(out, "}}")?;
                Ok(())
            }
            DefinitionKind::UnionBase { tag, variants } => {
                write_javadoc(out, "", definition.metadata.description())?;
                uses.imports.insert(JSON_TYPE_INFO);
                uses.imports.insert(JSON_SUB_TYPES);
                writeln!(
                    out,
                    "@JsonTypeInfo(use = JsonTypeInfo.Id.NAME, property = {})",
                    java_string(tag)?
                )?;
                writeln!(out, "@JsonSubTypes({{")?;
                for variant in variants {
                    let DefinitionKind::UnionVariant { tag_value, .. } =
                        &self.registry.get(*variant).kind
                    else {
                        continue;
                    };
                    writeln!(
                        out,
                        "    @JsonSubTypes.Type(name = {}, value = {}.class),",
                        java_string(tag_value)?,
                        self.definition_type(*variant)?
                    )?;
                }
                writeln!(out, "}})")?;
                writeln!(out, "public abstract class {type_name} {{")?;
                writeln!(out, "}}")?;
                Ok(())
            }
            DefinitionKind::ValueWrapper { inner } => {
                let value_type: String = self.type_expr(inner, uses)?;
                uses.imports.insert(JSON_CREATOR);
                uses.imports.insert(JSON_VALUE);
                write_javadoc(out, "", definition.metadata.description())?;
                writeln!(out, "public class {type_name} {{")?;
                writeln!(out, "    @JsonValue")?;
                writeln!(out, "    private {value_type} value;")?;
                writeln!(out)?;
                writeln!(out, "    public {type_name}() {{")?;
                writeln!(out, "    }}")?;
                writeln!(out)?;
                writeln!(out, "    @JsonCreator")?;
                writeln!(out, "    public {type_name}({value_type} value) {{")?;
                writeln!(out, "        this.value = value;")?;
                writeln!(out, "    }}")?;
                write_accessors(out, "value", &value_type, None)?;
                writeln!(out, "}}")?;
                Ok(())
            }
        }
    }

    fn write_class(
        &self,
        out: &mut String,
        definition: &Definition,
        members: &[Member],
        additional_properties: bool,
        base: Option<&str>,
        uses: &mut Uses,
    ) -> Result<(), JtdCodegenError> {
        let type_name: &str = self.names.type_name(definition.id);
        let fields: &[String] = &self.names.get(definition.id).members;
        let field_types: Vec<String> = members
            .iter()
            .map(|member| self.type_expr(&member.type_ref, uses))
            .collect::<Result<_, _>>()?;

        write_javadoc(out, "", definition.metadata.description())?;
        uses.imports.insert(JSON_SERIALIZE);
        writeln!(out, "@JsonSerialize")?;
        if additional_properties {
            uses.imports.insert(JSON_IGNORE_PROPERTIES);
            writeln!(out, "@JsonIgnoreProperties(ignoreUnknown = true)")?;
        }
        match base {
            Some(base) => writeln!(out, "public class {type_name} extends {base} {{")?,
            None => writeln!(out, "public class {type_name} {{")?,
        }

        for ((member, field), field_type) in members.iter().zip(fields).zip(&field_types) {
            write_javadoc(out, "    ", member.description())?;
            if !member.required {
                uses.imports.insert(JSON_INCLUDE);
                writeln!(out, "    @JsonInclude(JsonInclude.Include.NON_NULL)")?;
            }
            uses.imports.insert(JSON_PROPERTY);
            writeln!(out, "    @JsonProperty({})", java_string(&member.json_name)?)?;
            writeln!(out, "    private {field_type} {field};")?;
            writeln!(out)?;
        }

        writeln!(out, "    public {type_name}() {{")?;
        writeln!(out, "    }}")?;
        for ((member, field), field_type) in members.iter().zip(fields).zip(&field_types) {
            write_accessors(out, field, field_type, member.description())?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }

    fn type_expr(&self, type_ref: &TypeRef, uses: &mut Uses) -> Result<String, JtdCodegenError> {
        if let Some(custom) = string_hint(ID, &type_ref.metadata, TYPE_HINT, &type_ref.pointer)? {
            return Ok(custom.to_string());
        }
        let container: Option<String> = check_container_hint(ID, type_ref, CONTAINER_HINT)?;
        let rendered: String = match &type_ref.kind {
            TypeRefKind::Empty => "Object".to_string(),
            TypeRefKind::Primitive(primitive) => primitive_type(*primitive, uses).to_string(),
            TypeRefKind::Elements(item) => {
                let item_type: String = self.type_expr(item, uses)?;
                let container: &str = container.as_deref().unwrap_or_else(|| {
                    uses.imports.insert(LIST);
                    "List"
                });
                format!("{container}<{item_type}>")
            }
            TypeRefKind::Values(item) => {
                let item_type: String = self.type_expr(item, uses)?;
                let container: &str = container.as_deref().unwrap_or_else(|| {
                    uses.imports.insert(MAP);
                    "Map"
                });
                format!("{container}<String, {item_type}>")
            }
            TypeRefKind::Definition(id) => self.definition_type(*id)?,
        };
        Ok(rendered)
    }

    fn definition_type(&self, id: DefId) -> Result<String, UnsupportedConstructError> {
        let definition: &Definition = self.registry.get(id);
        let custom: Option<&str> =
            string_hint(ID, &definition.metadata, TYPE_HINT, &definition.pointer)?;
        Ok(custom.map_or_else(|| self.names.type_name(id).to_string(), str::to_string))
    }
}

fn primitive_type(primitive: PrimitiveType, uses: &mut Uses) -> &'static str {
    let unsigned: Unsigned = match primitive {
        PrimitiveType::Boolean => return "Boolean",
        PrimitiveType::String => return "String",
        PrimitiveType::Timestamp => {
            uses.imports.insert(OFFSET_DATE_TIME);
            return "OffsetDateTime";
        }
        PrimitiveType::Float32 => return "Float",
        PrimitiveType::Float64 => return "Double",
        PrimitiveType::Int8 => return "Byte",
        PrimitiveType::Int16 => return "Short",
        PrimitiveType::Int32 => return "Integer",
        PrimitiveType::Uint8 => Unsigned::Byte,
        PrimitiveType::Uint16 => Unsigned::Short,
        PrimitiveType::Uint32 => Unsigned::Integer,
    };
    uses.unsigned.insert(unsigned);
    unsigned.class()
}

/// A Java string literal. JSON string escapes are valid Java escapes.
fn java_string(value: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

fn write_javadoc(out: &mut String, indent: &str, description: Option<&str>) -> std::fmt::Result {
    write_doc_block(out, indent, description, "*&#47;")
}

/// Getter and setter for `field`, each documented with the member's
/// description.
fn write_accessors(
    out: &mut String,
    field: &str,
    field_type: &str,
    description: Option<&str>,
) -> std::fmt::Result {
    let mut chars = field.chars();
    let accessor: String = chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default();
    writeln!(out)?;
    write_javadoc(out, "    ", description)?;
    writeln!(out, "    public {field_type} get{accessor}() {{")?;
    writeln!(out, "        return {field};")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    write_javadoc(out, "    ", description)?;
    writeln!(out, "    public void set{accessor}({field_type} {field}) {{")?;
    writeln!(out, "        this.{field} = {field};")?;
    writeln!(out, "    }}")
}

fn write_unsigned_helper(out: &mut String, unsigned: Unsigned) -> std::fmt::Result {
    let class: &str = unsigned.class();
    let primitive: &str = unsigned.primitive();
    let boxed: &str = unsigned.boxed();
    writeln!(out, "@JsonSerialize(using = {class}.Serializer.class)")?;
    writeln!(out, "@JsonDeserialize(using = {class}.Deserializer.class)")?;
    writeln!(out, "public class {class} {{")?;
    writeln!(out, "    private {primitive} value;")?;
    writeln!(out)?;
    writeln!(out, "    public {class}() {{")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    public {class}({primitive} value) {{")?;
    writeln!(out, "        this.value = value;")?;
    writeln!(out, "    }}")?;
    write_accessors(out, "value", primitive, None)?;
    writeln!(out)?;
    writeln!(
        out,
        "    public static class Serializer extends JsonSerializer<{class}> {{"
    )?;
    writeln!(out, "        @Override")?;
    writeln!(
        out,
        "        public void serialize({class} value, JsonGenerator gen, \
         SerializerProvider serializers)"
    )?;
    writeln!(out, "                throws IOException, JsonProcessingException {{")?;
    writeln!(
        out,
        "            gen.writeNumber({boxed}.toUnsignedLong(value.getValue()));"
    )?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(
        out,
        "    public static class Deserializer extends JsonDeserializer<{class}> {{"
    )?;
    writeln!(out, "        @Override")?;
    writeln!(
        out,
        "        public {class} deserialize(JsonParser p, DeserializationContext ctxt)"
    )?;
    writeln!(out, "                throws IOException, JsonProcessingException {{")?;
    writeln!(
        out,
        "            return new {class}(({primitive}) p.getLongValue());"
    )?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")
}
