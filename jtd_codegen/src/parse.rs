//! Parsing and validation of JSON Type Definition documents.
//!
//! Walks the raw document (as `serde_json::Value`) and builds a [`Schema`].
//! The first structural problem aborts the walk with a [`SchemaError`]
//! pointing at the offending node; no partial schema is ever returned.
//! Object keys are visited in sorted order so the reported error does not
//! depend on the key order of the input document.

use crate::error::{SchemaError, SchemaErrorKind};
use crate::json_pointer;
use crate::schema::{Form, Metadata, PrimitiveType, Schema, SchemaNode};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Every keyword a schema node may contain.
const KEYWORDS: &[&str] = &[
    "additionalProperties",
    "definitions",
    "discriminator",
    "elements",
    "enum",
    "mapping",
    "metadata",
    "nullable",
    "optionalProperties",
    "properties",
    "ref",
    "type",
    "values",
];

/// Parses and validates schema JSON text.
///
/// # Errors
///
/// Returns `SchemaError` if the text is not JSON or the document breaks any
/// rule of the schema language.
pub fn parse_schema(schema_json: &str) -> Result<Schema, SchemaError> {
    let value: Value = serde_json::from_str(schema_json).map_err(|error| {
        SchemaError::new(SchemaErrorKind::InvalidJson(error.to_string()), "")
    })?;
    parse_value(&value)
}

/// Parses and validates an already-decoded schema document.
///
/// # Errors
///
/// Returns `SchemaError` for the first rule the document breaks.
pub fn parse_value(value: &Value) -> Result<Schema, SchemaError> {
    let Value::Object(root) = value else {
        return Err(SchemaError::new(SchemaErrorKind::NotAnObject, ""));
    };

    let definition_values: Option<&Map<String, Value>> = match root.get("definitions") {
        None => None,
        Some(Value::Object(definitions)) => Some(definitions),
        Some(_) => return Err(invalid_type("definitions", "an object", "/definitions")),
    };
    let definition_names: BTreeSet<&str> = definition_values
        .map(|definitions| definitions.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let parser = Parser {
        definition_names: &definition_names,
    };
    let root_node: SchemaNode = parser.node(value, "", true)?;

    let mut definitions: BTreeMap<String, SchemaNode> = BTreeMap::new();
    if let Some(definition_values) = definition_values {
        for (name, definition) in sorted_entries(definition_values) {
            let pointer: String = json_pointer::descend("", &["definitions", name.as_str()]);
            definitions.insert(name.clone(), parser.node(definition, &pointer, false)?);
        }
    }

    let schema = Schema {
        root: root_node,
        definitions,
    };
    check_ref_cycles(&schema)?;
    Ok(schema)
}

struct Parser<'a> {
    definition_names: &'a BTreeSet<&'a str>,
}

/// The form keywords of one node, looked up once.
struct FormKeywords<'v> {
    r#ref: Option<&'v Value>,
    r#type: Option<&'v Value>,
    r#enum: Option<&'v Value>,
    elements: Option<&'v Value>,
    properties: Option<&'v Value>,
    optional_properties: Option<&'v Value>,
    additional_properties: Option<&'v Value>,
    values: Option<&'v Value>,
    discriminator: Option<&'v Value>,
    mapping: Option<&'v Value>,
}

impl<'v> FormKeywords<'v> {
    fn from_object(object: &'v Map<String, Value>) -> Self {
        Self {
            r#ref: object.get("ref"),
            r#type: object.get("type"),
            r#enum: object.get("enum"),
            elements: object.get("elements"),
            properties: object.get("properties"),
            optional_properties: object.get("optionalProperties"),
            additional_properties: object.get("additionalProperties"),
            values: object.get("values"),
            discriminator: object.get("discriminator"),
            mapping: object.get("mapping"),
        }
    }

    const fn has_properties_form(&self) -> bool {
        self.properties.is_some()
            || self.optional_properties.is_some()
            || self.additional_properties.is_some()
    }

    const fn has_discriminator_form(&self) -> bool {
        self.discriminator.is_some() || self.mapping.is_some()
    }

    /// Names of the forms whose keywords appear in the node.
    fn present_forms(&self) -> Vec<&'static str> {
        let candidates: [(&'static str, bool); 7] = [
            ("ref", self.r#ref.is_some()),
            ("type", self.r#type.is_some()),
            ("enum", self.r#enum.is_some()),
            ("elements", self.elements.is_some()),
            ("properties", self.has_properties_form()),
            ("values", self.values.is_some()),
            ("discriminator", self.has_discriminator_form()),
        ];
        candidates
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Parser<'_> {
    fn node(&self, value: &Value, pointer: &str, is_root: bool) -> Result<SchemaNode, SchemaError> {
        let Value::Object(object) = value else {
            return Err(SchemaError::new(SchemaErrorKind::NotAnObject, pointer));
        };

        for (key, _) in sorted_entries(object) {
            if !KEYWORDS.contains(&key.as_str()) {
                return Err(SchemaError::new(
                    SchemaErrorKind::UnknownKeyword(key.clone()),
                    json_pointer::child(pointer, key),
                ));
            }
            if key == "definitions" && !is_root {
                return Err(SchemaError::new(
                    SchemaErrorKind::NonRootDefinitions,
                    json_pointer::child(pointer, key),
                ));
            }
        }

        let metadata: Metadata = parse_metadata(object.get("metadata"), pointer)?;
        let nullable: bool = match object.get("nullable") {
            None => false,
            Some(Value::Bool(nullable)) => *nullable,
            Some(_) => {
                return Err(invalid_type(
                    "nullable",
                    "a boolean",
                    json_pointer::child(pointer, "nullable"),
                ));
            }
        };
        let form: Form = self.form(&FormKeywords::from_object(object), pointer)?;

        Ok(SchemaNode {
            metadata,
            nullable,
            form,
        })
    }

    fn form(&self, keywords: &FormKeywords<'_>, pointer: &str) -> Result<Form, SchemaError> {
        let present: Vec<&'static str> = keywords.present_forms();
        if present.len() > 1 {
            return Err(SchemaError::new(
                SchemaErrorKind::AmbiguousForm { forms: present },
                pointer,
            ));
        }

        if let Some(target) = keywords.r#ref {
            return self.ref_form(target, pointer);
        }
        if let Some(primitive) = keywords.r#type {
            return type_form(primitive, pointer);
        }
        if let Some(values) = keywords.r#enum {
            return enum_form(values, pointer);
        }
        if let Some(item) = keywords.elements {
            let item_pointer: String = json_pointer::child(pointer, "elements");
            return Ok(Form::Elements {
                item: Box::new(self.node(item, &item_pointer, false)?),
            });
        }
        if let Some(item) = keywords.values {
            let item_pointer: String = json_pointer::child(pointer, "values");
            return Ok(Form::Values {
                item: Box::new(self.node(item, &item_pointer, false)?),
            });
        }
        if keywords.has_properties_form() {
            return self.properties_form(keywords, pointer);
        }
        if keywords.has_discriminator_form() {
            return self.discriminator_form(keywords, pointer);
        }
        Ok(Form::Empty)
    }

    fn ref_form(&self, target: &Value, pointer: &str) -> Result<Form, SchemaError> {
        let ref_pointer: String = json_pointer::child(pointer, "ref");
        let Value::String(name) = target else {
            return Err(invalid_type("ref", "a string", ref_pointer));
        };
        if !self.definition_names.contains(name.as_str()) {
            return Err(SchemaError::new(
                SchemaErrorKind::UnresolvedRef(name.clone()),
                ref_pointer,
            ));
        }
        Ok(Form::Ref {
            definition: name.clone(),
        })
    }

    fn properties_form(
        &self,
        keywords: &FormKeywords<'_>,
        pointer: &str,
    ) -> Result<Form, SchemaError> {
        if keywords.properties.is_none() && keywords.optional_properties.is_none() {
            return Err(SchemaError::new(
                SchemaErrorKind::IncompleteForm {
                    keyword: "additionalProperties",
                    requires: "properties",
                },
                json_pointer::child(pointer, "additionalProperties"),
            ));
        }

        let required: BTreeMap<String, SchemaNode> =
            self.node_map(keywords.properties, pointer, "properties")?;
        let optional: BTreeMap<String, SchemaNode> =
            self.node_map(keywords.optional_properties, pointer, "optionalProperties")?;

        if let Some(name) = optional.keys().find(|name| required.contains_key(*name)) {
            return Err(SchemaError::new(
                SchemaErrorKind::OverlappingProperties(name.clone()),
                json_pointer::descend(pointer, &["optionalProperties", name.as_str()]),
            ));
        }

        let additional_properties: bool = match keywords.additional_properties {
            None => false,
            Some(Value::Bool(allowed)) => *allowed,
            Some(_) => {
                return Err(invalid_type(
                    "additionalProperties",
                    "a boolean",
                    json_pointer::child(pointer, "additionalProperties"),
                ));
            }
        };

        Ok(Form::Properties {
            required,
            optional,
            additional_properties,
        })
    }

    fn discriminator_form(
        &self,
        keywords: &FormKeywords<'_>,
        pointer: &str,
    ) -> Result<Form, SchemaError> {
        let Some(tag) = keywords.discriminator else {
            return Err(SchemaError::new(
                SchemaErrorKind::IncompleteForm {
                    keyword: "mapping",
                    requires: "discriminator",
                },
                json_pointer::child(pointer, "mapping"),
            ));
        };
        let Some(mapping) = keywords.mapping else {
            return Err(SchemaError::new(
                SchemaErrorKind::IncompleteForm {
                    keyword: "discriminator",
                    requires: "mapping",
                },
                json_pointer::child(pointer, "discriminator"),
            ));
        };

        let Value::String(tag) = tag else {
            return Err(invalid_type(
                "discriminator",
                "a string",
                json_pointer::child(pointer, "discriminator"),
            ));
        };
        let mapping_pointer: String = json_pointer::child(pointer, "mapping");
        let Value::Object(entries) = mapping else {
            return Err(invalid_type("mapping", "an object", mapping_pointer));
        };
        if entries.is_empty() {
            return Err(SchemaError::new(
                SchemaErrorKind::EmptyMapping,
                mapping_pointer,
            ));
        }

        let mut variants: BTreeMap<String, SchemaNode> = BTreeMap::new();
        for (tag_value, entry) in sorted_entries(entries) {
            let entry_pointer: String = json_pointer::child(&mapping_pointer, tag_value);
            let variant: SchemaNode = self.node(entry, &entry_pointer, false)?;

            let Form::Properties {
                required, optional, ..
            } = &variant.form
            else {
                return Err(SchemaError::new(
                    SchemaErrorKind::MappingNotProperties(tag_value.clone()),
                    entry_pointer,
                ));
            };
            if variant.nullable {
                return Err(SchemaError::new(
                    SchemaErrorKind::NullableMapping(tag_value.clone()),
                    json_pointer::child(&entry_pointer, "nullable"),
                ));
            }
            let redefined_in: Option<&str> = if required.contains_key(tag) {
                Some("properties")
            } else if optional.contains_key(tag) {
                Some("optionalProperties")
            } else {
                None
            };
            if let Some(keyword) = redefined_in {
                return Err(SchemaError::new(
                    SchemaErrorKind::MappingRedefinesDiscriminator {
                        tag_value: tag_value.clone(),
                        property: tag.clone(),
                    },
                    json_pointer::descend(&entry_pointer, &[keyword, tag.as_str()]),
                ));
            }

            variants.insert(tag_value.clone(), variant);
        }

        Ok(Form::Discriminator {
            tag: tag.clone(),
            mapping: variants,
        })
    }

    /// Parses the value of `properties` or `optionalProperties`.
    fn node_map(
        &self,
        value: Option<&Value>,
        pointer: &str,
        keyword: &str,
    ) -> Result<BTreeMap<String, SchemaNode>, SchemaError> {
        let Some(value) = value else {
            return Ok(BTreeMap::new());
        };
        let Value::Object(entries) = value else {
            return Err(invalid_type(
                keyword,
                "an object",
                json_pointer::child(pointer, keyword),
            ));
        };

        let mut nodes: BTreeMap<String, SchemaNode> = BTreeMap::new();
        for (name, entry) in sorted_entries(entries) {
            let entry_pointer: String = json_pointer::descend(pointer, &[keyword, name.as_str()]);
            nodes.insert(name.clone(), self.node(entry, &entry_pointer, false)?);
        }
        Ok(nodes)
    }
}

fn type_form(value: &Value, pointer: &str) -> Result<Form, SchemaError> {
    let type_pointer: String = json_pointer::child(pointer, "type");
    let Value::String(keyword) = value else {
        return Err(invalid_type("type", "a string", type_pointer));
    };
    PrimitiveType::from_keyword(keyword)
        .map(|primitive| Form::Type { primitive })
        .ok_or_else(|| {
            SchemaError::new(SchemaErrorKind::UnknownType(keyword.clone()), type_pointer)
        })
}

fn enum_form(value: &Value, pointer: &str) -> Result<Form, SchemaError> {
    let enum_pointer: String = json_pointer::child(pointer, "enum");
    let Value::Array(items) = value else {
        return Err(invalid_type("enum", "an array of strings", enum_pointer));
    };
    if items.is_empty() {
        return Err(SchemaError::new(SchemaErrorKind::EmptyEnum, enum_pointer));
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut values: Vec<String> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_pointer: String = json_pointer::element(&enum_pointer, index);
        let Value::String(raw) = item else {
            return Err(invalid_type("enum", "an array of strings", item_pointer));
        };
        if !seen.insert(raw.as_str()) {
            return Err(SchemaError::new(
                SchemaErrorKind::DuplicateEnumValue(raw.clone()),
                item_pointer,
            ));
        }
        values.push(raw.clone());
    }
    Ok(Form::Enum { values })
}

fn parse_metadata(value: Option<&Value>, pointer: &str) -> Result<Metadata, SchemaError> {
    let Some(value) = value else {
        return Ok(Metadata::default());
    };
    let metadata_pointer: String = json_pointer::child(pointer, "metadata");
    let Value::Object(entries) = value else {
        return Err(invalid_type("metadata", "an object", metadata_pointer));
    };

    let mut metadata = Metadata::default();
    for (key, entry) in sorted_entries(entries) {
        match key.as_str() {
            "description" => {
                let Value::String(description) = entry else {
                    return Err(invalid_type(
                        "description",
                        "a string",
                        json_pointer::child(&metadata_pointer, key),
                    ));
                };
                metadata.description = Some(description.clone());
            }
            "enumDescription" => {
                let descriptions_pointer: String = json_pointer::child(&metadata_pointer, key);
                let Value::Object(descriptions) = entry else {
                    return Err(invalid_type(
                        "enumDescription",
                        "an object of strings",
                        descriptions_pointer,
                    ));
                };
                for (enum_value, description) in sorted_entries(descriptions) {
                    let Value::String(description) = description else {
                        return Err(invalid_type(
                            "enumDescription",
                            "an object of strings",
                            json_pointer::child(&descriptions_pointer, enum_value),
                        ));
                    };
                    metadata
                        .enum_descriptions
                        .insert(enum_value.clone(), description.clone());
                }
            }
            _ => {
                metadata.extensions.insert(key.clone(), entry.clone());
            }
        }
    }
    Ok(metadata)
}

/// Rejects definitions that reach themselves through `ref` alone, e.g.
/// `{"a": {"ref": "b"}, "b": {"ref": "a"}}`; such a type has no base case.
fn check_ref_cycles(schema: &Schema) -> Result<(), SchemaError> {
    for name in schema.definitions.keys() {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut current: &str = name;
        while let Some(node) = schema.definition(current) {
            let Form::Ref { definition } = &node.form else {
                break;
            };
            if !visited.insert(current) {
                return Err(SchemaError::new(
                    SchemaErrorKind::CyclicRef(current.to_string()),
                    json_pointer::descend("", &["definitions", current]),
                ));
            }
            current = definition;
        }
    }
    Ok(())
}

fn sorted_entries(object: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<(&String, &Value)> = object.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries
}

fn invalid_type(keyword: &str, expected: &'static str, path: impl Into<String>) -> SchemaError {
    SchemaError::new(
        SchemaErrorKind::InvalidKeywordType {
            keyword: keyword.to_string(),
            expected,
        },
        path,
    )
}
