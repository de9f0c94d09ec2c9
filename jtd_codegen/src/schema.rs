//! In-memory model of a JSON Type Definition (RFC 8927) document.
//!
//! A [`Schema`] is only ever produced by [`crate::parse`], so every value of
//! these types satisfies the structural rules of the schema language: refs
//! resolve, enums are non-empty and distinct, discriminator mappings hold
//! properties-form nodes that do not redeclare the tag.
//!
//! Object-keyed collections use `BTreeMap` so that iteration order is the
//! sorted key order regardless of how the input document was written.

use std::collections::BTreeMap;

/// A parsed and validated schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub root: SchemaNode,
    pub definitions: BTreeMap<String, SchemaNode>,
}

impl Schema {
    /// Looks up a definition by the name used in `ref`.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }
}

/// A single schema node: one form plus the data every form may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub metadata: Metadata,
    pub nullable: bool,
    pub form: Form,
}

impl SchemaNode {
    /// Whether this node becomes an output definition of its own wherever it
    /// appears (struct, enum or discriminated union).
    #[must_use]
    pub const fn is_nameable(&self) -> bool {
        matches!(
            self.form,
            Form::Properties { .. } | Form::Enum { .. } | Form::Discriminator { .. }
        )
    }
}

/// The eight mutually exclusive schema forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    /// Accepts any JSON value.
    Empty,
    Ref {
        definition: String,
    },
    Type {
        primitive: PrimitiveType,
    },
    /// Allowed strings in document order. Never empty, never duplicated.
    Enum {
        values: Vec<String>,
    },
    Elements {
        item: Box<SchemaNode>,
    },
    Properties {
        required: BTreeMap<String, SchemaNode>,
        optional: BTreeMap<String, SchemaNode>,
        additional_properties: bool,
    },
    Values {
        item: Box<SchemaNode>,
    },
    Discriminator {
        tag: String,
        mapping: BTreeMap<String, SchemaNode>,
    },
}

/// Primitive types accepted by the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveType {
    Boolean,
    String,
    Timestamp,
    Float32,
    Float64,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
}

impl PrimitiveType {
    /// Parses the value of a `type` keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let primitive = match keyword {
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "timestamp" => Self::Timestamp,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "int8" => Self::Int8,
            "uint8" => Self::Uint8,
            "int16" => Self::Int16,
            "uint16" => Self::Uint16,
            "int32" => Self::Int32,
            "uint32" => Self::Uint32,
            _ => return None,
        };
        Some(primitive)
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Timestamp => "timestamp",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
        }
    }
}

/// The `metadata` object of a node.
///
/// `description` and `enumDescription` are understood by every target. All
/// other keys are kept verbatim in `extensions`; a target reads the hint keys
/// it owns (e.g. `rustType`) and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub description: Option<String>,
    pub enum_descriptions: BTreeMap<String, String>,
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl Metadata {
    /// The description, trimmed. Blank descriptions count as absent.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// The description of one enum value, trimmed.
    #[must_use]
    pub fn enum_description(&self, value: &str) -> Option<&str> {
        self.enum_descriptions
            .get(value)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
    }

    /// A target-specific hint such as `javaJacksonType`.
    #[must_use]
    pub fn hint(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(form: Form) -> SchemaNode {
        SchemaNode {
            metadata: Metadata::default(),
            nullable: false,
            form,
        }
    }

    #[test]
    fn primitive_keywords_round_trip() {
        for keyword in [
            "boolean",
            "string",
            "timestamp",
            "float32",
            "float64",
            "int8",
            "uint8",
            "int16",
            "uint16",
            "int32",
            "uint32",
        ] {
            let primitive = PrimitiveType::from_keyword(keyword).expect("known keyword");
            assert_eq!(primitive.keyword(), keyword);
        }
    }

    #[test]
    fn integer_widths_beyond_32_bits_are_not_types() {
        assert_eq!(PrimitiveType::from_keyword("int64"), None);
        assert_eq!(PrimitiveType::from_keyword("uint64"), None);
        assert_eq!(PrimitiveType::from_keyword("String"), None);
    }

    #[test]
    fn only_struct_enum_and_union_forms_are_nameable() {
        assert!(
            node(Form::Enum {
                values: vec!["a".to_string()]
            })
            .is_nameable()
        );
        assert!(
            node(Form::Properties {
                required: BTreeMap::new(),
                optional: BTreeMap::new(),
                additional_properties: false,
            })
            .is_nameable()
        );
        assert!(!node(Form::Empty).is_nameable());
        assert!(
            !node(Form::Elements {
                item: Box::new(node(Form::Empty))
            })
            .is_nameable()
        );
        assert!(
            !node(Form::Ref {
                definition: "x".to_string()
            })
            .is_nameable()
        );
    }

    #[test]
    fn blank_description_is_absent() {
        let metadata = Metadata {
            description: Some("   \n".to_string()),
            ..Metadata::default()
        };
        assert_eq!(metadata.description(), None);
    }

    #[test]
    fn description_is_trimmed() {
        let metadata = Metadata {
            description: Some("  A user.\n".to_string()),
            ..Metadata::default()
        };
        assert_eq!(metadata.description(), Some("A user."));
    }

    #[test]
    fn enum_description_lookup() {
        let mut enum_descriptions = BTreeMap::new();
        enum_descriptions.insert("ON".to_string(), "Switched on.".to_string());
        let metadata = Metadata {
            enum_descriptions,
            ..Metadata::default()
        };
        assert_eq!(metadata.enum_description("ON"), Some("Switched on."));
        assert_eq!(metadata.enum_description("OFF"), None);
    }
}
