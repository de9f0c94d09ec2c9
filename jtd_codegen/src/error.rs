//! Error types for parsing schemas and rendering targets.

use thiserror::Error;

/// A malformed or inconsistent schema. Always fatal: nothing is generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid schema at #{path}: {kind}")]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    /// JSON Pointer (RFC 6901) to the offending node or keyword.
    pub path: String,
}

impl SchemaError {
    #[must_use]
    pub fn new(kind: SchemaErrorKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// What exactly is wrong with a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    #[error("document is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("schema must be a JSON object")]
    NotAnObject,

    #[error("unknown keyword `{0}`")]
    UnknownKeyword(String),

    #[error("`definitions` is only allowed on the root schema")]
    NonRootDefinitions,

    #[error("`{keyword}` must be {expected}")]
    InvalidKeywordType {
        keyword: String,
        expected: &'static str,
    },

    #[error("keywords from more than one form are present: {}", .forms.join(", "))]
    AmbiguousForm { forms: Vec<&'static str> },

    #[error("`{keyword}` requires `{requires}`")]
    IncompleteForm {
        keyword: &'static str,
        requires: &'static str,
    },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("`enum` must contain at least one value")]
    EmptyEnum,

    #[error("duplicate enum value `{0}`")]
    DuplicateEnumValue(String),

    #[error("property `{0}` is both required and optional")]
    OverlappingProperties(String),

    #[error("`mapping` must contain at least one entry")]
    EmptyMapping,

    #[error("mapping entry `{0}` must be of the properties form")]
    MappingNotProperties(String),

    #[error("mapping entry `{0}` must not be nullable")]
    NullableMapping(String),

    #[error("mapping entry `{tag_value}` redefines discriminator property `{property}`")]
    MappingRedefinesDiscriminator { tag_value: String, property: String },

    #[error("`ref` to undefined definition `{0}`")]
    UnresolvedRef(String),

    #[error("definition `{0}` only ever refers to itself through `ref`")]
    CyclicRef(String),
}

/// A construct that a specific target cannot render. Fatal for that target
/// only; other targets in the same run still produce output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target} cannot render schema node at #{path}: {construct}")]
pub struct UnsupportedConstructError {
    pub target: &'static str,
    /// JSON Pointer to the schema node that could not be rendered.
    pub path: String,
    pub construct: String,
}

/// Top-level error for code generation operations.
#[derive(Debug, Error)]
pub enum JtdCodegenError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedConstructError),

    /// Reading a schema file or writing generated files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Formatting generated source text failed.
    #[error("failed to format generated code: {0}")]
    Format(#[from] std::fmt::Error),
}
