//! The flat registry of output definitions built by [`crate::expand`].
//!
//! Definitions live in one arena indexed by [`DefId`]. Type references point
//! at definitions by id, never by value, so recursive schemas are plain
//! lookups. The registry is immutable once built and every target renders
//! from the same shared instance.

use crate::schema::{Metadata, PrimitiveType};
use std::collections::BTreeMap;

/// Index of a definition in its [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefId(pub(crate) usize);

impl DefId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// All output definitions of one generation pass, in registry order: the
/// root first, then every `definitions` entry by sorted name, then nested
/// definitions in depth-first pre-order.
#[derive(Debug, Clone)]
pub struct Registry {
    pub(crate) definitions: Vec<Definition>,
    pub(crate) named: BTreeMap<String, DefId>,
}

impl Registry {
    /// The definition generated for the schema root.
    #[must_use]
    pub const fn root(&self) -> DefId {
        DefId(0)
    }

    #[must_use]
    pub fn get(&self, id: DefId) -> &Definition {
        &self.definitions[id.0]
    }

    /// The definition generated for a `definitions` entry.
    #[must_use]
    pub fn definition_named(&self, name: &str) -> Option<DefId> {
        self.named.get(name).copied()
    }

    /// Every `definitions` entry by name, sorted.
    pub fn named(&self) -> impl Iterator<Item = (&str, DefId)> {
        self.named.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// A nameable unit of output: one struct, enum, union or value wrapper.
#[derive(Debug, Clone)]
pub struct Definition {
    pub id: DefId,
    /// Provisional name as raw path components, e.g. `["Root", "foo_bar"]`.
    pub path: Vec<String>,
    pub kind: DefinitionKind,
    pub metadata: Metadata,
    pub nullable: bool,
    /// The definition this one is nested in. `None` for top-level ones.
    pub owner: Option<DefId>,
    /// JSON Pointer to the schema node this definition came from.
    pub pointer: String,
}

#[derive(Debug, Clone)]
pub enum DefinitionKind {
    Struct {
        members: Vec<Member>,
        additional_properties: bool,
    },
    Enum {
        values: Vec<EnumValue>,
    },
    UnionBase {
        /// Wire name of the discriminator property.
        tag: String,
        /// One variant per mapping entry, sorted by tag value.
        variants: Vec<DefId>,
    },
    UnionVariant {
        parent: DefId,
        tag_value: String,
        members: Vec<Member>,
        additional_properties: bool,
    },
    /// Names a top-level schema whose form is not itself nameable.
    ValueWrapper { inner: TypeRef },
}

impl DefinitionKind {
    /// Struct-like members, empty for enums, unions and wrappers.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        match self {
            Self::Struct { members, .. } | Self::UnionVariant { members, .. } => members,
            Self::Enum { .. } | Self::UnionBase { .. } | Self::ValueWrapper { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub value: String,
    pub description: Option<String>,
}

/// One property of a struct or union variant.
#[derive(Debug, Clone)]
pub struct Member {
    /// The property name on the wire, never altered.
    pub json_name: String,
    pub type_ref: TypeRef,
    pub required: bool,
}

impl Member {
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.type_ref.metadata.description()
    }
}

/// A use of a type at some position in the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub nullable: bool,
    /// Metadata of the node at this position, where override hints live.
    pub metadata: Metadata,
    pub pointer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRefKind {
    Empty,
    Primitive(PrimitiveType),
    Elements(Box<TypeRef>),
    Values(Box<TypeRef>),
    Definition(DefId),
}

impl TypeRef {
    /// Calls `visit` for this reference and every reference nested in it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        if let TypeRefKind::Elements(item) | TypeRefKind::Values(item) = &self.kind {
            item.walk(visit);
        }
    }
}
