//! Expansion of a parsed [`Schema`] into a [`Registry`] of output definitions.
//!
//! Every properties, enum and discriminator node becomes a definition with a
//! provisional path name; everything else becomes an inline [`TypeRef`].
//! The root and each `definitions` entry always get a definition (a value
//! wrapper when their form is not nameable) so there is something to name
//! and to point `ref` at.

use crate::json_pointer;
use crate::registry::{
    DefId, Definition, DefinitionKind, EnumValue, Member, Registry, TypeRef, TypeRefKind,
};
use crate::schema::{Form, Schema, SchemaNode};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the definition registry for `schema`, naming the root `root_name`.
#[must_use]
pub fn expand(schema: &Schema, root_name: &str) -> Registry {
    let mut expander = Expander {
        schema,
        slots: Vec::new(),
        named: BTreeMap::new(),
    };

    // Top-level definitions claim the first ids so refs can point at them
    // before their bodies are expanded.
    let root: DefId = expander.reserve();
    let mut top_level: Vec<(DefId, &String, &SchemaNode)> = Vec::new();
    for (name, node) in &schema.definitions {
        let id: DefId = expander.reserve();
        expander.named.insert(name.clone(), id);
        top_level.push((id, name, node));
    }

    expander.top_level(root, root_name, &schema.root, String::new());
    for (id, name, node) in top_level {
        let pointer: String = json_pointer::descend("", &["definitions", name.as_str()]);
        expander.top_level(id, name, node, pointer);
    }

    let definitions: Vec<Definition> = expander.slots.into_iter().flatten().collect();
    debug!(
        definitions = definitions.len(),
        "expanded schema into output definitions"
    );
    Registry {
        definitions,
        named: expander.named,
    }
}

struct Expander<'a> {
    schema: &'a Schema,
    /// Reserved ids are filled once their definition is fully expanded.
    slots: Vec<Option<Definition>>,
    named: BTreeMap<String, DefId>,
}

impl Expander<'_> {
    fn reserve(&mut self) -> DefId {
        let id = DefId(self.slots.len());
        self.slots.push(None);
        id
    }

    fn fill(&mut self, definition: Definition) {
        let index: usize = definition.id.index();
        self.slots[index] = Some(definition);
    }

    fn top_level(&mut self, id: DefId, name: &str, node: &SchemaNode, pointer: String) {
        let path: Vec<String> = vec![name.to_string()];
        let kind: DefinitionKind = self.definition_kind(id, &path, node, &pointer);
        self.fill(Definition {
            id,
            path,
            kind,
            metadata: node.metadata.clone(),
            nullable: node.nullable,
            owner: None,
            pointer,
        });
    }

    fn nested(&mut self, owner: DefId, path: &[String], node: &SchemaNode, pointer: &str) -> DefId {
        let id: DefId = self.reserve();
        let kind: DefinitionKind = self.definition_kind(id, path, node, pointer);
        self.fill(Definition {
            id,
            path: path.to_vec(),
            kind,
            metadata: node.metadata.clone(),
            nullable: node.nullable,
            owner: Some(owner),
            pointer: pointer.to_string(),
        });
        id
    }

    fn definition_kind(
        &mut self,
        id: DefId,
        path: &[String],
        node: &SchemaNode,
        pointer: &str,
    ) -> DefinitionKind {
        match &node.form {
            Form::Enum { values } => DefinitionKind::Enum {
                values: values
                    .iter()
                    .map(|value| EnumValue {
                        value: value.clone(),
                        description: node.metadata.enum_description(value).map(str::to_string),
                    })
                    .collect(),
            },
            Form::Properties {
                required,
                optional,
                additional_properties,
            } => DefinitionKind::Struct {
                members: self.members(id, path, required, optional, pointer),
                additional_properties: *additional_properties,
            },
            Form::Discriminator { tag, mapping } => DefinitionKind::UnionBase {
                tag: tag.clone(),
                variants: self.variants(id, path, mapping, pointer),
            },
            Form::Empty
            | Form::Ref { .. }
            | Form::Type { .. }
            | Form::Elements { .. }
            | Form::Values { .. } => DefinitionKind::ValueWrapper {
                inner: self.type_ref(id, path, node, pointer),
            },
        }
    }

    fn variants(
        &mut self,
        base: DefId,
        path: &[String],
        mapping: &BTreeMap<String, SchemaNode>,
        pointer: &str,
    ) -> Vec<DefId> {
        let mut variants: Vec<DefId> = Vec::with_capacity(mapping.len());
        for (tag_value, variant) in mapping {
            let Form::Properties {
                required,
                optional,
                additional_properties,
            } = &variant.form
            else {
                continue;
            };

            let id: DefId = self.reserve();
            let mut variant_path: Vec<String> = path.to_vec();
            variant_path.push(tag_value.clone());
            let variant_pointer: String =
                json_pointer::descend(pointer, &["mapping", tag_value.as_str()]);
            let members: Vec<Member> =
                self.members(id, &variant_path, required, optional, &variant_pointer);

            self.fill(Definition {
                id,
                path: variant_path,
                kind: DefinitionKind::UnionVariant {
                    parent: base,
                    tag_value: tag_value.clone(),
                    members,
                    additional_properties: *additional_properties,
                },
                metadata: variant.metadata.clone(),
                nullable: false,
                owner: Some(base),
                pointer: variant_pointer,
            });
            variants.push(id);
        }
        variants
    }

    /// Members in sorted wire-name order, required and optional merged.
    fn members(
        &mut self,
        owner: DefId,
        path: &[String],
        required: &BTreeMap<String, SchemaNode>,
        optional: &BTreeMap<String, SchemaNode>,
        pointer: &str,
    ) -> Vec<Member> {
        let mut entries: Vec<(&String, &SchemaNode, bool)> = required
            .iter()
            .map(|(name, node)| (name, node, true))
            .chain(optional.iter().map(|(name, node)| (name, node, false)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut members: Vec<Member> = Vec::with_capacity(entries.len());
        for (name, node, is_required) in entries {
            let keyword: &str = if is_required {
                "properties"
            } else {
                "optionalProperties"
            };
            let mut member_path: Vec<String> = path.to_vec();
            member_path.push(name.clone());
            let member_pointer: String = json_pointer::descend(pointer, &[keyword, name.as_str()]);
            members.push(Member {
                json_name: name.clone(),
                type_ref: self.type_ref(owner, &member_path, node, &member_pointer),
                required: is_required,
            });
        }
        members
    }

    fn type_ref(
        &mut self,
        owner: DefId,
        path: &[String],
        node: &SchemaNode,
        pointer: &str,
    ) -> TypeRef {
        let mut nullable: bool = node.nullable;
        let kind: TypeRefKind = match &node.form {
            Form::Empty => TypeRefKind::Empty,
            Form::Type { primitive } => TypeRefKind::Primitive(*primitive),
            Form::Ref { definition } => {
                if let Some(target) = self.schema.definition(definition)
                    && target.is_nameable()
                    && target.nullable
                {
                    nullable = true;
                }
                // Refs always resolve in a parsed schema.
                self.named
                    .get(definition)
                    .map_or(TypeRefKind::Empty, |id| TypeRefKind::Definition(*id))
            }
            Form::Elements { item } => {
                let item_pointer: String = json_pointer::child(pointer, "elements");
                TypeRefKind::Elements(Box::new(self.type_ref(owner, path, item, &item_pointer)))
            }
            Form::Values { item } => {
                let item_pointer: String = json_pointer::child(pointer, "values");
                TypeRefKind::Values(Box::new(self.type_ref(owner, path, item, &item_pointer)))
            }
            Form::Enum { .. } | Form::Properties { .. } | Form::Discriminator { .. } => {
                TypeRefKind::Definition(self.nested(owner, path, node, pointer))
            }
        };

        TypeRef {
            kind,
            nullable,
            metadata: node.metadata.clone(),
            pointer: pointer.to_string(),
        }
    }
}
