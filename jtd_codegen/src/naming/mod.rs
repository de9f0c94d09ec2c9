//! Resolution of provisional definition paths and wire names into final,
//! unique, keyword-safe identifiers for one target.
//!
//! Each identifier goes through three steps: casing (with initialisms),
//! a trailing `_` if the result is a keyword, and a numeric suffix if the
//! result is already taken in its scope. Definitions are visited in registry
//! order, so the suffixes a schema receives never depend on the key order
//! of the input document.

mod case;
mod namespace;

pub use case::{Capitalization, Case, split_words};
pub use namespace::Namespace;

use crate::registry::{DefId, DefinitionKind, Member, Registry};
use tracing::debug;

/// Per-target naming rules.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    pub type_case: Case,
    pub member_case: Case,
    pub constant_case: Case,
    pub keywords: &'static [&'static str],
    /// Lowercase words rendered fully upper-case in title position.
    pub initialisms: &'static [&'static str],
    pub constant_scope: ConstantScope,
    /// Type names the target needs for itself, e.g. generated helpers.
    pub reserved_type_names: &'static [&'static str],
}

/// Where enum constants live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantScope {
    /// Each enum is its own scope; constants are cased from the value alone.
    PerEnum,
    /// Constants share the type scope and are prefixed with the enum's type
    /// name, as with package-level constants.
    Global,
}

impl NamingConvention {
    /// The un-suffixed type name for a definition path.
    #[must_use]
    pub fn type_name(&self, path: &[String]) -> String {
        let words: Vec<String> = path.iter().flat_map(|part| split_words(part)).collect();
        self.identifier(self.type_case, words)
    }

    /// The un-suffixed member name for a wire name.
    #[must_use]
    pub fn member_name(&self, json_name: &str) -> String {
        self.identifier(self.member_case, split_words(json_name))
    }

    /// The un-suffixed enum constant name for a raw enum value.
    #[must_use]
    pub fn constant_name(&self, value: &str) -> String {
        self.identifier(self.constant_case, split_words(value))
    }

    fn identifier(&self, case: Case, mut words: Vec<String>) -> String {
        if words.is_empty() {
            words.push("empty".to_string());
        }
        if words
            .first()
            .is_some_and(|word| word.starts_with(|c: char| c.is_ascii_digit()))
        {
            words.insert(0, "n".to_string());
        }
        let identifier: String = case.apply(&words, self.initialisms);
        if self.keywords.contains(&identifier.as_str()) {
            format!("{identifier}_")
        } else {
            identifier
        }
    }
}

/// Final identifiers for one definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionNames {
    pub type_name: String,
    /// Structs and variants: one per member. Union bases: one per variant.
    pub members: Vec<String>,
    /// Enums: one per value. Union bases: one per variant.
    pub constants: Vec<String>,
    /// Union bases and variants: the member holding the discriminator tag.
    pub tag_member: Option<String>,
}

/// Final identifiers for every definition of a registry, for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    definitions: Vec<DefinitionNames>,
}

impl ResolvedNames {
    #[must_use]
    pub fn get(&self, id: DefId) -> &DefinitionNames {
        &self.definitions[id.index()]
    }

    #[must_use]
    pub fn type_name(&self, id: DefId) -> &str {
        &self.definitions[id.index()].type_name
    }
}

/// Resolves every identifier of `registry` under `convention`.
///
/// Type names are resolved first, all in one registry-wide scope, so that
/// member and constant resolution can never take a name a type needs.
#[must_use]
pub fn resolve(registry: &Registry, convention: &NamingConvention) -> ResolvedNames {
    let mut types = Namespace::default();
    for reserved in convention.reserved_type_names {
        types.reserve(reserved);
    }

    let mut definitions: Vec<DefinitionNames> = registry
        .iter()
        .map(|definition| DefinitionNames {
            type_name: claim(&mut types, &convention.type_name(&definition.path), "type"),
            ..DefinitionNames::default()
        })
        .collect();

    for definition in registry.iter() {
        let index: usize = definition.id.index();
        match &definition.kind {
            DefinitionKind::Struct { members, .. } => {
                definitions[index].members = resolve_members(convention, members, None);
            }
            DefinitionKind::UnionVariant {
                parent, members, ..
            } => {
                let tag_member: Option<String> = match &registry.get(*parent).kind {
                    DefinitionKind::UnionBase { tag, .. } => Some(convention.member_name(tag)),
                    _ => None,
                };
                definitions[index].members =
                    resolve_members(convention, members, tag_member.as_deref());
                definitions[index].tag_member = tag_member;
            }
            DefinitionKind::UnionBase { tag, variants } => {
                let mut member_scope = Namespace::default();
                let mut constant_scope = Namespace::default();
                let tag_member: String =
                    claim(&mut member_scope, &convention.member_name(tag), "member");

                let mut members: Vec<String> = Vec::with_capacity(variants.len());
                let mut constants: Vec<String> = Vec::with_capacity(variants.len());
                for variant in variants {
                    if let DefinitionKind::UnionVariant { tag_value, .. } =
                        &registry.get(*variant).kind
                    {
                        members.push(claim(
                            &mut member_scope,
                            &convention.member_name(tag_value),
                            "member",
                        ));
                        constants.push(claim(
                            &mut constant_scope,
                            &convention.constant_name(tag_value),
                            "constant",
                        ));
                    }
                }

                let names: &mut DefinitionNames = &mut definitions[index];
                names.tag_member = Some(tag_member);
                names.members = members;
                names.constants = constants;
            }
            DefinitionKind::Enum { values } => {
                let type_name: String = definitions[index].type_name.clone();
                let mut per_enum = Namespace::default();
                let constants: Vec<String> = values
                    .iter()
                    .map(|value| match convention.constant_scope {
                        ConstantScope::PerEnum => claim(
                            &mut per_enum,
                            &convention.constant_name(&value.value),
                            "constant",
                        ),
                        ConstantScope::Global => {
                            let words: Vec<String> = split_words(&type_name)
                                .into_iter()
                                .chain(split_words(&value.value))
                                .collect();
                            claim(
                                &mut types,
                                &convention.identifier(convention.type_case, words),
                                "constant",
                            )
                        }
                    })
                    .collect();
                definitions[index].constants = constants;
            }
            DefinitionKind::ValueWrapper { .. } => {}
        }
    }

    ResolvedNames { definitions }
}

/// Resolves member names in one definition's scope. `reserved` is claimed
/// first, e.g. the discriminator member a variant shares with its base.
fn resolve_members(
    convention: &NamingConvention,
    members: &[Member],
    reserved: Option<&str>,
) -> Vec<String> {
    let mut scope = Namespace::default();
    if let Some(reserved) = reserved {
        scope.reserve(reserved);
    }
    members
        .iter()
        .map(|member| claim(&mut scope, &convention.member_name(&member.json_name), "member"))
        .collect()
}

fn claim(namespace: &mut Namespace, base: &str, scope: &str) -> String {
    let resolved: String = namespace.claim(base);
    if resolved != base {
        debug!(scope, base, resolved = %resolved, "resolved identifier collision");
    }
    resolved
}
