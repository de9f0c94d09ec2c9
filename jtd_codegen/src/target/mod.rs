//! Target languages and the rendering helpers they share.
//!
//! A target owns its naming convention and its metadata hint keys. Rendering
//! happens entirely in memory; the caller decides whether to write files.

pub mod go;
pub mod java;
pub mod rust;
pub mod typescript;

use crate::error::{JtdCodegenError, UnsupportedConstructError};
use crate::json_pointer;
use crate::naming::{NamingConvention, ResolvedNames};
use crate::registry::{DefId, Definition, DefinitionKind, Registry, TypeRef, TypeRefKind};
use crate::schema::Metadata;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

/// First line of every generated file, as a comment in the target language.
pub(crate) const GENERATED_BY: &str = "Generated by jtd-codegen. Do not edit manually.";

/// Generated source text, with a path relative to the target's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

/// A language backend.
pub trait Target: Send + Sync {
    /// Stable identifier used in logs and error reports, e.g. `java-jackson`.
    fn id(&self) -> &'static str;

    fn naming(&self) -> &NamingConvention;

    /// Renders every definition of `registry` using the resolved `names`.
    ///
    /// # Errors
    ///
    /// Returns `JtdCodegenError::Unsupported` when a schema node has no valid
    /// rendering in this target.
    fn render(
        &self,
        registry: &Registry,
        names: &ResolvedNames,
    ) -> Result<Vec<OutputFile>, JtdCodegenError>;
}

/// Reads a string-valued hint such as `rustType` from node metadata.
pub(crate) fn string_hint<'m>(
    target: &'static str,
    metadata: &'m Metadata,
    key: &str,
    pointer: &str,
) -> Result<Option<&'m str>, UnsupportedConstructError> {
    match metadata.hint(key) {
        None => Ok(None),
        Some(serde_json::Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(UnsupportedConstructError {
            target,
            path: json_pointer::descend(pointer, &["metadata", key]),
            construct: format!("`{key}` must be a string"),
        }),
    }
}

/// Rejects a container hint on a node that is not `elements` or `values`.
pub(crate) fn check_container_hint(
    target: &'static str,
    type_ref: &TypeRef,
    key: &str,
) -> Result<Option<String>, UnsupportedConstructError> {
    let container: Option<&str> = string_hint(target, &type_ref.metadata, key, &type_ref.pointer)?;
    match (&type_ref.kind, container) {
        (_, None) => Ok(None),
        (TypeRefKind::Elements(_) | TypeRefKind::Values(_), Some(container)) => {
            Ok(Some(container.to_string()))
        }
        (_, Some(_)) => Err(UnsupportedConstructError {
            target,
            path: json_pointer::descend(&type_ref.pointer, &["metadata", key]),
            construct: format!("`{key}` on a node that is not `elements` or `values`"),
        }),
    }
}

/// Marks definitions replaced by a type override: those carrying `type_hint`
/// themselves and everything nested inside them. Indexed by `DefId`.
pub(crate) fn overridden_definitions(registry: &Registry, type_hint: &str) -> Vec<bool> {
    let mut overridden: Vec<bool> = vec![false; registry.len()];
    for definition in registry.iter() {
        let own: bool = definition.metadata.hint(type_hint).is_some();
        let inherited: bool = definition
            .owner
            .is_some_and(|owner| overridden[owner.index()]);
        overridden[definition.id.index()] = own || inherited;
    }
    overridden
}

/// Which definitions can reach which others while holding them by value
/// (not through a list or map). Targets without implicit indirection use
/// this to box or point at the references that close a cycle.
pub(crate) struct Recursion {
    reachable: Vec<BTreeSet<DefId>>,
}

impl Recursion {
    pub(crate) fn new(registry: &Registry) -> Self {
        let edges: Vec<Vec<DefId>> = registry.iter().map(by_value_edges).collect();
        let reachable: Vec<BTreeSet<DefId>> = (0..edges.len())
            .map(|start| {
                let mut seen: BTreeSet<DefId> = BTreeSet::new();
                let mut stack: Vec<DefId> = edges[start].clone();
                while let Some(next) = stack.pop() {
                    if seen.insert(next) {
                        stack.extend(edges[next.index()].iter().copied());
                    }
                }
                seen
            })
            .collect();
        Self { reachable }
    }

    /// Whether `from` holding `to` by value would make `from` infinitely large.
    pub(crate) fn needs_indirection(&self, from: DefId, to: DefId) -> bool {
        from == to || self.reachable[to.index()].contains(&from)
    }
}

fn by_value_edges(definition: &Definition) -> Vec<DefId> {
    let direct = |type_ref: &TypeRef| match type_ref.kind {
        TypeRefKind::Definition(id) => Some(id),
        _ => None,
    };
    match &definition.kind {
        DefinitionKind::Struct { members, .. } | DefinitionKind::UnionVariant { members, .. } => {
            members.iter().filter_map(|m| direct(&m.type_ref)).collect()
        }
        DefinitionKind::UnionBase { variants, .. } => variants.clone(),
        DefinitionKind::ValueWrapper { inner } => direct(inner).into_iter().collect(),
        DefinitionKind::Enum { .. } => Vec::new(),
    }
}

/// Writes `description` as line comments, wrapped to fit 80 columns.
///
/// `prefix` is the indentation plus comment marker, e.g. `"    /// "`.
pub(crate) fn write_wrapped_comment(
    out: &mut String,
    prefix: &str,
    description: Option<&str>,
) -> std::fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };
    for line in wrap_description(description, prefix.len()) {
        if line.is_empty() {
            writeln!(out, "{}", prefix.trim_end())?;
        } else {
            writeln!(out, "{prefix}{line}")?;
        }
    }
    Ok(())
}

/// Writes `description` as a `/** ... */` block, wrapped to fit 80 columns.
/// Any `*/` in the text is replaced by `escaped_close`.
pub(crate) fn write_doc_block(
    out: &mut String,
    indent: &str,
    description: Option<&str>,
    escaped_close: &str,
) -> std::fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };
    writeln!(out, "{indent}/**")?;
    let escaped: String = description.replace("*/", escaped_close);
    write_wrapped_comment(out, &format!("{indent} * "), Some(&escaped))?;
    writeln!(out, "{indent} */")
}

/// Splits a description into lines at most `80 - indent` columns wide.
/// Paragraph breaks in the description are kept as empty lines.
pub(crate) fn wrap_description(description: &str, indent: usize) -> Vec<String> {
    let width: usize = 80usize.saturating_sub(indent).max(20);
    let mut lines: Vec<String> = Vec::new();
    for paragraph in description.trim().lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(
            textwrap::wrap(paragraph.trim_end(), width)
                .into_iter()
                .map(std::borrow::Cow::into_owned),
        );
    }
    lines
}
