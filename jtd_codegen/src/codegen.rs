//! The generation pipeline: parse, expand, then resolve names and render
//! every target in parallel against the same registry.
//!
//! Rendering never touches the file system. Files are written afterwards,
//! and only for targets that rendered without error.

use crate::error::{JtdCodegenError, SchemaError};
use crate::expand::expand;
use crate::naming::{ResolvedNames, resolve};
use crate::parse::parse_schema;
use crate::registry::Registry;
use crate::schema::Schema;
use crate::settings::GenerateSettings;
use crate::target::rust::{self, RustTarget};
use crate::target::{OutputFile, Target};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Type names a target chose for the schema's named parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodegenInfo {
    /// Type the root schema was rendered as.
    pub root_name: String,
    /// Type each `definitions` entry was rendered as, by definition name.
    pub definition_names: BTreeMap<String, String>,
}

impl CodegenInfo {
    fn new(registry: &Registry, names: &ResolvedNames) -> Self {
        Self {
            root_name: names.type_name(registry.root()).to_string(),
            definition_names: registry
                .named()
                .map(|(name, id)| (name.to_string(), names.type_name(id).to_string()))
                .collect(),
        }
    }
}

/// A target's output held in memory.
#[derive(Debug, Clone)]
pub struct RenderedFiles {
    pub files: Vec<OutputFile>,
    pub info: CodegenInfo,
}

/// The in-memory result of rendering one configured target.
#[derive(Debug)]
pub struct RenderedTarget {
    pub target: &'static str,
    pub out_dir: PathBuf,
    pub outcome: Result<RenderedFiles, JtdCodegenError>,
}

/// What one configured target left on disk.
#[derive(Debug)]
pub struct TargetReport {
    pub target: &'static str,
    pub out_dir: PathBuf,
    pub outcome: Result<WrittenFiles, JtdCodegenError>,
}

#[derive(Debug, Clone)]
pub struct WrittenFiles {
    /// Paths of the written files, including the output directory.
    pub paths: Vec<PathBuf>,
    pub info: CodegenInfo,
}

/// Resolves names for `target` and renders `registry` with them.
///
/// # Errors
///
/// Returns the target's rendering error, if any.
pub fn render_target(
    target: &dyn Target,
    registry: &Registry,
) -> Result<RenderedFiles, JtdCodegenError> {
    let names: ResolvedNames = resolve(registry, target.naming());
    let files: Vec<OutputFile> = target.render(registry, &names)?;
    debug!(backend = target.id(), files = files.len(), "rendered target");
    Ok(RenderedFiles {
        files,
        info: CodegenInfo::new(registry, &names),
    })
}

/// Parses `schema_json` and renders every configured target in memory.
///
/// # Errors
///
/// Returns `SchemaError` if the schema is invalid. A target that cannot
/// render the schema reports its error in its own [`RenderedTarget`]; the
/// other targets are unaffected.
pub fn render(
    schema_json: &str,
    settings: &GenerateSettings,
) -> Result<Vec<RenderedTarget>, SchemaError> {
    let schema: Schema = parse_schema(schema_json)?;
    let registry: Registry = expand(&schema, &settings.root_name);
    info!(
        definitions = registry.len(),
        targets = settings.targets.len(),
        "rendering targets"
    );

    Ok(settings
        .targets
        .par_iter()
        .map(|config| {
            let target: Box<dyn Target> = config.build();
            let outcome: Result<RenderedFiles, JtdCodegenError> =
                render_target(target.as_ref(), &registry);
            if let Err(error) = &outcome {
                warn!(backend = config.id(), %error, "target failed to render");
            }
            RenderedTarget {
                target: config.id(),
                out_dir: config.out_dir().to_path_buf(),
                outcome,
            }
        })
        .collect())
}

/// Renders every configured target, then writes the files of each target
/// that rendered successfully under its output directory.
///
/// # Errors
///
/// Returns `SchemaError` if the schema is invalid. Rendering and I/O
/// failures are reported per target.
pub fn generate(
    schema_json: &str,
    settings: &GenerateSettings,
) -> Result<Vec<TargetReport>, SchemaError> {
    let rendered: Vec<RenderedTarget> = render(schema_json, settings)?;
    Ok(rendered.into_iter().map(write_target).collect())
}

/// Reads a schema file and runs [`generate`] on it.
///
/// # Errors
///
/// Returns `JtdCodegenError::Io` if the file cannot be read and
/// `JtdCodegenError::Schema` if its contents are not a valid schema.
pub fn generate_from_file(
    input_path: impl AsRef<Path>,
    settings: &GenerateSettings,
) -> Result<Vec<TargetReport>, JtdCodegenError> {
    let schema_json: String = std::fs::read_to_string(input_path)?;
    Ok(generate(&schema_json, settings)?)
}

fn write_target(rendered: RenderedTarget) -> TargetReport {
    let RenderedTarget {
        target,
        out_dir,
        outcome,
    } = rendered;
    let outcome: Result<WrittenFiles, JtdCodegenError> =
        outcome.and_then(|rendered| write_files(&out_dir, rendered));
    if let Err(error) = &outcome {
        warn!(backend = target, %error, "target produced no files");
    }
    TargetReport {
        target,
        out_dir,
        outcome,
    }
}

/// Writes every rendered file under `out_dir`. If any write fails, files
/// already written by this call are removed so a target is never left half
/// written.
fn write_files(out_dir: &Path, rendered: RenderedFiles) -> Result<WrittenFiles, JtdCodegenError> {
    std::fs::create_dir_all(out_dir)?;
    let mut paths: Vec<PathBuf> = Vec::with_capacity(rendered.files.len());
    for file in rendered.files {
        let path: PathBuf = out_dir.join(&file.path);
        if let Err(error) = std::fs::write(&path, file.contents) {
            remove_written(&paths);
            return Err(error.into());
        }
        debug!(path = %path.display(), "wrote generated file");
        paths.push(path);
    }
    Ok(WrittenFiles {
        paths,
        info: rendered.info,
    })
}

fn remove_written(paths: &[PathBuf]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed partially written output"),
            Err(error) => warn!(path = %path.display(), %error, "could not remove generated file"),
        }
    }
}

/// Renders a schema as Rust items without a file header, for splicing into
/// an existing module.
///
/// # Errors
///
/// Returns `JtdCodegenError` if the schema is invalid or a `rust*` hint is
/// malformed.
pub fn generate_rust_items(schema_json: &str, root_name: &str) -> Result<String, JtdCodegenError> {
    let schema: Schema = parse_schema(schema_json)?;
    let registry: Registry = expand(&schema, root_name);
    let names: ResolvedNames = resolve(&registry, &rust::NAMING);
    RustTarget::render_items(&registry, &names)
}

/// Renders a schema as a Rust module and writes it to `writer`.
///
/// The writer can be any type implementing `Write`, such as `File`, `Vec<u8>`
/// or `Cursor<Vec<u8>>`.
///
/// # Errors
///
/// Returns `JtdCodegenError` if the schema is invalid, a `rust*` hint is
/// malformed, or writing to the writer fails.
pub fn generate_rust_to_writer<W: Write>(
    schema_json: &str,
    root_name: &str,
    writer: &mut W,
) -> Result<(), JtdCodegenError> {
    let schema: Schema = parse_schema(schema_json)?;
    let registry: Registry = expand(&schema, root_name);
    let rendered: RenderedFiles = render_target(&RustTarget, &registry)?;
    for file in rendered.files {
        writer.write_all(file.contents.as_bytes())?;
    }
    Ok(())
}
