//! Generate Java, Rust, Go and TypeScript types from JSON Type Definition
//! (RFC 8927) schemas.
//!
//! A schema goes through four stages: [`parse`] validates it, [`expand`]
//! turns it into a [`registry::Registry`] of output definitions, [`naming`]
//! resolves collision-free identifiers per target, and each
//! [`target::Target`] renders the registry into source files.

mod codegen;
mod error;
mod settings;

pub mod expand;
pub mod json_pointer;
pub mod naming;
pub mod parse;
pub mod registry;
pub mod schema;
pub mod target;

pub use codegen::{
    CodegenInfo, RenderedFiles, RenderedTarget, TargetReport, WrittenFiles, generate,
    generate_from_file, generate_rust_items, generate_rust_to_writer, render, render_target,
};
pub use error::{JtdCodegenError, SchemaError, SchemaErrorKind, UnsupportedConstructError};
pub use settings::{DEFAULT_ROOT_NAME, GenerateSettings, TargetConfig};
