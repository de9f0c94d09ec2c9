//! Settings for JTD code generation.

use crate::target::Target;
use crate::target::go::GoTarget;
use crate::target::java::JavaJacksonTarget;
use crate::target::rust::RustTarget;
use crate::target::typescript::TypeScriptTarget;
use std::path::{Path, PathBuf};

/// Raw root name used when the caller has nothing better, e.g. no file name.
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Settings that control one generation run.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    /// Raw name of the root definition. Each target cases it with its own
    /// convention (`root` becomes `Root` for every current target).
    pub root_name: String,

    /// Targets to render, each into its own output directory.
    pub targets: Vec<TargetConfig>,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME)
    }
}

impl GenerateSettings {
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetConfig) -> Self {
        self.targets.push(target);
        self
    }
}

/// One target language and where its files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetConfig {
    JavaJackson { out_dir: PathBuf, package: String },
    Rust { out_dir: PathBuf },
    Go { out_dir: PathBuf, package: String },
    TypeScript { out_dir: PathBuf },
}

impl TargetConfig {
    /// Same identifier as [`Target::id`].
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::JavaJackson { .. } => "java-jackson",
            Self::Rust { .. } => "rust",
            Self::Go { .. } => "go",
            Self::TypeScript { .. } => "typescript",
        }
    }

    #[must_use]
    pub fn out_dir(&self) -> &Path {
        match self {
            Self::JavaJackson { out_dir, .. }
            | Self::Rust { out_dir }
            | Self::Go { out_dir, .. }
            | Self::TypeScript { out_dir } => out_dir,
        }
    }

    #[must_use]
    pub fn build(&self) -> Box<dyn Target> {
        match self {
            Self::JavaJackson { package, .. } => Box::new(JavaJacksonTarget::new(package.clone())),
            Self::Rust { .. } => Box::new(RustTarget),
            Self::Go { package, .. } => Box::new(GoTarget::new(package.clone())),
            Self::TypeScript { .. } => Box::new(TypeScriptTarget),
        }
    }
}
