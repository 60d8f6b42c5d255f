//! Kernel configuration.

use std::path::{Path, PathBuf};

/// Default compiler executable.
pub const DEFAULT_COMPILER: &str = "elm-make";

/// Conventional project manifest filename.
pub const DEFAULT_MANIFEST: &str = "elm-package.json";

/// Configuration for a [`CellController`](crate::CellController).
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Compiler program name or path. Bare names are looked up in `PATH`.
    pub compiler: PathBuf,

    /// Directory searched for the project manifest.
    pub project_dir: PathBuf,

    /// Manifest filename inside `project_dir`.
    pub manifest_name: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from(DEFAULT_COMPILER),
            project_dir: PathBuf::from("."),
            manifest_name: DEFAULT_MANIFEST.to_string(),
        }
    }
}

impl KernelConfig {
    /// Use a different compiler executable.
    pub fn with_compiler(mut self, compiler: impl Into<PathBuf>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Look for the manifest in `dir` instead of the working directory.
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    /// Use a different manifest filename.
    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    /// Full path of the project manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join(&self.manifest_name)
    }

    /// Directory the manifest is read from.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}
