//! Scratch workspace for compiler input and output.
//!
//! The workspace directory lives as long as its controller. Files inside it
//! live for a single compile: a [`ScratchFile`] removes its path when
//! dropped, whether or not the compile succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};

/// Filename the compilation unit is written to.
pub const INPUT_FILE: &str = "input.elm";

/// Filename the compiler is asked to write JavaScript to.
pub const OUTPUT_FILE: &str = "index.js";

/// Process-private directory owned by one controller.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchWorkspace {
    /// Create a fresh temporary directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("elm-kernel-")
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let path = dir.path().to_path_buf();

        tracing::debug!("Created scratch workspace at {}", path.display());

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Path of the workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reserve `name` inside the workspace without creating it.
    pub fn file(&self, name: &str) -> ScratchFile {
        ScratchFile {
            path: self.path.join(name),
        }
    }

    /// Whether the directory has not been released yet.
    pub fn is_open(&self) -> bool {
        self.dir.is_some()
    }

    /// Remove the directory now instead of waiting for drop.
    ///
    /// Calling this more than once is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(dir) = self.dir.take() {
            tracing::debug!("Removing scratch workspace {}", self.path.display());
            dir.close().map_err(|e| Error::io(&self.path, e))?;
        }
        Ok(())
    }
}

/// A path inside the scratch workspace that is deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents`, creating or truncating the file.
    pub fn write(&self, contents: &str) -> Result<()> {
        fs::write(&self.path, contents).map_err(|e| Error::io(&self.path, e))
    }

    /// Read the whole file as text.
    pub fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Err(Error::MissingOutput(self.path.clone()));
        }
        fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        // Missing files are fine: the compiler may never have written one.
        let _ = fs::remove_file(&self.path);
    }
}
