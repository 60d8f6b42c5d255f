//! External compiler invocation.
//!
//! Runs `elm-make <input> --yes --output=<output>` inside the scratch
//! workspace and classifies the result.

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::config::KernelConfig;
use crate::error::{Error, Result};
use crate::scratch::{INPUT_FILE, OUTPUT_FILE, ScratchWorkspace};

/// Result of one triggered compile.
#[derive(Debug)]
pub enum CompileOutcome {
    /// Compiler exited zero; holds the generated JavaScript.
    Success(String),

    /// Compiler ran and exited non-zero; holds its combined output.
    CompileFailure(String),

    /// The compile could not be carried out.
    InfrastructureFailure(Error),
}

/// What happened when staging the project manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestStaging {
    /// No manifest in the project directory.
    Absent,
    /// Manifest copied into the workspace.
    Copied(PathBuf),
    /// Manifest exists but copying it was not permitted.
    PermissionDenied { workspace: PathBuf },
}

/// Compiler exit status plus everything it wrote to stdout and stderr.
#[derive(Debug)]
struct CompilerRun {
    status: ExitStatus,
    output: String,
}

/// Invokes the Elm compiler for a [`CellController`](crate::CellController).
#[derive(Debug, Clone)]
pub struct ElmCompiler {
    config: KernelConfig,
}

impl ElmCompiler {
    pub fn new(config: KernelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Copy the project manifest into `workspace` if there is one.
    pub fn stage_manifest(&self, workspace: &ScratchWorkspace) -> Result<ManifestStaging> {
        let manifest = self.config.manifest_path();
        if !manifest.is_file() {
            return Ok(ManifestStaging::Absent);
        }

        let target = workspace.path().join(&self.config.manifest_name);
        let copied = fs::copy(&manifest, &target).map(|_| ());
        classify_copy(manifest, target, workspace.path(), copied)
    }

    /// Compile `unit` inside `workspace`.
    ///
    /// Input and output files are removed before this returns.
    pub fn compile(&self, workspace: &ScratchWorkspace, unit: &str) -> CompileOutcome {
        let input = workspace.file(INPUT_FILE);
        let output = workspace.file(OUTPUT_FILE);

        let run = input
            .write(unit)
            .and_then(|()| self.run(workspace.path(), input.path(), output.path()));

        match run {
            Ok(run) if run.status.success() => match output.read() {
                Ok(javascript) => {
                    tracing::info!("Compiled {} bytes of JavaScript", javascript.len());
                    CompileOutcome::Success(javascript)
                }
                Err(e) => CompileOutcome::InfrastructureFailure(e),
            },
            Ok(run) => {
                tracing::info!("Compiler exited with {}", run.status);
                CompileOutcome::CompileFailure(run.output)
            }
            Err(e) => CompileOutcome::InfrastructureFailure(e),
        }
    }

    /// Resolve the compiler executable.
    pub fn program(&self) -> Result<PathBuf> {
        which::which(&self.config.compiler).map_err(|e| {
            Error::CompilerNotFound(format!("{}: {}", self.config.compiler.display(), e))
        })
    }

    fn run(&self, cwd: &Path, input: &Path, output: &Path) -> Result<CompilerRun> {
        let program = self.program()?;
        let launch_error = |e: std::io::Error| Error::CompilerLaunch {
            program: program.display().to_string(),
            message: e.to_string(),
        };

        tracing::info!("Running {} on {}", program.display(), input.display());

        let (mut reader, writer) = std::io::pipe().map_err(launch_error)?;

        // The command owns both write ends; it must be dropped before
        // reading or the pipe never reaches EOF.
        let mut child = {
            let mut command = Command::new(&program);
            command
                .arg(input)
                .arg("--yes")
                .arg(format!("--output={}", output.display()))
                .current_dir(cwd)
                .stdin(Stdio::null())
                .stdout(writer.try_clone().map_err(launch_error)?)
                .stderr(writer);
            command.spawn().map_err(launch_error)?
        };

        let mut captured = Vec::new();
        let read = reader.read_to_end(&mut captured);
        let status = child.wait().map_err(launch_error)?;
        read.map_err(launch_error)?;

        Ok(CompilerRun {
            status,
            output: String::from_utf8_lossy(&captured).into_owned(),
        })
    }
}

/// Map the result of copying the manifest onto a [`ManifestStaging`].
///
/// Only a permission error lets the compile go ahead without the manifest.
fn classify_copy(
    manifest: PathBuf,
    target: PathBuf,
    workspace: &Path,
    copied: std::io::Result<()>,
) -> Result<ManifestStaging> {
    match copied {
        Ok(()) => {
            tracing::debug!("Staged {} into {}", manifest.display(), target.display());
            Ok(ManifestStaging::Copied(target))
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            tracing::warn!(
                "Permission denied copying {} to {}",
                manifest.display(),
                workspace.display()
            );
            Ok(ManifestStaging::PermissionDenied {
                workspace: workspace.to_path_buf(),
            })
        }
        Err(e) => Err(Error::Manifest {
            path: manifest,
            message: e.to_string(),
        }),
    }
}
