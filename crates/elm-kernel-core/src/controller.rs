//! Cell compiler controller.
//!
//! Each executed cell is appended to the pending buffer. When the cell just
//! appended starts with [`COMPILE_MARKER`](crate::cells::COMPILE_MARKER),
//! the whole buffer is compiled as one unit and the result is published to
//! the host:
//!
//! | outcome | displays | result |
//! |---------|----------|--------|
//! | success | container `<div>` + embed script | `Ok(ExecuteStatus::Ok)` |
//! | compile failure | `<pre>` with compiler output | `Ok(ExecuteStatus::Ok)` |
//! | infrastructure failure | `<pre>` with diagnostic | `Err(error)` |
//!
//! A compiler error is often the point of a teaching cell, so it is reported
//! as ordinary output. Infrastructure failures are both displayed and
//! returned, so the host can log them and reply with an error status.

use serde::{Deserialize, Serialize};

use crate::cells::PendingCells;
use crate::compiler::{CompileOutcome, ElmCompiler, ManifestStaging};
use crate::config::KernelConfig;
use crate::error::{Error, Result};
use crate::host::KernelHost;
use crate::render;
use crate::scratch::ScratchWorkspace;

/// Status reported back to the host for an execute request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteStatus {
    Ok,
    Error,
}

/// Accumulates cells and drives the compiler.
pub struct CellController {
    pending: PendingCells,
    compiler: ElmCompiler,
    workspace: ScratchWorkspace,
}

impl CellController {
    /// Create a controller with its own scratch workspace.
    pub fn new(config: KernelConfig) -> Result<Self> {
        Ok(Self {
            pending: PendingCells::new(),
            compiler: ElmCompiler::new(config),
            workspace: ScratchWorkspace::new()?,
        })
    }

    /// Handle one executed cell.
    pub fn execute(&mut self, host: &mut dyn KernelHost, code: &str) -> Result<ExecuteStatus> {
        self.pending.submit(code);

        if !self.pending.should_compile() {
            tracing::debug!("Buffered cell ({} pending)", self.pending.len());
            return Ok(ExecuteStatus::Ok);
        }

        let unit = self.pending.take_unit();
        tracing::debug!("Compile triggered for {} bytes", unit.len());
        self.compile(host, &unit)
    }

    /// Compile `unit` and publish the result.
    ///
    /// Clears anything still pending first, so a failed compile never
    /// leaks cells into the next one.
    pub fn compile(&mut self, host: &mut dyn KernelHost, unit: &str) -> Result<ExecuteStatus> {
        self.pending.clear();

        if !self.workspace.is_open() {
            let e = Error::Io {
                path: self.workspace.path().to_path_buf(),
                message: "scratch workspace has been released".to_string(),
            };
            return self.publish(host, CompileOutcome::InfrastructureFailure(e));
        }

        let staging = self.compiler.stage_manifest(&self.workspace);
        self.compile_staged(host, staging, unit)
    }

    /// Run the compiler once the manifest has been staged.
    ///
    /// A permission error on the manifest is shown to the user but does not
    /// stop the compile.
    fn compile_staged(
        &self,
        host: &mut dyn KernelHost,
        staging: Result<ManifestStaging>,
        unit: &str,
    ) -> Result<ExecuteStatus> {
        let outcome = match staging {
            Ok(staging) => {
                if let ManifestStaging::PermissionDenied { workspace } = staging {
                    host.publish_display(render::error_panel(&format!(
                        "Permission error: could not copy {} to {}",
                        self.compiler.config().manifest_name,
                        workspace.display()
                    )));
                }
                self.compiler.compile(&self.workspace, unit)
            }
            Err(e) => CompileOutcome::InfrastructureFailure(e),
        };

        self.publish(host, outcome)
    }

    fn publish(&self, host: &mut dyn KernelHost, outcome: CompileOutcome) -> Result<ExecuteStatus> {
        match outcome {
            CompileOutcome::Success(javascript) => {
                for display in render::success_displays(&javascript, host.execution_count()) {
                    host.publish_display(display);
                }
                Ok(ExecuteStatus::Ok)
            }
            CompileOutcome::CompileFailure(output) => {
                host.publish_display(render::error_panel(&output));
                Ok(ExecuteStatus::Ok)
            }
            CompileOutcome::InfrastructureFailure(e) => {
                tracing::error!("Compile failed: {}", e);
                host.publish_display(render::error_panel(&e.to_string()));
                Err(e)
            }
        }
    }

    /// Cells waiting for the next compile.
    pub fn pending(&self) -> &[String] {
        self.pending.cells()
    }

    /// Scratch workspace used for compiles.
    pub fn workspace(&self) -> &ScratchWorkspace {
        &self.workspace
    }

    pub fn config(&self) -> &KernelConfig {
        self.compiler.config()
    }

    /// Release the scratch workspace.
    ///
    /// Compiling after shutdown is an infrastructure failure.
    pub fn shutdown(&mut self) -> Result<()> {
        self.workspace.close()
    }

    /// Whether [`shutdown`](Self::shutdown) has released the workspace.
    pub fn is_shut_down(&self) -> bool {
        !self.workspace.is_open()
    }
}

impl std::fmt::Debug for CellController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellController")
            .field("pending", &self.pending.len())
            .field("workspace", &self.workspace.path())
            .finish()
    }
}
