//! Core engine for the Elm notebook kernel.
//!
//! This crate provides:
//! - Cell accumulation and the compile trigger
//! - Compiler invocation inside a scratch workspace
//! - Rendering of compile results as display messages
//! - The [`KernelHost`] seam to the hosting runtime
//! - Headless execution of `.ipynb` notebooks

pub mod cells;
pub mod compiler;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod info;
pub mod notebook;
pub mod render;
pub mod scratch;

pub use cells::{COMPILE_MARKER, PendingCells};
pub use compiler::{CompileOutcome, ElmCompiler, ManifestStaging};
pub use config::KernelConfig;
pub use controller::{CellController, ExecuteStatus};
pub use error::{Error, Result};
pub use host::{KernelHost, RecordingHost};
pub use info::{KernelInfo, LanguageInfo};
pub use notebook::{CellOutput, Notebook, NotebookCell, RunSummary, execute_notebook};
pub use render::{DisplayData, MimeBundle};
pub use scratch::{ScratchFile, ScratchWorkspace};
