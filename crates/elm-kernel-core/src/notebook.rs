//! Jupyter notebook (.ipynb) execution.
//!
//! Feeds the code cells of a notebook through a [`CellController`] in
//! order, the way a front-end would, and attaches the resulting displays to
//! the cell that triggered them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::controller::CellController;
use crate::error::{Error, Result};
use crate::host::RecordingHost;
use crate::render::DisplayData;

/// A Jupyter notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Notebook metadata, passed through untouched
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// Format version (always 4)
    pub nbformat: u32,

    /// Minor format version
    pub nbformat_minor: u32,

    /// Notebook cells
    pub cells: Vec<NotebookCell>,
}

/// Cell source, stored either as one string or as a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Text(String),
    Lines(Vec<String>),
}

impl MultilineText {
    /// Source as a single string.
    pub fn joined(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

/// A notebook cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "snake_case")]
pub enum NotebookCell {
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        metadata: serde_json::Value,
        source: MultilineText,
        execution_count: Option<u32>,
        #[serde(default)]
        outputs: Vec<CellOutput>,
    },
    Markdown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        metadata: serde_json::Value,
        source: MultilineText,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attachments: Option<serde_json::Value>,
    },
    Raw {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        metadata: serde_json::Value,
        source: MultilineText,
    },
}

impl NotebookCell {
    /// Code cell with no outputs.
    pub fn code(source: impl Into<String>) -> Self {
        Self::Code {
            id: None,
            metadata: serde_json::json!({}),
            source: MultilineText::Text(source.into()),
            execution_count: None,
            outputs: Vec::new(),
        }
    }

    /// Markdown cell.
    pub fn markdown(source: impl Into<String>) -> Self {
        Self::Markdown {
            id: None,
            metadata: serde_json::json!({}),
            source: MultilineText::Text(source.into()),
            attachments: None,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }

    /// Outputs of a code cell, empty for other cell types.
    pub fn outputs(&self) -> &[CellOutput] {
        match self {
            Self::Code { outputs, .. } => outputs,
            _ => &[],
        }
    }
}

/// Cell output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum CellOutput {
    /// Standard output/error
    Stream {
        name: String,
        text: MultilineText,
    },

    /// Rich result of an expression
    ExecuteResult {
        execution_count: Option<u32>,
        data: serde_json::Value,
        #[serde(default)]
        metadata: serde_json::Value,
    },

    /// Display data
    DisplayData {
        data: serde_json::Value,
        #[serde(default)]
        metadata: serde_json::Value,
    },

    /// Error output
    Error {
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
}

impl From<DisplayData> for CellOutput {
    fn from(display: DisplayData) -> Self {
        Self::DisplayData {
            // MimeBundle only holds strings, so this cannot fail.
            data: serde_json::to_value(display.data).unwrap_or_default(),
            metadata: display.metadata,
        }
    }
}

impl Notebook {
    /// Empty nbformat 4.5 notebook.
    pub fn new() -> Self {
        Self {
            metadata: serde_json::json!({}),
            nbformat: 4,
            nbformat_minor: 5,
            cells: Vec::new(),
        }
    }

    /// Read a notebook from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let notebook: Self = serde_json::from_str(&json)
            .map_err(|e| Error::Notebook(format!("{}: {}", path.display(), e)))?;

        if notebook.nbformat != 4 {
            return Err(Error::Notebook(format!(
                "{}: unsupported nbformat {}",
                path.display(),
                notebook.nbformat
            )));
        }

        Ok(notebook)
    }

    /// Write the notebook to disk.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    pub fn code_cells(&self) -> impl Iterator<Item = &NotebookCell> {
        self.cells.iter().filter(|c| c.is_code())
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a notebook run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Code cells submitted to the controller.
    pub cells_executed: usize,
    /// Cells that triggered a compile.
    pub compiles: usize,
    /// Displays attached to cells.
    pub displays: usize,
    /// Infrastructure failure that stopped the run.
    pub failure: Option<Error>,
}

/// Execute every code cell of `notebook` in order.
///
/// Each code cell gets the next execution count, starting at 1, and its
/// outputs are replaced by the displays it produced. The run stops at the
/// first infrastructure failure; cells after it keep their old contents.
pub fn execute_notebook(controller: &mut CellController, notebook: &mut Notebook) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut execution_count = 0;

    for cell in &mut notebook.cells {
        let NotebookCell::Code {
            source,
            execution_count: cell_count,
            outputs,
            ..
        } = cell
        else {
            continue;
        };

        execution_count += 1;
        let mut host = RecordingHost::new(execution_count);
        let result = controller.execute(&mut host, &source.joined());

        summary.cells_executed += 1;
        if controller.pending().is_empty() {
            summary.compiles += 1;
        }

        *cell_count = Some(execution_count);
        *outputs = host.take_displays().into_iter().map(CellOutput::from).collect();
        summary.displays += outputs.len();

        if let Err(e) = result {
            tracing::error!("Stopping at cell {}: {}", execution_count, e);
            summary.failure = Some(e);
            break;
        }
    }

    summary
}
