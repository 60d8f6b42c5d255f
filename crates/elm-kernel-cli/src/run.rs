//! Run command implementation.
//!
//! Executes the code cells of a notebook in order, compiling whenever a
//! cell carries the compile marker.

use std::path::Path;
use std::time::Instant;

use elm_kernel_core::{CellController, KernelConfig, Notebook, execute_notebook};

use crate::colors;

/// Execute a notebook.
pub fn execute(
    notebook_path: &Path,
    output: Option<&Path>,
    config: KernelConfig,
) -> anyhow::Result<()> {
    if !notebook_path.exists() {
        anyhow::bail!("Notebook not found: {}", notebook_path.display());
    }

    let start = Instant::now();
    let mut notebook = Notebook::from_file(notebook_path)?;

    println!(
        "\n{}Running{} {}",
        colors::BOLD,
        colors::RESET,
        notebook_path.display()
    );
    println!("{}", "─".repeat(50));

    if notebook.code_cells().next().is_none() {
        println!("{}No code cells found in notebook.{}", colors::YELLOW, colors::RESET);
        return Ok(());
    }

    let mut controller = CellController::new(config)?;
    let summary = execute_notebook(&mut controller, &mut notebook);
    controller.shutdown()?;

    if let Some(path) = output {
        notebook.write_to_file(path)?;
        println!("{}  ◆ Wrote:{} {}", colors::CYAN, colors::RESET, path.display());
    }

    if let Some(e) = summary.failure {
        println!("{}Failed{} after {} cells", colors::RED, colors::RESET, summary.cells_executed);
        return Err(e.into());
    }

    if !controller.pending().is_empty() {
        println!(
            "{}{} trailing cells were never compiled (no `{}` cell after them){}",
            colors::YELLOW,
            controller.pending().len(),
            elm_kernel_core::COMPILE_MARKER,
            colors::RESET
        );
    }

    println!(
        "{}Completed{} {} cells, {} compiles, {} displays in {:.2}s",
        colors::GREEN,
        colors::RESET,
        summary.cells_executed,
        summary.compiles,
        summary.displays,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
