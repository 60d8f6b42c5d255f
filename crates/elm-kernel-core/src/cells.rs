//! Pending cell buffer and compile trigger.
//!
//! Cells are accumulated until one of them starts with the trigger marker.
//! Only the most recently submitted cell is inspected, so a user can either
//! type a marker-only cell to compile everything so far, or put the marker
//! on top of the code in the same cell.

/// First line that requests compilation of everything accumulated so far.
pub const COMPILE_MARKER: &str = "-- compile-code";

/// Ordered buffer of cell sources submitted since the last compile.
#[derive(Debug, Default, Clone)]
pub struct PendingCells {
    cells: Vec<String>,
}

impl PendingCells {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell's source text.
    pub fn submit(&mut self, cell: impl Into<String>) {
        self.cells.push(cell.into());
    }

    /// Whether the last submitted cell carries the compile marker.
    ///
    /// # Panics
    /// Panics if nothing has been submitted. Callers always submit before
    /// asking.
    pub fn should_compile(&self) -> bool {
        let last = self
            .cells
            .last()
            .expect("should not be querying for compilation with no code");

        first_line(last) == Some(COMPILE_MARKER)
    }

    /// Join all pending cells into one compilation unit and clear the buffer.
    pub fn take_unit(&mut self) -> String {
        let unit = self.cells.join("\n");
        self.cells.clear();
        unit
    }

    /// Drop everything pending without building a unit.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Pending cell sources, oldest first.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Text up to the first `\n`, or `None` for an empty cell.
fn first_line(text: &str) -> Option<&str> {
    if text.is_empty() {
        return None;
    }
    Some(text.split_once('\n').map_or(text, |(line, _)| line))
}
