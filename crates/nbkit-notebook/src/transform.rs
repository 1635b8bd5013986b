//! Whole-notebook transforms
//!
//! Each transform builds a new notebook and leaves its input untouched.

use crate::model::{Cell, MarkdownCell, Notebook};

/// Turn every code cell into a markdown cell with the same id, source and metadata
///
/// Execution counts and outputs are dropped.
#[must_use]
pub fn markdownize(notebook: &Notebook) -> Notebook {
    let cells = notebook
        .iter()
        .map(|cell| match cell {
            Cell::Markdown(_) => cell.clone(),
            Cell::Code(code) => Cell::Markdown(MarkdownCell {
                base: code.base.clone(),
            }),
        })
        .collect();
    Notebook::from_parts(notebook.version(), cells, notebook.metadata().clone())
}

/// Keep only the code cells
#[must_use]
pub fn remove_markdown_cells(notebook: &Notebook) -> Notebook {
    let cells = notebook.iter().filter(|cell| cell.is_code()).cloned().collect();
    Notebook::from_parts(notebook.version(), cells, notebook.metadata().clone())
}
