//! The notebook container

use crate::error::{NotebookError, Result};
use crate::model::cell::{Cell, CodeCell, MarkdownCell};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// nbformat version as a `major.minor` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotebookVersion {
    /// `nbformat`
    pub major: u32,
    /// `nbformat_minor`
    pub minor: u32,
}

impl NotebookVersion {
    /// nbformat 4.5, the version written by current Jupyter releases
    pub const V4_5: Self = Self::new(4, 5);

    /// Create a version
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for NotebookVersion {
    fn default() -> Self {
        Self::V4_5
    }
}

impl std::fmt::Display for NotebookVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for NotebookVersion {
    type Err = NotebookError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || NotebookError::format(format!("invalid notebook version '{s}'"));
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

/// A Jupyter notebook
///
/// Cells are kept in display order. The only mutating operation is
/// [`Notebook::clear_outputs`]; every other transformation builds a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notebook {
    version: NotebookVersion,
    cells: Vec<Cell>,
    metadata: Map<String, Value>,
}

impl Notebook {
    /// Create a notebook, checking that cell ids are unique
    ///
    /// # Errors
    ///
    /// Returns [`NotebookError::DuplicateCellId`] if two cells share an id.
    pub fn new(version: NotebookVersion, cells: Vec<Cell>) -> Result<Self> {
        let mut seen_ids = HashSet::new();
        for cell in &cells {
            if !seen_ids.insert(cell.id()) {
                return Err(NotebookError::DuplicateCellId(cell.id().to_string()));
            }
        }
        Ok(Self::from_parts(version, cells, Map::new()))
    }

    /// Create an empty notebook
    #[must_use]
    pub fn empty(version: NotebookVersion) -> Self {
        Self::from_parts(version, Vec::new(), Map::new())
    }

    /// Replace the notebook-level metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Assemble a notebook whose cell ids are already known to be unique
    pub(crate) fn from_parts(
        version: NotebookVersion,
        cells: Vec<Cell>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            version,
            cells,
            metadata,
        }
    }

    /// Format version
    #[inline]
    #[must_use]
    pub const fn version(&self) -> NotebookVersion {
        self.version
    }

    /// Notebook-level metadata
    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// All cells in order
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over cells in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Number of cells
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the notebook has no cells
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a position
    #[inline]
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Cell with the given id
    #[must_use]
    pub fn find_cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id() == id)
    }

    /// Code cells in order
    pub fn code_cells(&self) -> impl Iterator<Item = &CodeCell> {
        self.cells.iter().filter_map(Cell::as_code)
    }

    /// Markdown cells in order
    pub fn markdown_cells(&self) -> impl Iterator<Item = &MarkdownCell> {
        self.cells.iter().filter_map(Cell::as_markdown)
    }

    /// Remove every output and reset every execution count
    pub fn clear_outputs(&mut self) {
        for cell in &mut self.cells {
            if let Cell::Code(code) = cell {
                code.clear_outputs();
            }
        }
    }

    /// Decompose into version, cells and metadata
    #[must_use]
    pub fn into_parts(self) -> (NotebookVersion, Vec<Cell>, Map<String, Value>) {
        (self.version, self.cells, self.metadata)
    }
}

impl<'a> IntoIterator for &'a Notebook {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::output::{Output, StreamName};

    fn hello_world() -> Notebook {
        Notebook::new(
            NotebookVersion::V4_5,
            vec![
                Cell::markdown("a9541506", ["Hello world!\n", "============\n", "Print:"]),
                Cell::Code(
                    CodeCell::new("b777420a", ["print(\"Hello world!\")"], Some(1))
                        .with_outputs(vec![Output::stream(StreamName::Stdout, "Hello world!\n")]),
                ),
                Cell::markdown("a23ab5ac", ["Goodbye! 👋"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_version_display_and_parse() {
        assert_eq!(NotebookVersion::V4_5.to_string(), "4.5");
        assert_eq!("4.5".parse::<NotebookVersion>().unwrap(), NotebookVersion::new(4, 5));
        assert_eq!("3.0".parse::<NotebookVersion>().unwrap(), NotebookVersion::new(3, 0));
        assert!("4".parse::<NotebookVersion>().is_err());
        assert!("4.5.1".parse::<NotebookVersion>().is_err());
        assert!("a.b".parse::<NotebookVersion>().is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Notebook::new(
            NotebookVersion::V4_5,
            vec![Cell::markdown("x", ["a"]), Cell::code("x", ["b"], None)],
        );
        assert!(matches!(result, Err(NotebookError::DuplicateCellId(id)) if id == "x"));
    }

    #[test]
    fn test_iteration_order() {
        let nb = hello_world();
        let ids: Vec<&str> = nb.iter().map(Cell::id).collect();
        assert_eq!(ids, vec!["a9541506", "b777420a", "a23ab5ac"]);
        let ids: Vec<&str> = (&nb).into_iter().map(Cell::id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(nb.code_cells().count(), 1);
        assert_eq!(nb.markdown_cells().count(), 2);
        assert_eq!(nb.find_cell("a23ab5ac").map(Cell::source_text).as_deref(), Some("Goodbye! 👋"));
        assert!(nb.cell(3).is_none());
    }

    #[test]
    fn test_clear_outputs_is_idempotent() {
        let mut nb = hello_world();
        nb.clear_outputs();
        let once = nb.clone();
        nb.clear_outputs();
        assert_eq!(nb, once);

        let code = nb.code_cells().next().unwrap();
        assert_eq!(code.execution_count, None);
        assert!(code.outputs.is_empty());
        // Markdown cells are untouched
        assert_eq!(nb.cells()[0], hello_world().cells()[0]);
    }

    #[test]
    fn test_empty_notebook() {
        let nb = Notebook::empty(NotebookVersion::V4_5);
        assert!(nb.is_empty());
        assert_eq!(nb.len(), 0);
        assert_eq!(nb.version().to_string(), "4.5");
    }
}
