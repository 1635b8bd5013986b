//! Notebook cells
//!
//! A cell is either markdown or code. Both variants embed the same
//! [`CellBase`] record; code cells add execution state on top of it.

use crate::model::output::Output;
use serde_json::{Map, Value};

/// Fields shared by every cell variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellBase {
    /// Unique cell identifier
    pub id: String,
    /// Source lines, newline-terminated except possibly the last
    pub source: Vec<String>,
    /// Cell-level metadata
    pub metadata: Map<String, Value>,
}

impl CellBase {
    /// Create base fields with empty metadata
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, source: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            source: source.into_iter().map(Into::into).collect(),
            metadata: Map::new(),
        }
    }
}

/// A cell of Markdown markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkdownCell {
    /// Shared cell fields
    pub base: CellBase,
}

impl MarkdownCell {
    /// Create a markdown cell
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, source: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: CellBase::new(id, source),
        }
    }
}

/// A cell of executable code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeCell {
    /// Shared cell fields
    pub base: CellBase,
    /// Execution count, `None` when the cell was never executed
    pub execution_count: Option<u32>,
    /// Outputs produced by the last execution
    pub outputs: Vec<Output>,
}

impl CodeCell {
    /// Create a code cell without outputs
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, source: I, execution_count: Option<u32>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: CellBase::new(id, source),
            execution_count,
            outputs: Vec::new(),
        }
    }

    /// Attach outputs
    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<Output>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Drop outputs and reset the execution count
    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
        self.execution_count = None;
    }
}

/// Type of notebook cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Markdown documentation cell
    Markdown,
    /// Executable code cell
    Code,
}

impl std::fmt::Display for CellType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Markdown => "markdown",
            Self::Code => "code",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for CellType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(Self::Markdown),
            "code" => Ok(Self::Code),
            _ => Err(format!("Unknown cell type '{s}'. Expected: markdown, code")),
        }
    }
}

/// A notebook cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Markdown cell
    Markdown(MarkdownCell),
    /// Code cell
    Code(CodeCell),
}

impl Cell {
    /// Shorthand for a markdown cell
    #[must_use]
    pub fn markdown<I, S>(id: impl Into<String>, source: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Markdown(MarkdownCell::new(id, source))
    }

    /// Shorthand for a code cell without outputs
    #[must_use]
    pub fn code<I, S>(id: impl Into<String>, source: I, execution_count: Option<u32>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Code(CodeCell::new(id, source, execution_count))
    }

    /// Shared fields of the cell
    #[inline]
    #[must_use]
    pub const fn base(&self) -> &CellBase {
        match self {
            Self::Markdown(cell) => &cell.base,
            Self::Code(cell) => &cell.base,
        }
    }

    /// Cell identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// Source lines
    #[inline]
    #[must_use]
    pub fn source(&self) -> &[String] {
        &self.base().source
    }

    /// Source lines joined into one string
    #[inline]
    #[must_use]
    pub fn source_text(&self) -> String {
        self.base().source.concat()
    }

    /// Cell-level metadata
    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.base().metadata
    }

    /// Variant tag
    #[inline]
    #[must_use]
    pub const fn cell_type(&self) -> CellType {
        match self {
            Self::Markdown(_) => CellType::Markdown,
            Self::Code(_) => CellType::Code,
        }
    }

    /// The code cell, if this is one
    #[inline]
    #[must_use]
    pub const fn as_code(&self) -> Option<&CodeCell> {
        match self {
            Self::Code(cell) => Some(cell),
            Self::Markdown(_) => None,
        }
    }

    /// The markdown cell, if this is one
    #[inline]
    #[must_use]
    pub const fn as_markdown(&self) -> Option<&MarkdownCell> {
        match self {
            Self::Markdown(cell) => Some(cell),
            Self::Code(_) => None,
        }
    }

    /// Whether this is a code cell
    #[inline]
    #[must_use]
    pub const fn is_code(&self) -> bool {
        matches!(self, Self::Code(_))
    }

    /// Whether this is a markdown cell
    #[inline]
    #[must_use]
    pub const fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown(_))
    }
}

impl From<MarkdownCell> for Cell {
    fn from(cell: MarkdownCell) -> Self {
        Self::Markdown(cell)
    }
}

impl From<CodeCell> for Cell {
    fn from(cell: CodeCell) -> Self {
        Self::Code(cell)
    }
}
