//! Plain-text script representations of a notebook
//!
//! Two line-oriented formats are supported:
//!
//! | Format | Markdown marker | Code marker | Markdown lines |
//! |--------|-----------------|-------------|----------------|
//! | Percent | `# %% [markdown]` | `# %%` | prefixed with `# ` |
//! | Interactive (Starboard) | `# %% [markdown]` | `# %% [python]` | verbatim |
//!
//! In both formats cells are separated by exactly one blank line and the
//! separator after the last cell is omitted.

pub mod interactive;
pub mod parser;
pub mod percent;

pub use interactive::{parse_interactive, to_interactive, to_interactive_html};
pub use parser::ScriptParser;
pub use percent::{parse_percent, to_percent};

use crate::error::Result;
use crate::model::{Cell, Notebook};
use std::fs;
use std::path::Path;

/// Prefix shared by every cell marker line
pub const MARKER_PREFIX: &str = "# %%";

/// Marker opening a markdown cell (both formats)
pub const MARKDOWN_MARKER: &str = "# %% [markdown]";

/// Appended after every cell except the last
const CELL_SEPARATOR: &str = "\n\n";

/// Script dialect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScriptFormat {
    /// Percent format (`# %%` code markers, commented markdown)
    #[default]
    Percent,
    /// Interactive-cell format (`# %% [python]` code markers, verbatim markdown)
    Interactive,
}

impl ScriptFormat {
    /// Render a notebook in this format
    #[must_use]
    pub fn render(self, notebook: &Notebook) -> String {
        match self {
            Self::Percent => to_percent(notebook),
            Self::Interactive => to_interactive(notebook),
        }
    }
}

impl std::fmt::Display for ScriptFormat {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Percent => "percent",
            Self::Interactive => "interactive",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ScriptFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percent" | "py-percent" => Ok(Self::Percent),
            "interactive" | "starboard" => Ok(Self::Interactive),
            _ => Err(format!(
                "Unknown script format '{s}'. Expected: percent, interactive"
            )),
        }
    }
}

/// Render every cell with `render_cell` and join the blocks with the cell separator
///
/// An empty notebook renders as an empty string.
fn join_cells<F>(notebook: &Notebook, render_cell: F) -> String
where
    F: Fn(&Cell) -> String,
{
    notebook
        .iter()
        .map(render_cell)
        .collect::<Vec<_>>()
        .join(CELL_SEPARATOR)
}

/// Write a notebook to a UTF-8 script file
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_script_file<P: AsRef<Path>>(
    notebook: &Notebook,
    format: ScriptFormat,
    path: P,
) -> Result<()> {
    fs::write(path, format.render(notebook))?;
    Ok(())
}

/// Read a UTF-8 script file and parse it into a notebook
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn load_script_file<P: AsRef<Path>>(path: P, parser: &ScriptParser) -> Result<Notebook> {
    let text = fs::read_to_string(path)?;
    Ok(parser.parse(&text))
}
