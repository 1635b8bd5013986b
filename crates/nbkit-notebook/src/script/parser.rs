//! Line-oriented script parser shared by the percent and interactive formats

use crate::model::{Cell, Notebook, NotebookVersion};
use crate::script::{ScriptFormat, MARKER_PREFIX};
use serde_json::Map;
use std::borrow::Cow;

/// Parser position within the script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    ScanningForCell,
    InMarkdownBlock,
    InCodeBlock,
    Done,
}

/// Classification of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// Exactly `"\n"`
    Blank,
    /// A `# %%` marker; `markdown` is set when the line mentions markdown
    Marker { markdown: bool },
    Content,
}

impl LineKind {
    fn of(line: &str) -> Self {
        if line == "\n" {
            Self::Blank
        } else if line.starts_with(MARKER_PREFIX) {
            Self::Marker {
                markdown: line.contains("markdown"),
            }
        } else {
            Self::Content
        }
    }
}

/// Parses script text back into a [`Notebook`]
///
/// Scripts carry no cell ids or execution state, so parsed cells get
/// sequential ids (`"0"`, `"1"`, ...) and code cells get execution count 1.
///
/// ```
/// use nbkit_notebook::script::{ScriptFormat, ScriptParser};
///
/// let nb = ScriptParser::new(ScriptFormat::Interactive)
///     .parse("# %% [markdown]\nHello\n\n# %% [python]\nprint(1)");
/// assert_eq!(nb.len(), 2);
/// assert_eq!(nb.cells()[1].source(), ["print(1)"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptParser {
    format: ScriptFormat,
    version: NotebookVersion,
}

impl ScriptParser {
    /// Create a parser producing nbformat 4.5 notebooks
    #[must_use]
    pub const fn new(format: ScriptFormat) -> Self {
        Self {
            format,
            version: NotebookVersion::V4_5,
        }
    }

    /// Set the version recorded on parsed notebooks
    #[must_use]
    pub const fn with_version(mut self, version: NotebookVersion) -> Self {
        self.version = version;
        self
    }

    /// Parse script text
    ///
    /// Marker lines are always consumed as delimiters. A blank line or the next
    /// marker closes the open cell, and end of input closes it implicitly.
    ///
    /// Only the last line of each cell loses its trailing `"\n"`; earlier lines
    /// keep theirs, matching the line layout of cell sources in `.ipynb` files.
    /// CRLF line endings are read as LF.
    #[must_use]
    pub fn parse(&self, text: &str) -> Notebook {
        let text: Cow<'_, str> = if text.contains("\r\n") {
            Cow::Owned(text.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(text)
        };
        let mut cells = Vec::new();
        let mut block: Vec<&str> = Vec::new();
        let mut lines = text.split_inclusive('\n');
        let mut state = ParserState::ScanningForCell;

        while state != ParserState::Done {
            let Some(line) = lines.next() else {
                self.close_block(state, &mut block, &mut cells);
                state = ParserState::Done;
                continue;
            };

            state = match (state, LineKind::of(line)) {
                (ParserState::ScanningForCell, LineKind::Blank) => ParserState::ScanningForCell,
                (_, LineKind::Blank) => {
                    self.close_block(state, &mut block, &mut cells);
                    ParserState::ScanningForCell
                }
                (_, LineKind::Marker { markdown }) => {
                    self.close_block(state, &mut block, &mut cells);
                    if markdown {
                        ParserState::InMarkdownBlock
                    } else {
                        ParserState::InCodeBlock
                    }
                }
                (ParserState::ScanningForCell, LineKind::Content) => {
                    block.push(line);
                    ParserState::InCodeBlock
                }
                (open, LineKind::Content) => {
                    block.push(line);
                    open
                }
            };
        }

        log::debug!("Parsed {} cells from {} script", cells.len(), self.format);
        Notebook::from_parts(self.version, cells, Map::new())
    }

    /// Emit the open cell, if any, and reset the line buffer
    fn close_block(&self, state: ParserState, block: &mut Vec<&str>, cells: &mut Vec<Cell>) {
        let last = block.len().saturating_sub(1);
        let source = block.drain(..).enumerate().map(|(i, line)| {
            // The final newline of a block belongs to the separator
            if i == last {
                line.strip_suffix('\n').unwrap_or(line)
            } else {
                line
            }
        });

        let id = cells.len().to_string();
        match state {
            ParserState::InMarkdownBlock => {
                let source: Vec<&str> = match self.format {
                    ScriptFormat::Percent => source.map(uncomment).collect(),
                    ScriptFormat::Interactive => source.collect(),
                };
                cells.push(Cell::markdown(id, source));
            }
            ParserState::InCodeBlock => cells.push(Cell::code(id, source, Some(1))),
            ParserState::ScanningForCell | ParserState::Done => {}
        }
    }
}

/// Remove the `# ` comment prefix of a percent-format markdown line
fn uncomment(line: &str) -> &str {
    line.strip_prefix("# ")
        .or_else(|| line.strip_prefix('#'))
        .unwrap_or(line)
}
