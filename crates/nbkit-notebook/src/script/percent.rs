//! Percent format (`# %%` cell markers, markdown as `# ` comments)

use crate::model::{Cell, Notebook};
use crate::script::{join_cells, ScriptFormat, ScriptParser, MARKDOWN_MARKER, MARKER_PREFIX};

/// Convert a notebook to a percent-format script
///
/// An empty notebook converts to an empty string.
///
/// ```
/// use nbkit_notebook::model::{Cell, Notebook, NotebookVersion};
/// use nbkit_notebook::script::to_percent;
///
/// let nb = Notebook::new(
///     NotebookVersion::V4_5,
///     vec![Cell::markdown("a", ["Hi\n"]), Cell::code("b", ["x=1"], Some(1))],
/// )?;
/// assert_eq!(to_percent(&nb), "# %% [markdown]\n# Hi\n\n\n# %%\nx=1");
/// # Ok::<(), nbkit_notebook::NotebookError>(())
/// ```
#[must_use]
pub fn to_percent(notebook: &Notebook) -> String {
    join_cells(notebook, |cell| {
        let mut block = String::new();
        match cell {
            Cell::Markdown(markdown) => {
                block.push_str(MARKDOWN_MARKER);
                block.push('\n');
                for line in &markdown.base.source {
                    block.push_str("# ");
                    block.push_str(line);
                }
            }
            Cell::Code(code) => {
                block.push_str(MARKER_PREFIX);
                block.push('\n');
                block.extend(code.base.source.iter().map(String::as_str));
            }
        }
        block
    })
}

/// Parse a percent-format script
///
/// Markdown lines lose their `# ` prefix; see [`ScriptParser`] for the
/// block rules.
#[must_use]
pub fn parse_percent(text: &str) -> Notebook {
    ScriptParser::new(ScriptFormat::Percent).parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotebookVersion;

    fn hello_world() -> Notebook {
        Notebook::new(
            NotebookVersion::V4_5,
            vec![
                Cell::markdown(
                    "a9541506",
                    ["Hello world!\n", "============\n", "Print `Hello world!`:"],
                ),
                Cell::code("b777420a", ["print(\"Hello world!\")"], Some(1)),
                Cell::markdown("a23ab5ac", ["Goodbye! 👋"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_hello_world() {
        assert_eq!(
            to_percent(&hello_world()),
            "# %% [markdown]\n\
             # Hello world!\n\
             # ============\n\
             # Print `Hello world!`:\n\
             \n\
             # %%\n\
             print(\"Hello world!\")\n\
             \n\
             # %% [markdown]\n\
             # Goodbye! 👋"
        );
    }

    #[test]
    fn test_separator_after_newline_terminated_cell() {
        let nb = Notebook::new(
            NotebookVersion::V4_5,
            vec![Cell::markdown("a", ["Hi\n"]), Cell::code("b", ["x=1"], Some(1))],
        )
        .unwrap();
        assert_eq!(to_percent(&nb), "# %% [markdown]\n# Hi\n\n\n# %%\nx=1");
    }

    #[test]
    fn test_empty_notebook() {
        assert_eq!(to_percent(&Notebook::empty(NotebookVersion::V4_5)), "");
    }

    #[test]
    fn test_single_cell_has_no_separator() {
        let nb = Notebook::new(NotebookVersion::V4_5, vec![Cell::code("c", ["1 + 1"], None)])
            .unwrap();
        assert_eq!(to_percent(&nb), "# %%\n1 + 1");
    }

    #[test]
    fn test_marker_count_matches_cells() {
        let text = to_percent(&hello_world());
        let markers = text.lines().filter(|l| l.starts_with(MARKER_PREFIX)).count();
        assert_eq!(markers, 3);
    }

    #[test]
    fn test_parse_emitted_percent() {
        let parsed = parse_percent(&to_percent(&hello_world()));
        assert_eq!(parsed.len(), 3);
        assert_eq!(
            parsed.cells()[0].source(),
            ["Hello world!\n", "============\n", "Print `Hello world!`:"]
        );
        assert_eq!(parsed.cells()[1].source(), ["print(\"Hello world!\")"]);
        assert_eq!(parsed.cells()[2].source(), ["Goodbye! 👋"]);
    }
}
