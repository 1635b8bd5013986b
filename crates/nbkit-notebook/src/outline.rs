//! Human-readable tree outline of a notebook

use crate::model::{Cell, Notebook};

/// Render a tree outline of the notebook
///
/// ```
/// use nbkit_notebook::model::{Cell, Notebook, NotebookVersion};
/// use nbkit_notebook::outline;
///
/// let nb = Notebook::new(
///     NotebookVersion::V4_5,
///     vec![Cell::code("b777420a", ["print(\"Hello world!\")"], Some(1))],
/// )?;
/// assert_eq!(
///     outline(&nb),
///     "Jupyter Notebook v4.5\n└─▶ Code cell #b777420a (1)\n    | print(\"Hello world!\")"
/// );
/// # Ok::<(), nbkit_notebook::NotebookError>(())
/// ```
#[must_use]
pub fn outline(notebook: &Notebook) -> String {
    let mut lines = vec![format!("Jupyter Notebook v{}", notebook.version())];
    for cell in notebook {
        let gutter = match cell {
            Cell::Markdown(_) => {
                lines.push(format!("└─▶ Markdown cell #{}", cell.id()));
                "  "
            }
            Cell::Code(code) => {
                let count = code
                    .execution_count
                    .map_or_else(|| " ".to_string(), |n| n.to_string());
                lines.push(format!("└─▶ Code cell #{} ({count})", cell.id()));
                " "
            }
        };
        push_body(&mut lines, cell.source(), gutter);
    }
    lines.join("\n")
}

/// Append source lines framed by a bracket in the left margin
fn push_body(lines: &mut Vec<String>, source: &[String], gutter: &str) {
    let last = source.len().saturating_sub(1);
    for (i, line) in source.iter().enumerate() {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let frame = match (i, source.len()) {
            (_, 1) => {
                lines.push(format!("    | {line}"));
                continue;
            }
            (0, _) => '┌',
            (i, _) if i == last => '└',
            _ => '│',
        };
        lines.push(format!("    {frame}{gutter}{line}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotebookVersion;

    #[test]
    fn test_hello_world_outline() {
        let nb = Notebook::new(
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
        .unwrap();
        assert_eq!(
            outline(&nb),
            "Jupyter Notebook v4.5\n\
             └─▶ Markdown cell #a9541506\n    \
             ┌  Hello world!\n    \
             │  ============\n    \
             └  Print `Hello world!`:\n\
             └─▶ Code cell #b777420a (1)\n    \
             | print(\"Hello world!\")\n\
             └─▶ Markdown cell #a23ab5ac\n    \
             | Goodbye! 👋"
        );
    }

    #[test]
    fn test_multiline_code_uses_narrow_gutter() {
        let nb = Notebook::new(
            NotebookVersion::V4_5,
            vec![Cell::code("c", ["a = 1\n", "b = 2"], None)],
        )
        .unwrap();
        assert_eq!(
            outline(&nb),
            "Jupyter Notebook v4.5\n└─▶ Code cell #c ( )\n    ┌ a = 1\n    └ b = 2"
        );
    }

    #[test]
    fn test_empty_source_has_no_body() {
        let nb = Notebook::new(
            NotebookVersion::V4_5,
            vec![Cell::markdown("m", Vec::<String>::new())],
        )
        .unwrap();
        assert_eq!(outline(&nb), "Jupyter Notebook v4.5\n└─▶ Markdown cell #m");
    }

    #[test]
    fn test_empty_notebook() {
        let nb = Notebook::empty(NotebookVersion::new(4, 4));
        assert_eq!(outline(&nb), "Jupyter Notebook v4.4");
    }
}
