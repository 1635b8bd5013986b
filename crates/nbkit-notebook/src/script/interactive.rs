//! Interactive-cell format, as read by the Starboard in-browser notebook
//!
//! Markdown cells are introduced by `# %% [markdown]` and keep their text
//! verbatim; code cells are introduced by `# %% [python]`.

use crate::model::{Cell, Notebook};
use crate::script::{join_cells, ScriptFormat, ScriptParser, MARKDOWN_MARKER};
use serde_json::Value;

/// Marker opening a code cell
pub const PYTHON_MARKER: &str = "# %% [python]";

/// Versioned CDN location of the Starboard runtime assets
pub const STARBOARD_CDN: &str = "https://cdn.jsdelivr.net/npm/starboard-notebook@0.15.2/dist/";

/// Convert a notebook to an interactive-cell script
///
/// An empty notebook converts to an empty string.
#[must_use]
pub fn to_interactive(notebook: &Notebook) -> String {
    join_cells(notebook, |cell| {
        let marker = match cell {
            Cell::Markdown(_) => MARKDOWN_MARKER,
            Cell::Code(_) => PYTHON_MARKER,
        };
        let mut block = String::with_capacity(marker.len() + 1);
        block.push_str(marker);
        block.push('\n');
        block.extend(cell.source().iter().map(String::as_str));
        block
    })
}

/// Convert a notebook to a standalone HTML page running Starboard
///
/// The script from [`to_interactive`] is embedded as a JavaScript string
/// literal.
#[must_use]
pub fn to_interactive_html(notebook: &Notebook) -> String {
    let content = js_string_literal(&to_interactive(notebook));
    format!(
        r#"<!doctype html>
<html>
    <head>
        <meta charset="utf-8">
        <title>Starboard Notebook</title>
        <meta name="viewport" content="width=device-width,initial-scale=1">
        <link rel="icon" href="{STARBOARD_CDN}favicon.ico">
        <link href="{STARBOARD_CDN}starboard-notebook.css" rel="stylesheet">
    </head>
    <body>
        <script>
            window.initialNotebookContent = {content};
            window.starboardArtifactsUrl = `{STARBOARD_CDN}`;
        </script>
        <script src="{STARBOARD_CDN}starboard-notebook.js"></script>
    </body>
</html>
"#
    )
}

/// Quote text as a JSON string, which is also a valid JavaScript literal
///
/// `</` is escaped so the content cannot terminate the enclosing `<script>`.
fn js_string_literal(text: &str) -> String {
    Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}

/// Parse an interactive-cell script
///
/// See [`ScriptParser`] for the block rules.
#[must_use]
pub fn parse_interactive(text: &str) -> Notebook {
    ScriptParser::new(ScriptFormat::Interactive).parse(text)
}
