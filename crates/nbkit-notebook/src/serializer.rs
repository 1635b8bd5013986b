//! Structured serializer: [`Notebook`] → `.ipynb` JSON

use crate::error::{NotebookError, Result};
use crate::model::{Cell, Notebook, Output};
use serde::Serialize as _;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Render a notebook as an nbformat JSON value
#[must_use]
pub fn to_value(notebook: &Notebook) -> Value {
    let version = notebook.version();
    let cells: Vec<Value> = notebook.iter().map(cell_to_value).collect();

    let mut root = Map::new();
    root.insert("cells".to_string(), Value::Array(cells));
    root.insert(
        "metadata".to_string(),
        Value::Object(notebook.metadata().clone()),
    );
    root.insert("nbformat".to_string(), Value::from(version.major));
    root.insert("nbformat_minor".to_string(), Value::from(version.minor));
    Value::Object(root)
}

fn cell_to_value(cell: &Cell) -> Value {
    let base = cell.base();
    let mut map = Map::new();
    map.insert(
        "cell_type".to_string(),
        Value::String(cell.cell_type().to_string()),
    );
    map.insert("id".to_string(), Value::String(base.id.clone()));
    map.insert("metadata".to_string(), Value::Object(base.metadata.clone()));
    map.insert("source".to_string(), json!(base.source));

    if let Cell::Code(code) = cell {
        map.insert(
            "execution_count".to_string(),
            code.execution_count.map_or(Value::Null, Value::from),
        );
        map.insert(
            "outputs".to_string(),
            Value::Array(code.outputs.iter().map(output_to_value).collect()),
        );
    }

    Value::Object(map)
}

fn output_to_value(output: &Output) -> Value {
    match output {
        Output::Stream(stream) => json!({
            "output_type": "stream",
            "name": stream.name,
            "text": stream.text,
        }),
        Output::Error(error) => json!({
            "output_type": "error",
            "ename": error.ename,
            "evalue": error.evalue,
            "traceback": error.traceback,
        }),
        Output::DisplayData(display) => json!({
            "output_type": "display_data",
            "data": display.data,
            "metadata": display.metadata,
        }),
        Output::ExecuteResult(result) => json!({
            "output_type": "execute_result",
            "execution_count": result.execution_count,
            "data": result.data,
            "metadata": result.metadata,
        }),
        Output::Unknown(value) => value.clone(),
    }
}

/// Serialize a notebook to nbformat JSON text
///
/// Keys are sorted, indentation is one space and the text ends with a newline,
/// matching what Jupyter itself writes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn serialize_notebook(notebook: &Notebook) -> Result<String> {
    let value = to_value(notebook);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');

    String::from_utf8(buf).map_err(|e| NotebookError::format(e.to_string()))
}

/// Write a notebook to a file
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub fn save_notebook_file<P: AsRef<Path>>(notebook: &Notebook, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serialize_notebook(notebook)?;
    fs::write(path, json)?;
    log::debug!("Wrote notebook with {} cells to {}", notebook.len(), path.display());
    Ok(())
}
