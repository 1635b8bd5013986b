//! Structured loader: `.ipynb` JSON → [`Notebook`]

use crate::error::{NotebookError, Result};
use crate::model::multiline::deserialize_multiline;
use crate::model::{
    Cell, CellBase, CellType, CodeCell, MarkdownCell, Notebook, NotebookVersion, Output,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// What to do with cells whose `cell_type` the model does not cover (e.g. `raw`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnknownCellPolicy {
    /// Drop the cell and log a warning (lenient)
    #[default]
    Skip,
    /// Fail with [`NotebookError::UnsupportedCellType`] (strict)
    Reject,
}

/// Options controlling how notebooks are loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// Handling of unrecognized cell types
    pub unknown_cell_types: UnknownCellPolicy,
}

impl LoadOptions {
    /// Lenient loading: unknown cell types are skipped
    #[inline]
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            unknown_cell_types: UnknownCellPolicy::Skip,
        }
    }

    /// Strict loading: unknown cell types are an error
    #[inline]
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            unknown_cell_types: UnknownCellPolicy::Reject,
        }
    }
}

#[derive(Deserialize)]
struct MarkdownRecord {
    id: String,
    #[serde(deserialize_with = "deserialize_multiline")]
    source: Vec<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Deserialize)]
struct CodeRecord {
    id: String,
    #[serde(deserialize_with = "deserialize_multiline")]
    source: Vec<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    execution_count: Option<u32>,
    #[serde(default)]
    outputs: Vec<Value>,
}

/// Load a notebook from a file
///
/// # Errors
///
/// Returns an error if the file cannot be read, or for any error listed in
/// [`load_notebook`].
pub fn load_notebook_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Notebook> {
    let path = path.as_ref();
    log::debug!("Loading notebook from {}", path.display());
    let bytes = fs::read(path)?;
    load_notebook(&bytes, options)
}

/// Load a notebook from a JSON string
///
/// # Errors
///
/// See [`load_notebook`].
pub fn load_notebook_str(content: &str, options: &LoadOptions) -> Result<Notebook> {
    load_notebook(content.as_bytes(), options)
}

/// Load a notebook from raw JSON bytes
///
/// # Errors
///
/// - [`NotebookError::ParseError`] if the bytes are not well-formed JSON
/// - [`NotebookError::FormatError`] if `cells`, `nbformat` or `nbformat_minor` is
///   missing, or a cell lacks a required key
/// - [`NotebookError::UnsupportedCellType`] for unknown cell types under
///   [`UnknownCellPolicy::Reject`]
/// - [`NotebookError::DuplicateCellId`] if cell ids are not unique
pub fn load_notebook(bytes: &[u8], options: &LoadOptions) -> Result<Notebook> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Object(mut root) = value else {
        return Err(NotebookError::format("top-level JSON value is not an object"));
    };

    let major = required_u32(&root, "nbformat")?;
    let minor = required_u32(&root, "nbformat_minor")?;
    let version = NotebookVersion::new(major, minor);

    let raw_cells = match root.remove("cells") {
        Some(Value::Array(cells)) => cells,
        Some(_) => return Err(NotebookError::format("'cells' is not an array")),
        None => return Err(NotebookError::format("missing required key 'cells'")),
    };

    let metadata = match root.remove("metadata") {
        Some(Value::Object(metadata)) => metadata,
        None | Some(Value::Null) => Map::new(),
        Some(_) => return Err(NotebookError::format("'metadata' is not an object")),
    };

    let mut cells = Vec::with_capacity(raw_cells.len());
    for (index, raw_cell) in raw_cells.into_iter().enumerate() {
        if let Some(cell) = load_cell(index, raw_cell, options)? {
            cells.push(cell);
        }
    }

    log::debug!("Loaded notebook v{version} with {} cells", cells.len());
    Ok(Notebook::new(version, cells)?.with_metadata(metadata))
}

fn required_u32(root: &Map<String, Value>, key: &str) -> Result<u32> {
    let value = root
        .get(key)
        .ok_or_else(|| NotebookError::format(format!("missing required key '{key}'")))?;
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| NotebookError::format(format!("'{key}' is not a non-negative integer")))
}

fn load_cell(index: usize, raw: Value, options: &LoadOptions) -> Result<Option<Cell>> {
    let cell_type = raw
        .get("cell_type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| NotebookError::cell_format(index, "missing 'cell_type'"))?;

    match cell_type.parse::<CellType>() {
        Ok(CellType::Markdown) => {
            let record: MarkdownRecord =
                serde_json::from_value(raw).map_err(|e| NotebookError::cell_format(index, e))?;
            Ok(Some(Cell::Markdown(MarkdownCell {
                base: CellBase {
                    id: record.id,
                    source: record.source,
                    metadata: record.metadata,
                },
            })))
        }
        Ok(CellType::Code) => {
            let record: CodeRecord =
                serde_json::from_value(raw).map_err(|e| NotebookError::cell_format(index, e))?;
            let outputs = record
                .outputs
                .into_iter()
                .enumerate()
                .map(|(output_index, output)| load_output(index, output_index, output))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(Cell::Code(CodeCell {
                base: CellBase {
                    id: record.id,
                    source: record.source,
                    metadata: record.metadata,
                },
                execution_count: record.execution_count,
                outputs,
            })))
        }
        Err(_) => match options.unknown_cell_types {
            UnknownCellPolicy::Skip => {
                log::warn!("Skipping cell {index} with unsupported type '{cell_type}'");
                Ok(None)
            }
            UnknownCellPolicy::Reject => {
                Err(NotebookError::UnsupportedCellType { cell_type, index })
            }
        },
    }
}

fn load_output(cell_index: usize, output_index: usize, raw: Value) -> Result<Output> {
    let output_type = raw
        .get("output_type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            NotebookError::cell_format(cell_index, format!("output {output_index}: missing 'output_type'"))
        })?;
    let malformed =
        |e: serde_json::Error| NotebookError::cell_format(cell_index, format!("output {output_index}: {e}"));

    let output = match output_type.as_str() {
        "stream" => Output::Stream(serde_json::from_value(raw).map_err(malformed)?),
        "error" => Output::Error(serde_json::from_value(raw).map_err(malformed)?),
        "display_data" => Output::DisplayData(serde_json::from_value(raw).map_err(malformed)?),
        "execute_result" => Output::ExecuteResult(serde_json::from_value(raw).map_err(malformed)?),
        _ => {
            log::debug!("Keeping unrecognized output type '{output_type}' in cell {cell_index}");
            Output::Unknown(raw)
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StreamName;

    const HELLO_WORLD: &str = r##"{
        "cells": [
            {
                "cell_type": "markdown",
                "id": "a9541506",
                "metadata": {},
                "source": ["Hello world!\n", "============\n", "Print `Hello world!`:"]
            },
            {
                "cell_type": "code",
                "execution_count": 1,
                "id": "b777420a",
                "metadata": {},
                "outputs": [
                    {"name": "stdout", "output_type": "stream", "text": ["Hello world!\n"]}
                ],
                "source": ["print(\"Hello world!\")"]
            },
            {
                "cell_type": "markdown",
                "id": "a23ab5ac",
                "metadata": {},
                "source": ["Goodbye! 👋"]
            }
        ],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    }"##;

    #[test]
    fn test_load_hello_world() {
        let nb = load_notebook_str(HELLO_WORLD, &LoadOptions::default()).unwrap();
        assert_eq!(nb.version().to_string(), "4.5");
        let ids: Vec<&str> = nb.iter().map(Cell::id).collect();
        assert_eq!(ids, vec!["a9541506", "b777420a", "a23ab5ac"]);

        let code = nb.cells()[1].as_code().unwrap();
        assert_eq!(code.execution_count, Some(1));
        assert_eq!(code.outputs.len(), 1);
        match &code.outputs[0] {
            Output::Stream(stream) => {
                assert_eq!(stream.name, StreamName::Stdout);
                assert_eq!(stream.text(), "Hello world!\n");
            }
            other => panic!("Expected stream output, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_notebook() {
        let nb = load_notebook_str(
            r#"{"cells": [], "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#,
            &LoadOptions::default(),
        )
        .unwrap();
        assert!(nb.is_empty());
        assert_eq!(nb.version(), NotebookVersion::V4_5);
    }

    #[test]
    fn test_missing_required_keys() {
        for json in [
            r#"{"metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#,
            r#"{"cells": [], "metadata": {}, "nbformat_minor": 5}"#,
            r#"{"cells": [], "metadata": {}, "nbformat": 4}"#,
        ] {
            let result = load_notebook_str(json, &LoadOptions::default());
            assert!(
                matches!(result, Err(NotebookError::FormatError(_))),
                "Expected FormatError for {json}, got {result:?}"
            );
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = load_notebook(b"{\"cells\": [", &LoadOptions::default());
        assert!(matches!(result, Err(NotebookError::ParseError(_))));
    }

    #[test]
    fn test_non_object_root() {
        let result = load_notebook_str("[1, 2, 3]", &LoadOptions::default());
        assert!(matches!(result, Err(NotebookError::FormatError(_))));
    }

    #[test]
    fn test_missing_cell_key() {
        let json = r#"{
            "cells": [{"cell_type": "markdown", "metadata": {}, "source": []}],
            "metadata": {}, "nbformat": 4, "nbformat_minor": 5
        }"#;
        let err = load_notebook_str(json, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, NotebookError::FormatError(ref msg) if msg.contains("cell 0")));
    }

    const WITH_RAW_CELL: &str = r#"{
        "cells": [
            {"cell_type": "raw", "id": "r1", "metadata": {}, "source": ["raw text"]},
            {"cell_type": "code", "id": "c1", "metadata": {}, "execution_count": null,
             "outputs": [], "source": "x = 1"}
        ],
        "metadata": {}, "nbformat": 4, "nbformat_minor": 5
    }"#;

    #[test]
    fn test_unknown_cell_type_skipped_when_lenient() {
        let nb = load_notebook_str(WITH_RAW_CELL, &LoadOptions::lenient()).unwrap();
        assert_eq!(nb.len(), 1);
        assert_eq!(nb.cells()[0].id(), "c1");
        assert_eq!(nb.cells()[0].source(), ["x = 1"]);
    }

    #[test]
    fn test_unknown_cell_type_rejected_when_strict() {
        let err = load_notebook_str(WITH_RAW_CELL, &LoadOptions::strict()).unwrap_err();
        match err {
            NotebookError::UnsupportedCellType { cell_type, index } => {
                assert_eq!(cell_type, "raw");
                assert_eq!(index, 0);
            }
            other => panic!("Expected UnsupportedCellType, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_output_type_is_preserved() {
        let json = r#"{
            "cells": [{"cell_type": "code", "id": "c", "metadata": {}, "execution_count": 2,
                       "outputs": [{"output_type": "update_display_data", "data": {}}],
                       "source": []}],
            "metadata": {"clone": true}, "nbformat": 4, "nbformat_minor": 5
        }"#;
        let nb = load_notebook_str(json, &LoadOptions::default()).unwrap();
        let code = nb.cells()[0].as_code().unwrap();
        assert!(matches!(&code.outputs[0], Output::Unknown(v) if v["output_type"] == "update_display_data"));
        assert_eq!(nb.metadata().get("clone"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_output_without_type_is_format_error() {
        let json = r#"{
            "cells": [{"cell_type": "code", "id": "c", "metadata": {}, "execution_count": 2,
                       "outputs": [{"name": "stdout", "text": "x"}], "source": []}],
            "metadata": {}, "nbformat": 4, "nbformat_minor": 5
        }"#;
        let result = load_notebook_str(json, &LoadOptions::default());
        assert!(matches!(result, Err(NotebookError::FormatError(_))));
    }

    #[test]
    fn test_duplicate_cell_ids() {
        let json = r#"{
            "cells": [
                {"cell_type": "markdown", "id": "same", "metadata": {}, "source": []},
                {"cell_type": "markdown", "id": "same", "metadata": {}, "source": []}
            ],
            "metadata": {}, "nbformat": 4, "nbformat_minor": 5
        }"#;
        let result = load_notebook_str(json, &LoadOptions::default());
        assert!(matches!(result, Err(NotebookError::DuplicateCellId(_))));
    }
}
