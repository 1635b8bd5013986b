//! Error types for notebook loading and conversion

use thiserror::Error;

/// Error type for notebook operations
#[derive(Error, Debug)]
pub enum NotebookError {
    /// I/O error when reading or writing a notebook or script file
    #[error("Failed to access notebook file: {0}")]
    IoError(#[from] std::io::Error),

    /// Input is not well-formed JSON
    #[error("Failed to parse notebook JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A required key is missing or has the wrong shape
    #[error("Invalid notebook format: {0}")]
    FormatError(String),

    /// Cell type not handled by the model (only raised in strict mode)
    #[error("Unsupported cell type '{cell_type}' at cell index {index}")]
    UnsupportedCellType {
        /// Value of the `cell_type` field
        cell_type: String,
        /// Position of the offending cell in `cells`
        index: usize,
    },

    /// Two cells share the same identifier
    #[error("Duplicate cell id: {0}")]
    DuplicateCellId(String),

    /// Embedded payload could not be decoded (base64 or image data)
    #[error("Failed to decode output payload: {0}")]
    DecodeError(String),
}

impl NotebookError {
    /// Create a format error
    #[inline]
    #[must_use = "returns NotebookError for invalid structure"]
    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError(message.into())
    }

    /// Create a format error scoped to one cell
    #[inline]
    #[must_use = "returns NotebookError for invalid cell structure"]
    pub fn cell_format(index: usize, message: impl std::fmt::Display) -> Self {
        Self::FormatError(format!("cell {index}: {message}"))
    }
}

/// Result type alias for notebook operations
pub type Result<T> = std::result::Result<T, NotebookError>;
