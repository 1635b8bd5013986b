//! # nbkit-notebook
//!
//! Jupyter Notebook (.ipynb) toolbox for nbkit.
//!
//! This crate loads nbformat 4.x notebooks into a typed model and provides:
//! - Lossless JSON serialization back to `.ipynb`
//! - Conversion to percent-format scripts (`# %%` markers) and back
//! - Conversion to the interactive-cell format read by Starboard, including a
//!   standalone HTML page, and back
//! - Extraction of stream text, raised errors and embedded PNG images
//! - Output clearing, markdown conversion and a tree outline
//!
//! ## Example
//!
//! ```no_run
//! use nbkit_notebook::{get_stream, load_notebook_file, to_percent, LoadOptions, StreamSelection};
//!
//! let mut notebook = load_notebook_file("example.ipynb", &LoadOptions::default())?;
//! println!("{}", get_stream(&notebook, StreamSelection::stdout()));
//!
//! notebook.clear_outputs();
//! println!("{}", to_percent(&notebook));
//! # Ok::<(), nbkit_notebook::NotebookError>(())
//! ```

/// Error types for notebook operations
pub mod error;
/// Stream, error and image extraction
pub mod extract;
/// Jupyter notebook (ipynb) loader
pub mod loader;
/// Notebook data model
pub mod model;
/// Tree outline of a notebook
pub mod outline;
/// Script formats (percent, interactive)
pub mod script;
/// Jupyter notebook (ipynb) writer
pub mod serializer;
/// Whole-notebook cell transforms
pub mod transform;

pub use error::{NotebookError, Result};
pub use extract::{
    decode_png, get_errors, get_images, get_stream, CellError, ExtractedImage, ImageDecodeFailure,
    ImageExtraction, StreamSelection,
};
pub use loader::{load_notebook, load_notebook_file, load_notebook_str, LoadOptions, UnknownCellPolicy};
pub use model::{
    Cell, CellBase, CellType, CodeCell, MarkdownCell, Notebook, NotebookVersion, Output,
    StreamName,
};
pub use outline::outline;
pub use script::{
    load_script_file, parse_interactive, parse_percent, save_script_file, to_interactive,
    to_interactive_html, to_percent, ScriptFormat, ScriptParser,
};
pub use serializer::{save_notebook_file, serialize_notebook, to_value};
pub use transform::{markdownize, remove_markdown_cells};
