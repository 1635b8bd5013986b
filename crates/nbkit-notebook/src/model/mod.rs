//! Notebook data model: cells, outputs and the notebook container

pub mod cell;
pub mod multiline;
pub mod notebook;
pub mod output;

pub use cell::{Cell, CellBase, CellType, CodeCell, MarkdownCell};
pub use notebook::{Notebook, NotebookVersion};
pub use output::{
    DisplayData, ErrorOutput, ExecuteResult, MimeBundle, Output, StreamName, StreamOutput,
    PNG_MIME,
};
