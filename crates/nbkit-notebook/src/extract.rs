//! Artifact extraction from code cell outputs
//!
//! Extractors walk every output of every code cell in notebook order. Cells
//! without outputs contribute nothing.

use crate::error::{NotebookError, Result};
use crate::model::{Notebook, Output, StreamName, PNG_MIME};
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use ndarray::Array3;
use thiserror::Error;

/// Which streams [`get_stream`] collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamSelection {
    /// Include `stdout` outputs
    pub stdout: bool,
    /// Include `stderr` outputs
    pub stderr: bool,
}

impl Default for StreamSelection {
    #[inline]
    fn default() -> Self {
        Self::stdout()
    }
}

impl StreamSelection {
    /// Standard output only
    #[inline]
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            stdout: true,
            stderr: false,
        }
    }

    /// Standard error only
    #[inline]
    #[must_use]
    pub const fn stderr() -> Self {
        Self {
            stdout: false,
            stderr: true,
        }
    }

    /// Both streams, interleaved in output order
    #[inline]
    #[must_use]
    pub const fn both() -> Self {
        Self {
            stdout: true,
            stderr: true,
        }
    }

    /// Whether outputs written to `name` are selected
    #[inline]
    #[must_use]
    pub const fn includes(self, name: StreamName) -> bool {
        match name {
            StreamName::Stdout => self.stdout,
            StreamName::Stderr => self.stderr,
        }
    }
}

/// Concatenate the text of every selected stream output
#[must_use]
pub fn get_stream(notebook: &Notebook, selection: StreamSelection) -> String {
    let mut text = String::new();
    for code in notebook.code_cells() {
        for output in &code.outputs {
            if let Output::Stream(stream) = output {
                if selection.includes(stream.name) {
                    text.extend(stream.text.iter().map(String::as_str));
                }
            }
        }
    }
    text
}

/// An exception recorded in a code cell output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{ename}: {evalue}")]
pub struct CellError {
    /// Id of the cell that raised
    pub cell_id: String,
    /// Exception type name
    pub ename: String,
    /// Exception message
    pub evalue: String,
}

/// Collect every error output, in notebook order
#[must_use]
pub fn get_errors(notebook: &Notebook) -> Vec<CellError> {
    notebook
        .code_cells()
        .flat_map(|code| {
            code.outputs.iter().filter_map(move |output| match output {
                Output::Error(error) => Some(CellError {
                    cell_id: code.base.id.clone(),
                    ename: error.ename.clone(),
                    evalue: error.evalue.clone(),
                }),
                _ => None,
            })
        })
        .collect()
}

/// A decoded PNG output
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    /// Id of the cell that produced the image
    pub cell_id: String,
    /// Pixels with shape `(height, width, channels)`
    pub array: Array3<u8>,
}

/// A PNG output that could not be decoded
#[derive(Debug)]
pub struct ImageDecodeFailure {
    /// Id of the cell that produced the output
    pub cell_id: String,
    /// Position of the output within the cell
    pub output_index: usize,
    /// What went wrong
    pub error: NotebookError,
}

/// Result of [`get_images`]
#[derive(Debug, Default)]
pub struct ImageExtraction {
    /// Successfully decoded images, in notebook order
    pub images: Vec<ExtractedImage>,
    /// Outputs whose payload failed to decode
    pub failures: Vec<ImageDecodeFailure>,
}

impl ImageExtraction {
    /// Pixel arrays in notebook order
    #[must_use]
    pub fn arrays(&self) -> Vec<&Array3<u8>> {
        self.images.iter().map(|image| &image.array).collect()
    }

    /// Consume the extraction, keeping only the pixel arrays
    #[must_use]
    pub fn into_arrays(self) -> Vec<Array3<u8>> {
        self.images.into_iter().map(|image| image.array).collect()
    }

    /// True if every PNG output decoded
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decode every `image/png` payload found in rich outputs
///
/// A payload that fails to decode is recorded in
/// [`ImageExtraction::failures`] and the remaining outputs are still processed.
#[must_use]
pub fn get_images(notebook: &Notebook) -> ImageExtraction {
    let mut extraction = ImageExtraction::default();
    for code in notebook.code_cells() {
        for (output_index, output) in code.outputs.iter().enumerate() {
            let Some(payload) = output.mime_payload(PNG_MIME) else {
                continue;
            };
            match decode_png(&payload) {
                Ok(array) => extraction.images.push(ExtractedImage {
                    cell_id: code.base.id.clone(),
                    array,
                }),
                Err(error) => {
                    log::warn!(
                        "Skipping image in cell {} output {output_index}: {error}",
                        code.base.id
                    );
                    extraction.failures.push(ImageDecodeFailure {
                        cell_id: code.base.id.clone(),
                        output_index,
                        error,
                    });
                }
            }
        }
    }
    log::debug!(
        "Extracted {} images ({} failures)",
        extraction.images.len(),
        extraction.failures.len()
    );
    extraction
}

/// Decode a base64 PNG payload into an `(height, width, channels)` array
///
/// Whitespace inside the payload is ignored.
///
/// # Errors
///
/// Returns [`NotebookError::DecodeError`] if the payload is not valid base64 or
/// not a PNG image.
pub fn decode_png(payload: &str) -> Result<Array3<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| NotebookError::DecodeError(format!("invalid base64: {e}")))?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| NotebookError::DecodeError(format!("invalid PNG: {e}")))?;
    image_to_array(&image)
}

/// Convert an image to 8-bit pixels, keeping its native channel count
fn image_to_array(image: &DynamicImage) -> Result<Array3<u8>> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let (raw, channels) = match image.color().channel_count() {
        1 => (image.to_luma8().into_raw(), 1),
        2 => (image.to_luma_alpha8().into_raw(), 2),
        3 => (image.to_rgb8().into_raw(), 3),
        _ => (image.to_rgba8().into_raw(), 4),
    };
    Array3::from_shape_vec((height, width, channels), raw)
        .map_err(|e| NotebookError::DecodeError(format!("unexpected pixel layout: {e}")))
}
