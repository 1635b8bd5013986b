//! Code cell outputs

use crate::model::multiline::{deserialize_multiline, join_value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// MIME type of embedded PNG images
pub const PNG_MIME: &str = "image/png";

/// MIME type → payload mapping carried by rich outputs
pub type MimeBundle = Map<String, Value>;

/// Name of the stream a stream output was written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

impl std::fmt::Display for StreamName {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        };
        write!(f, "{s}")
    }
}

/// Text written to stdout or stderr
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamOutput {
    /// Stream the text was written to
    pub name: StreamName,
    /// Text lines
    #[serde(deserialize_with = "deserialize_multiline")]
    pub text: Vec<String>,
}

impl StreamOutput {
    /// Full text of the stream output
    #[inline]
    #[must_use]
    pub fn text(&self) -> String {
        self.text.concat()
    }
}

/// Exception raised while the cell was executed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorOutput {
    /// Exception type name (e.g. `TypeError`)
    pub ename: String,
    /// Exception message
    pub evalue: String,
    /// Formatted traceback lines
    #[serde(default)]
    pub traceback: Vec<String>,
}

/// Rich output shown with `display()`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DisplayData {
    /// MIME bundle
    #[serde(default)]
    pub data: MimeBundle,
    /// Output metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Value of the last expression in a cell
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecuteResult {
    /// Execution count of the producing cell
    #[serde(default)]
    pub execution_count: Option<u32>,
    /// MIME bundle
    #[serde(default)]
    pub data: MimeBundle,
    /// Output metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A single code cell output
///
/// The variant determines which fields exist. Output types this crate does not
/// model are kept verbatim in [`Output::Unknown`] so they survive a round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// `stream`
    Stream(StreamOutput),
    /// `error`
    Error(ErrorOutput),
    /// `display_data`
    DisplayData(DisplayData),
    /// `execute_result`
    ExecuteResult(ExecuteResult),
    /// Any other `output_type`, as the original JSON object
    Unknown(Value),
}

impl Output {
    /// Create a stream output from text
    #[must_use]
    pub fn stream(name: StreamName, text: &str) -> Self {
        Self::Stream(StreamOutput {
            name,
            text: crate::model::multiline::split_lines(text),
        })
    }

    /// Create an error output without traceback
    #[must_use]
    pub fn error(ename: impl Into<String>, evalue: impl Into<String>) -> Self {
        Self::Error(ErrorOutput {
            ename: ename.into(),
            evalue: evalue.into(),
            traceback: Vec::new(),
        })
    }

    /// Create a display-data output from a MIME bundle
    #[must_use]
    pub fn display_data(data: MimeBundle) -> Self {
        Self::DisplayData(DisplayData {
            data,
            metadata: Map::new(),
        })
    }

    /// The nbformat `output_type` tag of this output
    #[must_use]
    pub fn output_type(&self) -> &str {
        match self {
            Self::Stream(_) => "stream",
            Self::Error(_) => "error",
            Self::DisplayData(_) => "display_data",
            Self::ExecuteResult(_) => "execute_result",
            Self::Unknown(value) => value
                .get("output_type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    /// MIME bundle for rich outputs (`display_data`, `execute_result`)
    #[must_use]
    pub const fn mime_bundle(&self) -> Option<&MimeBundle> {
        match self {
            Self::DisplayData(d) => Some(&d.data),
            Self::ExecuteResult(r) => Some(&r.data),
            _ => None,
        }
    }

    /// Payload for one MIME type, with multiline arrays joined
    #[must_use]
    pub fn mime_payload(&self, mime: &str) -> Option<String> {
        self.mime_bundle()
            .and_then(|bundle| bundle.get(mime))
            .and_then(join_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_name_display() {
        assert_eq!(StreamName::Stdout.to_string(), "stdout");
        assert_eq!(StreamName::Stderr.to_string(), "stderr");
    }

    #[test]
    fn test_output_type_tags() {
        assert_eq!(Output::stream(StreamName::Stdout, "hi").output_type(), "stream");
        assert_eq!(Output::error("E", "v").output_type(), "error");
        assert_eq!(Output::display_data(Map::new()).output_type(), "display_data");
        assert_eq!(
            Output::Unknown(json!({"output_type": "pyout"})).output_type(),
            "pyout"
        );
    }

    #[test]
    fn test_mime_payload_joins_lines() {
        let mut bundle = Map::new();
        bundle.insert(PNG_MIME.to_string(), json!(["iVBO", "Rw0K\n"]));
        let output = Output::display_data(bundle);
        assert_eq!(output.mime_payload(PNG_MIME), Some("iVBORw0K\n".to_string()));
        assert_eq!(output.mime_payload("text/plain"), None);
    }

    #[test]
    fn test_stream_text_concatenates() {
        let output = StreamOutput {
            name: StreamName::Stderr,
            text: vec!["a\n".to_string(), "b".to_string()],
        };
        assert_eq!(output.text(), "a\nb");
    }
}
