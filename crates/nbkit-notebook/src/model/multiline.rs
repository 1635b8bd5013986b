//! Serde helpers for nbformat "multiline strings"
//!
//! nbformat allows `source`, stream `text` and MIME payloads to be stored either
//! as a single string or as an array of line strings.

use serde::de::{Deserializer, SeqAccess, Visitor};
use serde_json::Value;

/// Split a block of text into newline-terminated lines (the last line may lack one).
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Deserialize a field that can be either a string or an array of strings.
///
/// A plain string is split into lines so the result always follows the
/// line-per-entry layout.
pub fn deserialize_multiline<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MultilineVisitor;

    impl<'de> Visitor<'de> for MultilineVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or an array of strings")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(split_lines(v))
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(split_lines(&v))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut lines = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(line) = seq.next_element::<String>()? {
                lines.push(line);
            }
            Ok(lines)
        }
    }

    deserializer.deserialize_any(MultilineVisitor)
}

/// Normalise a MIME payload value into a plain `String`.
///
/// Strings are returned as-is, arrays of strings are concatenated. Any other
/// JSON shape yields `None`.
#[must_use]
pub fn join_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(arr) => Some(arr.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_multiline")]
        text: Vec<String>,
    }

    #[test]
    fn test_string_is_split_into_lines() {
        let holder: Holder = serde_json::from_str(r#"{"text": "a\nb\nc"}"#).unwrap();
        assert_eq!(holder.text, vec!["a\n", "b\n", "c"]);
    }

    #[test]
    fn test_array_is_kept() {
        let holder: Holder = serde_json::from_str(r#"{"text": ["a\n", "b"]}"#).unwrap();
        assert_eq!(holder.text, vec!["a\n", "b"]);
    }

    #[test]
    fn test_rejects_numbers() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"text": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_join_value() {
        assert_eq!(join_value(&Value::from("abc")), Some("abc".to_string()));
        assert_eq!(
            join_value(&serde_json::json!(["iVBO", "Rw0K"])),
            Some("iVBORw0K".to_string())
        );
        assert_eq!(join_value(&serde_json::json!({"x": 1})), None);
    }
}
