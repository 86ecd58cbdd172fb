//! Decoded input rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error for a single unusable field in a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// Field is present but not a string.
    #[error("Field `{field}` has non-text value of type {kind}")]
    NotText {
        /// Field name.
        field: String,
        /// JSON type found instead.
        kind: &'static str,
    },
}

/// One record of the source table, with fields accessed by name.
///
/// Missing fields are treated as absent, never as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: Map<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(field, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether the row carries this field at all (even if null or empty).
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Non-empty string value of a field.
    ///
    /// Absent, null and empty fields yield `Ok(None)`; any other non-string
    /// value is an error.
    pub fn text(&self, field: &str) -> Result<Option<&str>, RowError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(RowError::NotText {
                field: field.to_string(),
                kind: json_kind(other),
            }),
        }
    }

    /// Lenient label value: non-empty strings as-is, numbers rendered.
    /// Used for identifiers such as paper names and URLs.
    pub fn label(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// First present label among several alternate field names.
    pub fn first_label(&self, fields: &[String]) -> Option<String> {
        fields.iter().find_map(|f| self.label(f))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_absent_null_and_empty() {
        let row = Row::from_pairs([("a", json!(null)), ("b", json!(""))]);
        assert_eq!(row.text("a"), Ok(None));
        assert_eq!(row.text("b"), Ok(None));
        assert_eq!(row.text("missing"), Ok(None));
    }

    #[test]
    fn test_text_rejects_numbers() {
        let row = Row::from_pairs([("capability", json!(42))]);
        assert!(matches!(
            row.text("capability"),
            Err(RowError::NotText { kind: "number", .. })
        ));
    }

    #[test]
    fn test_first_label_falls_through() {
        let row = Row::from_pairs([("paper_name", json!("")), ("actual_file_name", json!("p.txt"))]);
        let fields = vec!["paper_name".to_string(), "actual_file_name".to_string()];
        assert_eq!(row.first_label(&fields).as_deref(), Some("p.txt"));
    }

    #[test]
    fn test_row_deserializes_from_object() {
        let row: Row = serde_json::from_str(r#"{"capability": "NLP", "url": null}"#).unwrap();
        assert_eq!(row.text("capability"), Ok(Some("NLP")));
        assert!(row.has_field("url"));
    }
}
