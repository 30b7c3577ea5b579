//! Record types shared by every pipeline stage.
//!
//! Records are loosely structured: a JSON object with arbitrary keys. The
//! same map type is used before and after cleaning; [`CleanedRecord`] is an
//! alias that documents which side of the cleaner a value sits on.
//!
//! `serde_json` is built with `preserve_order`, so key order survives from
//! input to output.

use serde_json::{Map, Value};

/// An unvalidated input object, exactly as read or fetched.
pub type RawRecord = Map<String, Value>;

/// A record after text and date normalization. Same keys as its raw form.
pub type CleanedRecord = Map<String, Value>;

/// Whether a field value counts as present for validation and completeness.
///
/// Null is absent, strings must contain a non-whitespace character, arrays
/// and objects must be non-empty. Numbers and booleans are always present.
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Whether `record` has `field` with a present value.
pub fn has_field(record: &Map<String, Value>, field: &str) -> bool {
    record.get(field).is_some_and(is_filled)
}

/// Text form of a scalar value. Strings are borrowed as-is, numbers and
/// booleans use their JSON rendering, null and containers have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_filled() {
        assert!(!is_filled(&Value::Null));
        assert!(!is_filled(&json!("")));
        assert!(!is_filled(&json!("   \t")));
        assert!(!is_filled(&json!([])));
        assert!(!is_filled(&json!({})));
        assert!(is_filled(&json!("x")));
        assert!(is_filled(&json!(0)));
        assert!(is_filled(&json!(false)));
        assert!(is_filled(&json!(["a"])));
    }

    #[test]
    fn test_has_field() {
        let record = json!({"title": "Hi", "content": ""});
        let record = record.as_object().unwrap();
        assert!(has_field(record, "title"));
        assert!(!has_field(record, "content"));
        assert!(!has_field(record, "url"));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("abc")), Some("abc".to_string()));
        assert_eq!(scalar_text(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!({"a": 1})), None);
    }

    #[test]
    fn test_record_keeps_key_order() {
        let record: RawRecord =
            serde_json::from_str(r#"{"url": "u", "title": "t", "content": "c"}"#).unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["url", "title", "content"]);
    }
}
