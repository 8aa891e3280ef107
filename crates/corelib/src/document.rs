//! Extended-JSON documents.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// An ordered extended-JSON document (field order is significant).
pub type Document = Map<String, Value>;

/// Looks up `field` in `doc`.
///
/// Metadata documents store dotted shard-key fields as literal names
/// (`{"user.id": 5}`), so the literal name wins. Otherwise a dotted name
/// is resolved by walking nested documents.
pub fn get_field<'a>(doc: &'a Document, field: &str) -> Option<&'a Value> {
    if let Some(value) = doc.get(field) {
        return Some(value);
    }
    if !field.contains('.') {
        return None;
    }

    let mut parts = field.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Borrows `value` as a document, failing with [`Error::InvalidDocument`].
pub fn as_document<'a>(value: &'a Value, what: &str) -> Result<&'a Document> {
    value
        .as_object()
        .ok_or_else(|| Error::InvalidDocument(format!("{} is not a document: {}", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_literal_field() {
        let d = doc(json!({"a": 1, "user.id": 7}));
        assert_eq!(get_field(&d, "a"), Some(&json!(1)));
        assert_eq!(get_field(&d, "user.id"), Some(&json!(7)));
        assert_eq!(get_field(&d, "b"), None);
    }

    #[test]
    fn test_dotted_traversal() {
        let d = doc(json!({"user": {"id": 9, "geo": {"zip": "02139"}}}));
        assert_eq!(get_field(&d, "user.id"), Some(&json!(9)));
        assert_eq!(get_field(&d, "user.geo.zip"), Some(&json!("02139")));
        assert_eq!(get_field(&d, "user.name"), None);
        assert_eq!(get_field(&d, "user.id.x"), None);
    }

    #[test]
    fn test_as_document() {
        assert!(as_document(&json!({"a": 1}), "min").is_ok());
        let err = as_document(&json!(3), "min").unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));
    }
}
