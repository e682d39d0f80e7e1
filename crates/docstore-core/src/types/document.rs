//! Document representation and conversions between caller types and
//! driver documents.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

/// A document as exchanged with the driver delegate.
pub type Document = serde_json::Map<String, Value>;

/// Name of the primary key field.
pub const ID_FIELD: &str = "_id";

/// Serialize a caller target into a document.
///
/// Fails with `Serialization` if the target does not encode as an object.
pub fn to_document<T>(target: &T) -> AppResult<Document>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(target)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::new(
            ErrorKind::Serialization,
            format!("Expected a document, target encoded as {}", type_name(&other)),
        )),
    }
}

/// Decode a document into a caller type.
pub fn from_document<T>(document: Document) -> AppResult<T>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// Convert a caller-supplied filter, update or projection value into a
/// document. `null` is treated as the empty document.
pub fn expect_document(value: Value, what: &str) -> AppResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Document::new()),
        other => Err(AppError::validation(format!(
            "{what} must be a document, got {}",
            type_name(&other)
        ))),
    }
}

/// A filter matching a single primary key.
pub fn id_filter(id: Value) -> Document {
    let mut filter = Document::new();
    filter.insert(ID_FIELD.to_string(), id);
    filter
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
