//! The pluggable error-format policy.
//!
//! The dispatcher never decides what an error body looks like; it asks the
//! configured [`ErrorFormatter`]. Implementations only have to provide
//! [`ErrorFormatter::format`]; the dedicated constructors for validation
//! errors fall back to composed messages.

use indexmap::IndexMap;
use restkit_schema::Value;

pub trait ErrorFormatter: Send + Sync {
    /// Builds a body value from an error message.
    fn format(&self, message: &str) -> Value;

    /// Body for a missing required field.
    fn missing_field(&self, field: &str) -> Value {
        self.format(&format!("Missing required field `{field}`"))
    }

    /// Body for a field whose value has the wrong type.
    fn wrong_type(&self, field: &str, expected: &str) -> Value {
        self.format(&format!("Field `{field}` must be of type `{expected}`"))
    }
}

/// The default policy: `{"title": ...}` bodies with context keys for
/// validation errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorFormatter;

impl ErrorFormatter for DefaultErrorFormatter {
    fn format(&self, message: &str) -> Value {
        let mut body = IndexMap::new();
        body.insert("title".to_owned(), Value::from(message));
        Value::Map(body)
    }

    fn missing_field(&self, field: &str) -> Value {
        let mut body = IndexMap::new();
        body.insert("title".to_owned(), Value::from("Missing required field"));
        body.insert("field".to_owned(), Value::from(field));
        Value::Map(body)
    }

    fn wrong_type(&self, field: &str, expected: &str) -> Value {
        let mut body = IndexMap::new();
        body.insert("title".to_owned(), Value::from("Field has the wrong type"));
        body.insert("field".to_owned(), Value::from(field));
        body.insert("expected".to_owned(), Value::from(expected));
        Value::Map(body)
    }
}
