use thiserror::Error;

/// Validation failures raised while constructing a model instance.
///
/// Construction stops at the first failing field; no error aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` does not match expected type `{expected}`")]
    FieldType { field: String, expected: String },
}

impl SchemaError {
    pub fn missing(field: impl Into<String>) -> Self {
        SchemaError::MissingField { field: field.into() }
    }

    pub fn wrong_type(field: impl Into<String>, expected: impl Into<String>) -> Self {
        SchemaError::FieldType { field: field.into(), expected: expected.into() }
    }

    /// Name of the field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            SchemaError::MissingField { field } | SchemaError::FieldType { field, .. } => field,
        }
    }
}
