//! Structural-to-schema conversion.
//!
//! Turns a [`ModelSchema`] into a JSON-Schema-shaped [`Value`] description,
//! consumed by the documentation collaborator. Nested models expand into
//! sub-schemas; unions become `anyOf` lists.

use indexmap::IndexMap;

use crate::descriptor::Descriptor;
use crate::model::ModelSchema;
use crate::value::Value;

/// Describes a model as an object schema with `properties` and `required`.
pub fn schema_of(schema: &ModelSchema) -> Value {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    for field in schema.fields() {
        properties.insert(field.name().to_owned(), descriptor_schema(field.descriptor()));
        if !field.descriptor().is_optional() {
            required.push(Value::from(field.name()));
        }
    }

    let mut out = IndexMap::new();
    out.insert("type".to_owned(), Value::from("object"));
    out.insert("properties".to_owned(), Value::Map(properties));
    if !required.is_empty() {
        out.insert("required".to_owned(), Value::List(required));
    }
    Value::Map(out)
}

/// Describes a single type descriptor.
pub fn descriptor_schema(descriptor: &Descriptor) -> Value {
    match descriptor {
        Descriptor::String => type_entry("string", None),
        Descriptor::Integer => type_entry("integer", None),
        Descriptor::Float => type_entry("number", None),
        Descriptor::Boolean => type_entry("boolean", None),
        Descriptor::DateTime => type_entry("string", Some(("format", "date-time"))),
        Descriptor::Null => type_entry("null", None),
        Descriptor::Any => Value::Map(IndexMap::new()),
        Descriptor::Model(schema) => schema_of(schema),
        Descriptor::List(item) | Descriptor::Set(item) => {
            let mut out = IndexMap::new();
            out.insert("type".to_owned(), Value::from("array"));
            out.insert("items".to_owned(), descriptor_schema(item));
            Value::Map(out)
        }
        Descriptor::Map(_, value) => {
            let mut out = IndexMap::new();
            out.insert("type".to_owned(), Value::from("object"));
            out.insert("additionalProperties".to_owned(), descriptor_schema(value));
            Value::Map(out)
        }
        Descriptor::Union(members) => {
            let schemas = members.iter().map(descriptor_schema).collect();
            let mut out = IndexMap::new();
            out.insert("anyOf".to_owned(), Value::List(schemas));
            Value::Map(out)
        }
    }
}

fn type_entry(name: &str, extra: Option<(&str, &str)>) -> Value {
    let mut out = IndexMap::new();
    out.insert("type".to_owned(), Value::from(name));
    if let Some((key, value)) = extra {
        out.insert(key.to_owned(), Value::from(value));
    }
    Value::Map(out)
}
