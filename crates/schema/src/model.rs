//! Declarative data models: named, ordered, typed field sets that validate and
//! coerce raw payloads into structured instances.
//!
//! A [`ModelSchema`] is composed once, at definition time, through
//! [`ModelSchema::builder`]; ancestors are folded in with
//! [`ModelSchemaBuilder::extend`] so the field list is never re-derived from a
//! live type hierarchy. [`ModelSchema::construct`] walks the declared fields in
//! order and either yields a fully validated [`ModelValue`] or fails on the
//! first offending field.

use indexmap::IndexMap;

use crate::descriptor::Descriptor;
use crate::error::SchemaError;
use crate::value::Value;

/// A single declared field: name, type descriptor and optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: String,
    descriptor: Descriptor,
    default: Option<Value>,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// A named, ordered field set.
///
/// Schemas are meant to live in `static`s (e.g. behind `once_cell::sync::Lazy`)
/// so nested models can reference each other with `&'static` descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<FieldDef>,
}

/// Builder used to compose a schema, including ancestor field sets.
#[derive(Debug)]
pub struct ModelSchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl ModelSchema {
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder { name: name.into(), fields: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, ancestors first.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of all non-optional fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(|f| !f.descriptor.is_optional()).map(|f| f.name.as_str())
    }

    /// Builds an instance from a raw keyword payload.
    ///
    /// Fields are processed in declaration order. A required field absent from
    /// the payload fails with [`SchemaError::MissingField`]; a present field
    /// that satisfies no candidate type fails with [`SchemaError::FieldType`].
    /// The first failure aborts construction, so no partially valid instance is
    /// ever observable. Keys the schema does not declare are ignored.
    pub fn construct(&'static self, mut payload: IndexMap<String, Value>) -> Result<ModelValue, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for def in &self.fields {
            let value = match payload.swap_remove(&def.name) {
                Some(raw) => validate(&def.descriptor, raw).map_err(|failure| match failure {
                    Failure::Mismatch => SchemaError::wrong_type(&def.name, def.descriptor.to_string()),
                    Failure::Nested(inner) => inner,
                })?,
                None if def.descriptor.is_optional() => def.default.clone().unwrap_or(Value::Null),
                None => return Err(SchemaError::missing(&def.name)),
            };
            fields.insert(def.name.clone(), value);
        }
        Ok(ModelValue { schema: self, fields })
    }
}

impl ModelSchemaBuilder {
    /// Folds a parent schema's fields in, ahead of fields declared afterwards.
    ///
    /// Call `extend` before declaring the model's own fields; ancestors of the
    /// parent are already part of its composed field list.
    pub fn extend(mut self, parent: &ModelSchema) -> Self {
        for field in parent.fields() {
            self.push(field.clone());
        }
        self
    }

    /// Declares a required field (unless `descriptor` is an optional union).
    pub fn field(mut self, name: impl Into<String>, descriptor: Descriptor) -> Self {
        self.push(FieldDef { name: name.into(), descriptor, default: None });
        self
    }

    /// Declares a field with a default used when the payload omits it.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        descriptor: Descriptor,
        default: impl Into<Value>,
    ) -> Self {
        self.push(FieldDef { name: name.into(), descriptor, default: Some(default.into()) });
        self
    }

    // Redeclaring an inherited name replaces the definition in place: the last
    // writer wins for descriptor and default, the ancestor keeps the position.
    fn push(&mut self, field: FieldDef) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn build(self) -> ModelSchema {
        ModelSchema { name: self.name, fields: self.fields }
    }
}

/// A validated instance: one concrete value per declared field.
///
/// Invariant: every non-optional field holds a value matching its descriptor
/// (recursively); every optional field not supplied holds its default or null.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelValue {
    schema: &'static ModelSchema,
    fields: IndexMap<String, Value>,
}

impl ModelValue {
    pub fn schema(&self) -> &'static ModelSchema {
        self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field name/value pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts the instance back into a plain mapping, recursively flattening
    /// nested instances, so that a well-formed payload round-trips.
    pub fn to_value(&self) -> Value {
        Value::Map(self.fields.iter().map(|(k, v)| (k.clone(), flatten(v))).collect())
    }
}

fn flatten(value: &Value) -> Value {
    match value {
        Value::Model(model) => model.to_value(),
        Value::List(items) => Value::List(items.iter().map(flatten).collect()),
        Value::Map(map) => Value::Map(map.iter().map(|(k, v)| (k.clone(), flatten(v))).collect()),
        other => other.clone(),
    }
}

enum Failure {
    /// The value satisfies no candidate type; reported against the declared
    /// descriptor of the field being validated.
    Mismatch,
    /// A nested model rejected the value; its own error propagates unchanged.
    Nested(SchemaError),
}

fn validate(descriptor: &Descriptor, value: Value) -> Result<Value, Failure> {
    match descriptor {
        Descriptor::Any => Ok(value),
        Descriptor::Null if value.is_null() => Ok(value),
        Descriptor::String if matches!(value, Value::Str(_)) => Ok(value),
        // booleans are a separate kind and never accepted as integers
        Descriptor::Integer if matches!(value, Value::Int(_)) => Ok(value),
        Descriptor::Float if matches!(value, Value::Float(_)) => Ok(value),
        Descriptor::Boolean if matches!(value, Value::Bool(_)) => Ok(value),
        Descriptor::DateTime => validate_datetime(value),
        Descriptor::Model(schema) => validate_model(schema, value),
        Descriptor::List(item) => match value {
            Value::List(items) => {
                let items = items.into_iter().map(|v| validate(item, v)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(items))
            }
            _ => Err(Failure::Mismatch),
        },
        Descriptor::Set(item) => match value {
            Value::List(items) => {
                let items = items.into_iter().map(|v| validate(item, v)).collect::<Result<Vec<_>, _>>()?;
                // set semantics over a sequence representation
                for (i, candidate) in items.iter().enumerate() {
                    if items[..i].contains(candidate) {
                        return Err(Failure::Mismatch);
                    }
                }
                Ok(Value::List(items))
            }
            _ => Err(Failure::Mismatch),
        },
        Descriptor::Map(key, val) => match value {
            Value::Map(map) => {
                let mut validated = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    validate(key, Value::Str(k.clone()))?;
                    validated.insert(k, validate(val, v)?);
                }
                Ok(Value::Map(validated))
            }
            _ => Err(Failure::Mismatch),
        },
        Descriptor::Union(members) => {
            // first member to accept the value wins
            for member in members {
                if let Ok(validated) = validate(member, value.clone()) {
                    return Ok(validated);
                }
            }
            Err(Failure::Mismatch)
        }
        _ => Err(Failure::Mismatch),
    }
}

fn validate_model(schema: &'static ModelSchema, value: Value) -> Result<Value, Failure> {
    match value {
        Value::Model(ref model) if std::ptr::eq(model.schema(), schema) => Ok(value),
        Value::Map(map) => schema.construct(map).map(Value::Model).map_err(Failure::Nested),
        _ => Err(Failure::Mismatch),
    }
}

// Temporal values already carry their own variant; transports that decode
// JSON deliver them as RFC 3339 strings, which coerce here.
fn validate_datetime(value: Value) -> Result<Value, Failure> {
    match value {
        Value::DateTime(_) => Ok(value),
        Value::Str(s) => chrono::DateTime::parse_from_rfc3339(&s)
            .map(|dt| Value::DateTime(dt.to_utc()))
            .map_err(|_| Failure::Mismatch),
        _ => Err(Failure::Mismatch),
    }
}
