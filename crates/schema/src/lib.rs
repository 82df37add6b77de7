//! Declarative, schema-validated data models with canonical serialization
//!
//! This crate is the data layer of the restkit framework. It provides a small
//! dynamic value model, explicit type descriptors, declarative model schemas
//! that validate and coerce raw payloads into typed instances, a structural
//! schema exporter for documentation tooling, and a canonical serializer for
//! response bodies.
//!
//! # Features
//!
//! - Closed [`Value`] enum covering everything a transport can deliver
//! - Explicit, definition-time type descriptors (no runtime reflection)
//! - Recursive validation of nested models, sequences, mappings and unions
//! - All-or-nothing model construction with precise, field-naming errors
//! - Hand-rolled canonical encoder whose output any JSON reader accepts
//!
//! # Example
//!
//! ```
//! use once_cell::sync::Lazy;
//! use restkit_schema::{Descriptor, ModelSchema, Value};
//!
//! static ITEM: Lazy<ModelSchema> = Lazy::new(|| {
//!     ModelSchema::builder("Item")
//!         .field("name", Descriptor::String)
//!         .field("quantity", Descriptor::Integer)
//!         .field("description", Descriptor::optional(Descriptor::String))
//!         .build()
//! });
//!
//! let payload = [
//!     ("name".to_owned(), Value::from("Apple")),
//!     ("quantity".to_owned(), Value::from(10)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let item = ITEM.construct(payload).unwrap();
//! assert_eq!(item.get("description"), Some(&Value::Null));
//! ```

pub mod descriptor;
pub mod error;
pub mod export;
pub mod model;
pub mod ser;
pub mod value;

pub use descriptor::Descriptor;
pub use error::SchemaError;
pub use export::schema_of;
pub use model::{FieldDef, ModelSchema, ModelSchemaBuilder, ModelValue};
pub use ser::SerializeError;
pub use value::Value;
