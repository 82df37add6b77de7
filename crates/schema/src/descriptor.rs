//! Type descriptors for model fields.
//!
//! A descriptor is built once when a schema is defined and consulted on every
//! construction; nothing here is derived from runtime reflection.

use std::fmt::{self, Display, Formatter};

use crate::model::ModelSchema;

/// Describes the type a field value must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    /// The explicit null marker, mostly useful inside [`Descriptor::Union`].
    Null,
    /// Accepts any value.
    Any,
    /// A nested model; plain mappings are coerced into instances.
    Model(&'static ModelSchema),
    /// A homogeneous sequence.
    List(Box<Descriptor>),
    /// A homogeneous collection without duplicate elements.
    Set(Box<Descriptor>),
    /// A mapping with typed keys and values.
    Map(Box<Descriptor>, Box<Descriptor>),
    /// Satisfied by any one member, tried in declaration order.
    Union(Vec<Descriptor>),
}

impl Descriptor {
    pub fn list(item: Descriptor) -> Descriptor {
        Descriptor::List(Box::new(item))
    }

    pub fn set(item: Descriptor) -> Descriptor {
        Descriptor::Set(Box::new(item))
    }

    pub fn map(key: Descriptor, value: Descriptor) -> Descriptor {
        Descriptor::Map(Box::new(key), Box::new(value))
    }

    pub fn union(members: impl IntoIterator<Item = Descriptor>) -> Descriptor {
        Descriptor::Union(members.into_iter().collect())
    }

    /// The "optional" shorthand: a union of `inner` and the null marker.
    pub fn optional(inner: Descriptor) -> Descriptor {
        Descriptor::Union(vec![inner, Descriptor::Null])
    }

    /// A field is optional when its descriptor is a union that includes null.
    pub fn is_optional(&self) -> bool {
        match self {
            Descriptor::Union(members) => members.iter().any(|m| matches!(m, Descriptor::Null)),
            _ => false,
        }
    }
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::String => f.write_str("string"),
            Descriptor::Integer => f.write_str("integer"),
            Descriptor::Float => f.write_str("float"),
            Descriptor::Boolean => f.write_str("boolean"),
            Descriptor::DateTime => f.write_str("datetime"),
            Descriptor::Null => f.write_str("null"),
            Descriptor::Any => f.write_str("any"),
            Descriptor::Model(schema) => f.write_str(schema.name()),
            Descriptor::List(item) => write!(f, "list[{item}]"),
            Descriptor::Set(item) => write!(f, "set[{item}]"),
            Descriptor::Map(key, value) => write!(f, "mapping[{key}, {value}]"),
            Descriptor::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}
