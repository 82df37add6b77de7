//! Per-call request representation.
//!
//! A [`Request`] is created fresh for every inbound call and discarded after
//! the handler returns. Construction is where all body I/O happens: the
//! environ's body stream is drained once, decoded, and — when the active
//! handler declared a body model — validated into a typed instance.

use std::collections::HashMap;

use http::{HeaderMap, Method};
use indexmap::IndexMap;
use restkit_schema::{ModelSchema, ModelValue, Value};

use crate::auth::Claims;
use crate::environ::Environ;
use crate::error::Error;

/// A query parameter value: single, or collected when the key repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    /// The first value, which is also the only one for `Single`.
    pub fn first(&self) -> &str {
        match self {
            ParamValue::Single(v) => v,
            ParamValue::Multi(values) => values.first().map_or("", String::as_str),
        }
    }
}

/// Decoded query parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Params {
    data: HashMap<String, ParamValue>,
}

impl Params {
    /// Decodes an urlencoded query string, folding repeated keys into
    /// [`ParamValue::Multi`].
    pub(crate) fn parse(query_string: &str) -> Result<Self, Error> {
        let mut data: HashMap<String, ParamValue> = HashMap::new();
        if query_string.is_empty() {
            return Ok(Params { data });
        }

        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query_string).map_err(Error::internal)?;
        for (key, value) in pairs {
            data.entry(key)
                .and_modify(|existing| match existing {
                    ParamValue::Single(old) => {
                        *existing = ParamValue::Multi(vec![std::mem::take(old), value.clone()]);
                    }
                    ParamValue::Multi(values) => values.push(value.clone()),
                })
                .or_insert_with(|| ParamValue::Single(value));
        }
        Ok(Params { data })
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.data.get(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The request body after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    /// The decoded body as delivered, no model declared for the handler.
    Raw(Value),
    /// The body validated against the handler's declared model.
    Model(ModelValue),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Body::Raw(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&ModelValue> {
        match self {
            Body::Model(model) => Some(model),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    params: Params,
    body: Body,
    claims: Option<Claims>,
}

impl Request {
    /// Builds a request from the environ, reading and decoding the body.
    ///
    /// When `body_model` is declared the body is constructed into a
    /// [`ModelValue`]; validation errors propagate to the dispatch boundary.
    /// An absent body is validated as an empty payload, so a schema with
    /// required fields reports them missing and an all-optional schema yields
    /// a defaulted instance. A handler with a declared model can therefore
    /// always rely on [`Request::model`] being present.
    pub(crate) fn from_environ(
        environ: &mut Environ,
        body_model: Option<&'static ModelSchema>,
    ) -> Result<Self, Error> {
        let params = Params::parse(environ.query_string())?;
        let bytes = environ.read_body()?;

        let body = if bytes.is_empty() {
            match body_model {
                Some(schema) => Body::Model(schema.construct(IndexMap::new())?),
                None => Body::Empty,
            }
        } else {
            let raw = match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(decoded) => Value::from(decoded),
                // not JSON: keep the raw text
                Err(_) => Value::Str(String::from_utf8_lossy(&bytes).into_owned()),
            };
            match (body_model, raw) {
                (Some(schema), Value::Map(map)) => Body::Model(schema.construct(map)?),
                (Some(schema), _) => {
                    return Err(Error::Schema(restkit_schema::SchemaError::wrong_type("body", schema.name())));
                }
                (None, raw) => Body::Raw(raw),
            }
        };

        Ok(Request {
            method: environ.method().clone(),
            path: environ.path().to_owned(),
            headers: environ.take_headers(),
            params,
            body,
            claims: None,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers with names in canonical (lowercased) form.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A single header value as a string, when present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The validated body instance, when a model was declared for the handler.
    pub fn model(&self) -> Option<&ModelValue> {
        self.body.as_model()
    }

    /// Identity claims produced by the authenticator, when one is configured.
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub(crate) fn set_claims(&mut self, claims: Claims) {
        self.claims = Some(claims);
    }
}
