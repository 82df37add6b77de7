//! The outbound response: a status/headers/body triple.
//!
//! A response is created once per request — by a handler, by return-value
//! normalization, or by the dispatcher's error path — serialized to bytes and
//! discarded. It is immutable after construction except through the explicit
//! `with_*` replacements.

use std::io::{self, Write};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use restkit_schema::{SerializeError, Value, ser};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<Value>) -> Self {
        Self { status, headers, body }
    }

    /// A 200 response carrying `body`, with no headers yet.
    pub fn ok(body: Value) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self { status, headers: HeaderMap::new(), body: Some(body) }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: None }
    }

    /// Replaces the headers wholesale.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Fills in headers the response does not set itself.
    ///
    /// Used for default headers on responses the framework builds; headers a
    /// handler set explicitly are never overridden.
    pub(crate) fn apply_default_headers(&mut self, defaults: &HeaderMap) {
        for (name, value) in defaults {
            if !self.headers.contains_key(name) {
                self.headers.insert(name.clone(), value.clone());
            }
        }
    }

    /// The status line in the `"<code> <reason>"` form transports accept.
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => format!("{} ", self.status.as_u16()),
        }
    }

    /// The body serialized into its canonical byte encoding.
    pub fn body_bytes(&self) -> Result<Bytes, SerializeError> {
        match &self.body {
            Some(value) => ser::to_bytes(value).map(Bytes::from),
            None => Ok(Bytes::new()),
        }
    }

    /// Writes status line, headers and body in a plain-text framing.
    ///
    /// A convenience for simple transports and demos; real transports usually
    /// consume [`Response::status_line`], [`Response::headers`] and
    /// [`Response::body_bytes`] directly.
    pub fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        let body = self.body_bytes().map_err(io::Error::other)?;
        write!(writer, "{}\r\n", self.status_line())?;
        for (name, value) in &self.headers {
            write!(writer, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()))?;
        }
        write!(writer, "\r\n")?;
        writer.write_all(&body)
    }
}
