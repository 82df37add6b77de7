//! The inbound request environment handed over by the transport collaborator.
//!
//! The transport owns socket handling and protocol parsing; by the time an
//! [`Environ`] reaches the dispatcher it carries the request method, path,
//! raw query string, headers and a readable body stream with a known content
//! length. Body bytes are read exactly once, during [`crate::Request`]
//! construction.

use std::fmt::{self, Debug, Formatter};
use std::io::{self, Read};

use bytes::Bytes;
use http::{HeaderMap, Method};

pub struct Environ {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    body: Option<Box<dyn Read + Send>>,
    content_length: usize,
}

impl Environ {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            body: None,
            content_length: 0,
        }
    }

    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Read + Send + 'static, content_length: usize) -> Self {
        self.body = Some(Box::new(body));
        self.content_length = content_length;
        self
    }

    /// Convenience for transports (and the test client) that already buffered
    /// the body.
    pub fn with_buffered_body(self, body: Bytes) -> Self {
        let length = body.len();
        self.with_body(io::Cursor::new(body), length)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Drains the body stream, up to the declared content length.
    ///
    /// The stream can only be consumed once; subsequent calls yield no bytes.
    pub(crate) fn read_body(&mut self) -> io::Result<Bytes> {
        let Some(body) = self.body.take() else {
            return Ok(Bytes::new());
        };
        if self.content_length == 0 {
            return Ok(Bytes::new());
        }
        let mut buf = Vec::with_capacity(self.content_length.min(64 * 1024));
        body.take(self.content_length as u64).read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    pub(crate) fn take_headers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.headers)
    }
}

impl Debug for Environ {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environ")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query_string", &self.query_string)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
