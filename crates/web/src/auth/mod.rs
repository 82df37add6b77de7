//! Authentication plugins.
//!
//! Authenticators consume a [`Request`] and produce identity claims; they are
//! independent of dispatch. When one is configured on the
//! [`crate::App`], it runs after request construction and before the verb
//! handler, and a rejection maps to a 401 response.

mod api_key;

pub use api_key::ApiKeyAuthenticator;

use indexmap::IndexMap;
use restkit_schema::Value;

use crate::error::Error;
use crate::request::Request;

/// Identity claims attached to an authenticated request.
pub type Claims = IndexMap<String, Value>;

pub trait Authenticator: Send + Sync {
    /// Verifies the request and returns its identity claims.
    ///
    /// Rejections are reported as [`Error::Unauthorized`].
    fn authenticate(&self, request: &Request) -> Result<Claims, Error>;
}
