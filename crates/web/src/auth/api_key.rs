use std::collections::HashMap;

use restkit_schema::Value;

use crate::auth::{Authenticator, Claims};
use crate::error::Error;
use crate::request::Request;

/// Static API-key authentication.
///
/// Holds a table of valid keys mapped to client metadata. The key is read
/// from a configurable header, with an optional query-parameter fallback.
#[derive(Debug, Clone)]
pub struct ApiKeyAuthenticator {
    valid_keys: HashMap<String, Value>,
    header_name: String,
    query_param: Option<String>,
}

impl ApiKeyAuthenticator {
    pub fn new(valid_keys: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            valid_keys: valid_keys.into_iter().collect(),
            header_name: "x-api-key".to_owned(),
            query_param: None,
        }
    }

    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into().to_ascii_lowercase();
        self
    }

    pub fn with_query_param(mut self, query_param: impl Into<String>) -> Self {
        self.query_param = Some(query_param.into());
        self
    }

    /// Adds a valid key at runtime.
    pub fn add_key(&mut self, key: impl Into<String>, client_id: impl Into<Value>) {
        self.valid_keys.insert(key.into(), client_id.into());
    }

    fn token<'r>(&self, request: &'r Request) -> Option<&'r str> {
        if let Some(token) = request.header(&self.header_name) {
            return Some(token);
        }
        let param = self.query_param.as_deref()?;
        request.param(param).map(|value| value.first())
    }
}

impl Authenticator for ApiKeyAuthenticator {
    fn authenticate(&self, request: &Request) -> Result<Claims, Error> {
        let client_id = self
            .token(request)
            .and_then(|token| self.valid_keys.get(token))
            .ok_or_else(Error::unauthorized)?;

        let mut claims = Claims::new();
        claims.insert("client_id".to_owned(), client_id.clone());
        claims.insert("auth_method".to_owned(), Value::from("api-key"));
        Ok(claims)
    }
}
