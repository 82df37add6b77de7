//! Per-endpoint handler registry.
//!
//! A [`Resource`] holds at most one handler per HTTP verb. Handlers are
//! registered explicitly, one call per verb, through [`ResourceBuilder`] —
//! there is no structural probing of arbitrary objects. Each slot optionally
//! declares the body model the handler expects, which [`crate::Request`]
//! construction validates against before the handler runs.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

use http::{HeaderMap, Method, StatusCode};
use restkit_schema::{ModelSchema, ModelValue, Value};

use crate::auth::Authenticator;
use crate::environ::Environ;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// The verbs a resource can serve.
pub const VERBS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// What a handler hands back; normalized into a [`Response`] by the resource.
#[derive(Debug)]
pub enum Reply {
    /// A pre-built response, passed through untouched.
    Response(Response),
    /// A bare value, becomes the body of a 200 response.
    Value(Value),
    /// A value plus an explicit status.
    ValueWithStatus(Value, StatusCode),
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl From<ModelValue> for Reply {
    fn from(model: ModelValue) -> Self {
        Reply::Value(Value::Model(model))
    }
}

impl From<(Value, StatusCode)> for Reply {
    fn from((value, status): (Value, StatusCode)) -> Self {
        Reply::ValueWithStatus(value, status)
    }
}

type Handler = Box<dyn Fn(&Request) -> Result<Reply, Error> + Send + Sync>;

struct Slot {
    handler: Handler,
    body_model: Option<&'static ModelSchema>,
}

/// The verb-keyed handler set bound to one route.
pub struct Resource {
    slots: HashMap<Method, Slot>,
}

impl Resource {
    pub fn builder() -> ResourceBuilder {
        ResourceBuilder { slots: HashMap::new() }
    }

    /// Verbs that have a registered handler.
    pub fn allowed_methods(&self) -> Vec<Method> {
        VERBS.iter().filter(|verb| self.slots.contains_key(*verb)).cloned().collect()
    }

    /// The body model the handler for `method` declared, if any.
    pub fn body_model(&self, method: &Method) -> Option<&'static ModelSchema> {
        self.slots.get(method).and_then(|slot| slot.body_model)
    }

    /// Builds the request, runs the verb handler and normalizes its reply.
    ///
    /// Default headers are applied only to responses constructed here; a
    /// handler's explicit [`Response`] passes through unchanged. Handler
    /// errors are not caught — they propagate to the dispatch boundary.
    pub(crate) fn invoke(
        &self,
        environ: &mut Environ,
        default_headers: &HeaderMap,
        authenticator: Option<&dyn Authenticator>,
    ) -> Result<Response, Error> {
        let method = environ.method().clone();
        let slot = self.slots.get(&method).ok_or(Error::MethodNotAllowed(method))?;

        let mut request = Request::from_environ(environ, slot.body_model)?;
        if let Some(authenticator) = authenticator {
            let claims = authenticator.authenticate(&request)?;
            request.set_claims(claims);
        }

        let reply = (slot.handler)(&request)?;
        Ok(match reply {
            Reply::Response(response) => response,
            Reply::Value(value) => {
                let mut response = Response::ok(value);
                response.apply_default_headers(default_headers);
                response
            }
            Reply::ValueWithStatus(value, status) => {
                let mut response = Response::with_status(status, value);
                response.apply_default_headers(default_headers);
                response
            }
        })
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("methods", &self.allowed_methods()).finish()
    }
}

/// Registers handlers verb by verb.
pub struct ResourceBuilder {
    slots: HashMap<Method, Slot>,
}

impl ResourceBuilder {
    /// Registers a handler for an arbitrary verb, replacing any previous one.
    pub fn route<F>(mut self, method: Method, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.slots.insert(method, Slot { handler: Box::new(handler), body_model: None });
        self
    }

    /// Registers a handler whose request body is validated against `model`.
    pub fn route_with_body<F>(mut self, method: Method, model: &'static ModelSchema, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.slots.insert(method, Slot { handler: Box::new(handler), body_model: Some(model) });
        self
    }

    pub fn get<F>(self, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route(Method::GET, handler)
    }

    pub fn post<F>(self, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route(Method::POST, handler)
    }

    pub fn post_with_body<F>(self, model: &'static ModelSchema, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route_with_body(Method::POST, model, handler)
    }

    pub fn put<F>(self, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route(Method::PUT, handler)
    }

    pub fn put_with_body<F>(self, model: &'static ModelSchema, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route_with_body(Method::PUT, model, handler)
    }

    pub fn patch<F>(self, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route(Method::PATCH, handler)
    }

    pub fn patch_with_body<F>(self, model: &'static ModelSchema, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route_with_body(Method::PATCH, model, handler)
    }

    pub fn delete<F>(self, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Reply, Error> + Send + Sync + 'static,
    {
        self.route(Method::DELETE, handler)
    }

    pub fn build(self) -> Resource {
        Resource { slots: self.slots }
    }
}

impl Debug for ResourceBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBuilder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use once_cell::sync::Lazy;
    use restkit_schema::Descriptor;

    fn message(text: &str) -> Value {
        let mut map = IndexMap::new();
        map.insert("message".to_owned(), Value::from(text));
        Value::Map(map)
    }

    #[test]
    fn test_bare_value_becomes_200() {
        let resource = Resource::builder().get(|_req| Ok(message("hi").into())).build();
        let mut environ = Environ::new(Method::GET, "/");
        let response = resource.invoke(&mut environ, &HeaderMap::new(), None).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().and_then(|b| b.get("message")), Some(&Value::from("hi")));
    }

    #[test]
    fn test_value_with_status() {
        let resource = Resource::builder()
            .post(|_req| Ok((message("made"), StatusCode::CREATED).into()))
            .build();
        let mut environ = Environ::new(Method::POST, "/");
        let response = resource.invoke(&mut environ, &HeaderMap::new(), None).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_explicit_response_passes_through() {
        let mut defaults = HeaderMap::new();
        defaults.insert("x-default", "yes".parse().unwrap());

        let resource = Resource::builder()
            .get(|_req| Ok(Response::empty(StatusCode::NO_CONTENT).into()))
            .build();
        let mut environ = Environ::new(Method::GET, "/");
        let response = resource.invoke(&mut environ, &defaults, None).unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        // defaults only apply to responses the resource builds itself
        assert!(response.headers().get("x-default").is_none());
    }

    #[test]
    fn test_default_headers_on_normalized_reply() {
        let mut defaults = HeaderMap::new();
        defaults.insert("x-default", "yes".parse().unwrap());

        let resource = Resource::builder().get(|_req| Ok(message("hi").into())).build();
        let mut environ = Environ::new(Method::GET, "/");
        let response = resource.invoke(&mut environ, &defaults, None).unwrap();
        assert_eq!(response.headers().get("x-default").unwrap(), "yes");
    }

    #[test]
    fn test_unregistered_verb_is_rejected() {
        let resource = Resource::builder().get(|_req| Ok(message("hi").into())).build();
        let mut environ = Environ::new(Method::DELETE, "/");
        let err = resource.invoke(&mut environ, &HeaderMap::new(), None).unwrap_err();
        assert!(matches!(err, Error::MethodNotAllowed(method) if method == Method::DELETE));
    }

    #[test]
    fn test_handler_errors_propagate() {
        let resource = Resource::builder().get(|_req| Err(Error::internal("boom"))).build();
        let mut environ = Environ::new(Method::GET, "/");
        let err = resource.invoke(&mut environ, &HeaderMap::new(), None).unwrap_err();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_body_model_introspection() {
        static ITEM: Lazy<ModelSchema> =
            Lazy::new(|| ModelSchema::builder("Item").field("name", Descriptor::String).build());

        let resource = Resource::builder()
            .get(|_req| Ok(message("hi").into()))
            .post_with_body(Lazy::force(&ITEM), |req| {
                let item = req.model().expect("validated body");
                Ok((item.to_value(), StatusCode::CREATED).into())
            })
            .build();

        assert_eq!(resource.allowed_methods(), [Method::GET, Method::POST]);
        assert!(resource.body_model(&Method::POST).is_some());
        assert!(resource.body_model(&Method::GET).is_none());
    }
}
