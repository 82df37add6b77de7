//! The dispatcher: route table, error mapping and the single catch boundary.
//!
//! [`App::handle`] is the one entry point the transport collaborator calls.
//! Whatever happens below it — route miss, unsupported verb, body validation
//! failure, a handler blowing up — the terminal state is always a constructed,
//! serializable [`Response`]; no error escapes.

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use restkit_schema::{SchemaError, Value, schema_of};
use tracing::{error, info, warn};

use crate::auth::Authenticator;
use crate::environ::Environ;
use crate::error::{Error, RouteConflictError};
use crate::format::{DefaultErrorFormatter, ErrorFormatter};
use crate::resource::Resource;
use crate::response::Response;

pub struct App {
    router: matchit::Router<usize>,
    resources: Vec<(String, Resource)>,
    default_headers: HeaderMap,
    formatter: Box<dyn ErrorFormatter>,
    authenticator: Option<Box<dyn Authenticator>>,
    debug: bool,
    api_description: OnceCell<Value>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            router: matchit::Router::new(),
            resources: Vec::new(),
            default_headers: HeaderMap::new(),
            formatter: Box::new(DefaultErrorFormatter),
            authenticator: None,
            debug: false,
            api_description: OnceCell::new(),
        }
    }

    /// A header applied to every response the framework constructs itself.
    pub fn set_default_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.default_headers.insert(name, value);
    }

    pub fn set_error_formatter(&mut self, formatter: impl ErrorFormatter + 'static) {
        self.formatter = Box::new(formatter);
    }

    pub fn set_authenticator(&mut self, authenticator: impl Authenticator + 'static) {
        self.authenticator = Some(Box::new(authenticator));
    }

    /// With debug enabled, unexpected errors surface their real message in the
    /// response body instead of a generic one.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Binds a resource to a path.
    ///
    /// Each path maps to exactly one resource; registering a duplicate fails
    /// and leaves the original registration in place. The route table is meant
    /// to be populated during setup, before serving begins.
    pub fn add_route(&mut self, path: impl Into<String>, resource: Resource) -> Result<(), RouteConflictError> {
        let path = path.into();
        let index = self.resources.len();
        self.router.insert(&path, index).map_err(|cause| {
            // the router reports pattern syntax problems through the same
            // channel as duplicates; keep the detail in the log
            if !matches!(cause, matchit::InsertError::Conflict { .. }) {
                error!(cause = %cause, path, "route pattern rejected");
            }
            RouteConflictError { path: path.clone() }
        })?;
        self.resources.push((path, resource));
        Ok(())
    }

    /// Handles one inbound call, start to finish.
    ///
    /// This never fails: every error raised below is mapped to a response via
    /// the configured formatter, and the returned response is guaranteed to
    /// serialize.
    pub fn handle(&self, mut environ: Environ) -> Response {
        let method = environ.method().clone();
        let path = environ.path().to_owned();

        let mut response = match self.dispatch(&mut environ) {
            Ok(response) => response,
            Err(error) => self.error_response(&error),
        };

        if let Err(cause) = response.body_bytes() {
            error!(cause = %cause, %method, path, "response body failed to serialize");
            // the formatter cannot be trusted at this point; a literal map of
            // strings always encodes
            let mut body = IndexMap::new();
            body.insert("title".to_owned(), Value::from("Internal server error"));
            response = self.build_error_response(StatusCode::INTERNAL_SERVER_ERROR, Value::Map(body));
        }

        self.log_response(&method, &path, response.status());
        response
    }

    fn dispatch(&self, environ: &mut Environ) -> Result<Response, Error> {
        let index = self
            .router
            .at(environ.path())
            .map(|matched| *matched.value)
            .map_err(|_| Error::not_found())?;
        let (_, resource) = &self.resources[index];
        resource.invoke(environ, &self.default_headers, self.authenticator.as_deref())
    }

    fn error_response(&self, error: &Error) -> Response {
        let body = match error {
            Error::NotFound { message, .. } => self.formatter.format(message),
            Error::MethodNotAllowed(method) => self.formatter.format(&format!("Method `{method}` not allowed")),
            Error::Schema(SchemaError::MissingField { field }) => self.formatter.missing_field(field),
            Error::Schema(SchemaError::FieldType { field, expected }) => {
                self.formatter.wrong_type(field, expected)
            }
            Error::Unauthorized { message } => self.formatter.format(message),
            Error::Other(cause) => {
                // unexpected: full detail goes to the log, the client gets a
                // generic message unless debug is on
                error!(cause = %cause, "unhandled error while dispatching request");
                if self.debug {
                    self.formatter.format(&cause.to_string())
                } else {
                    self.formatter.format("Internal server error")
                }
            }
        };
        self.build_error_response(error.status(), body)
    }

    fn build_error_response(&self, status: StatusCode, body: Value) -> Response {
        let mut response = Response::with_status(status, body);
        response.apply_default_headers(&self.default_headers);
        response
    }

    // Severity follows the status band, closed-open intervals.
    fn log_response(&self, method: &Method, path: &str, status: StatusCode) {
        let code = status.as_u16();
        if code >= 400 {
            error!(%method, path, status = code, "request failed");
        } else if code >= 300 {
            warn!(%method, path, status = code, "request redirected");
        } else {
            info!(%method, path, status = code, "request handled");
        }
    }

    /// A description of every registered route: path → verb → declared body
    /// schema. Computed once, on first access, for the documentation
    /// collaborator.
    pub fn api_description(&self) -> &Value {
        self.api_description.get_or_init(|| {
            let mut paths = IndexMap::new();
            for (path, resource) in &self.resources {
                let mut methods = IndexMap::new();
                for method in resource.allowed_methods() {
                    let schema = match resource.body_model(&method) {
                        Some(model) => schema_of(model),
                        None => Value::Map(IndexMap::new()),
                    };
                    methods.insert(method.as_str().to_owned(), schema);
                }
                paths.insert(path.clone(), Value::Map(methods));
            }
            Value::Map(paths)
        })
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.resources.iter().map(|(path, _)| path).collect::<Vec<_>>())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Reply;

    fn hello() -> Resource {
        Resource::builder()
            .get(|_req| {
                let mut map = IndexMap::new();
                map.insert("message".to_owned(), Value::from("hello"));
                Ok(Reply::Value(Value::Map(map)))
            })
            .build()
    }

    #[test]
    fn test_duplicate_route_is_a_conflict() {
        let mut app = App::new();
        app.add_route("/greeting", hello()).unwrap();
        let err = app.add_route("/greeting", hello()).unwrap_err();
        assert_eq!(err, RouteConflictError { path: "/greeting".to_owned() });
    }

    #[test]
    fn test_invalid_route_pattern_is_rejected() {
        let mut app = App::new();
        assert!(app.add_route("/items/{", hello()).is_err());
        // the table stays usable after a rejected registration
        app.add_route("/items", hello()).unwrap();
        assert_eq!(app.handle(Environ::new(Method::GET, "/items")).status(), StatusCode::OK);
    }

    #[test]
    fn test_unserializable_body_degrades_to_encodable_500() {
        struct NonFinite;
        impl crate::format::ErrorFormatter for NonFinite {
            fn format(&self, _message: &str) -> Value {
                Value::Float(f64::NAN)
            }
        }

        let mut app = App::new();
        app.set_error_formatter(NonFinite);
        app.add_route(
            "/nan",
            Resource::builder().get(|_req| Ok(Reply::Value(Value::Float(f64::NAN)))).build(),
        )
        .unwrap();

        let response = app.handle(Environ::new(Method::GET, "/nan"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body_bytes().is_ok());
        assert_eq!(
            response.body().and_then(|b| b.get("title")),
            Some(&Value::from("Internal server error"))
        );
    }

    #[test]
    fn test_distinct_routes_are_independent() {
        let mut app = App::new();
        app.add_route("/a", hello()).unwrap();
        app.add_route("/b", hello()).unwrap();

        assert_eq!(app.handle(Environ::new(Method::GET, "/a")).status(), StatusCode::OK);
        assert_eq!(app.handle(Environ::new(Method::GET, "/b")).status(), StatusCode::OK);
    }

    #[test]
    fn test_unregistered_path_is_404_with_default_message() {
        let app = App::new();
        let response = app.handle(Environ::new(Method::GET, "/missing"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.body().and_then(|b| b.get("title")),
            Some(&Value::from("Resource not found"))
        );
    }

    #[test]
    fn test_unsupported_verb_is_405_naming_the_verb() {
        let mut app = App::new();
        app.add_route("/greeting", hello()).unwrap();
        let response = app.handle(Environ::new(Method::DELETE, "/greeting"));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let title = response.body().and_then(|b| b.get("title")).and_then(Value::as_str).unwrap();
        assert!(title.contains("DELETE"));
    }

    #[test]
    fn test_handler_panic_free_error_path() {
        let mut app = App::new();
        app.add_route(
            "/boom",
            Resource::builder().get(|_req| Err(Error::internal("database on fire"))).build(),
        )
        .unwrap();

        let response = app.handle(Environ::new(Method::GET, "/boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body().and_then(|b| b.get("title")),
            Some(&Value::from("Internal server error"))
        );
    }

    #[test]
    fn test_debug_surfaces_cause() {
        let mut app = App::new();
        app.set_debug(true);
        app.add_route(
            "/boom",
            Resource::builder().get(|_req| Err(Error::internal("database on fire"))).build(),
        )
        .unwrap();

        let response = app.handle(Environ::new(Method::GET, "/boom"));
        assert_eq!(
            response.body().and_then(|b| b.get("title")),
            Some(&Value::from("database on fire"))
        );
    }

    #[test]
    fn test_default_headers_on_error_responses() {
        let mut app = App::new();
        app.set_default_header(
            http::header::CONTENT_TYPE,
            mime::APPLICATION_JSON.as_ref().parse().unwrap(),
        );
        let response = app.handle(Environ::new(Method::GET, "/missing"));
        assert_eq!(response.headers().get(http::header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_api_description_is_cached() {
        let mut app = App::new();
        app.add_route("/greeting", hello()).unwrap();
        let first = app.api_description() as *const Value;
        let second = app.api_description() as *const Value;
        assert_eq!(first, second);
        assert!(app.api_description().get("/greeting").is_some());
    }
}
