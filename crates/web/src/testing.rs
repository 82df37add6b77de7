//! In-process test client.
//!
//! Drives an [`App`] without any transport: it builds [`Environ`]s the way a
//! real transport would and hands back the response in an easily assertable
//! form. Integration suites and downstream users share it.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};

use crate::app::App;
use crate::environ::Environ;
use crate::response::Response;

#[derive(Debug)]
pub struct TestClient<'app> {
    app: &'app App,
}

#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn from_response(response: &Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            // `App::handle` guarantees the body serializes
            body: response.body_bytes().unwrap_or_default(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body with an external JSON reader.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

impl<'app> TestClient<'app> {
    pub fn new(app: &'app App) -> Self {
        Self { app }
    }

    /// Sends a request with full control over headers and raw body.
    pub fn request(&self, method: Method, path: &str, headers: HeaderMap, body: Bytes) -> TestResponse {
        let (path, query_string) = match path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path, ""),
        };
        let mut environ = Environ::new(method, path)
            .with_query_string(query_string)
            .with_headers(headers);
        if !body.is_empty() {
            environ = environ.with_buffered_body(body);
        }
        TestResponse::from_response(&self.app.handle(environ))
    }

    pub fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, HeaderMap::new(), Bytes::new())
    }

    pub fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, HeaderMap::new(), Bytes::new())
    }

    pub fn post_json(&self, path: &str, json: &serde_json::Value) -> TestResponse {
        self.send_json(Method::POST, path, json)
    }

    pub fn put_json(&self, path: &str, json: &serde_json::Value) -> TestResponse {
        self.send_json(Method::PUT, path, json)
    }

    pub fn patch_json(&self, path: &str, json: &serde_json::Value) -> TestResponse {
        self.send_json(Method::PATCH, path, json)
    }

    fn send_json(&self, method: Method, path: &str, json: &serde_json::Value) -> TestResponse {
        let mut headers = HeaderMap::new();
        if let Ok(value) = mime::APPLICATION_JSON.as_ref().parse() {
            headers.insert(CONTENT_TYPE, value);
        }
        let body = Bytes::from(json.to_string());
        self.request(method, path, headers, body)
    }
}
