//! End-to-end dispatch tests, driven through the in-process test client.

use http::StatusCode;
use once_cell::sync::Lazy;
use restkit_schema::{Descriptor, ModelSchema, Value};
use restkit_web::auth::ApiKeyAuthenticator;
use restkit_web::testing::TestClient;
use restkit_web::{App, Error, ErrorFormatter, Reply, Resource};
use serde_json::json;

static ITEM: Lazy<ModelSchema> = Lazy::new(|| {
    ModelSchema::builder("Item")
        .field("name", Descriptor::String)
        .field("quantity", Descriptor::Integer)
        .field_with_default("description", Descriptor::optional(Descriptor::String), Value::Null)
        .build()
});

fn greeting() -> Resource {
    Resource::builder()
        .get(|_req| {
            let mut body = indexmap::IndexMap::new();
            body.insert("message".to_owned(), Value::from("Hello, world!"));
            Ok(Reply::Value(Value::Map(body)))
        })
        .build()
}

fn items() -> Resource {
    Resource::builder()
        .post_with_body(Lazy::force(&ITEM), |req| {
            let item = req.model().expect("validated body");
            Ok(Reply::ValueWithStatus(item.to_value(), StatusCode::CREATED))
        })
        .build()
}

fn app() -> App {
    let mut app = App::new();
    app.add_route("/greeting", greeting()).unwrap();
    app.add_route("/items", items()).unwrap();
    app
}

#[test]
fn test_get_returns_canonical_json() {
    let app = app();
    let client = TestClient::new(&app);

    let response = client.get("/greeting");
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), r#"{"message": "Hello, world!"}"#);
}

#[test]
fn test_post_with_valid_body_is_created() {
    let app = app();
    let client = TestClient::new(&app);

    let response = client.post_json("/items", &json!({"name": "Apple", "quantity": 10}));
    assert_eq!(response.status_code(), 201);
    // fields come back in declaration order, absent optional filled with null
    assert_eq!(response.text(), r#"{"name": "Apple", "quantity": 10, "description": null}"#);
}

#[test]
fn test_missing_required_field_is_unprocessable() {
    let app = app();
    let client = TestClient::new(&app);

    let response = client.post_json("/items", &json!({"name": "Apple"}));
    assert_eq!(response.status_code(), 422);
    let body = response.json().unwrap();
    assert_eq!(body["title"], "Missing required field");
    assert_eq!(body["field"], "quantity");
}

#[test]
fn test_empty_body_with_declared_model_is_unprocessable() {
    let app = app();
    let client = TestClient::new(&app);

    let response =
        client.request(http::Method::POST, "/items", http::HeaderMap::new(), bytes::Bytes::new());
    assert_eq!(response.status_code(), 422);
    let body = response.json().unwrap();
    assert_eq!(body["title"], "Missing required field");
    assert_eq!(body["field"], "name");
}

#[test]
fn test_wrong_type_is_unprocessable() {
    let app = app();
    let client = TestClient::new(&app);

    let response = client.post_json("/items", &json!({"name": "Apple", "quantity": "ten"}));
    assert_eq!(response.status_code(), 422);
    let body = response.json().unwrap();
    assert_eq!(body["field"], "quantity");
    assert_eq!(body["expected"], "integer");
}

#[test]
fn test_unknown_path_is_not_found() {
    let app = app();
    let client = TestClient::new(&app);

    let response = client.get("/nothing-here");
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json().unwrap()["title"], "Resource not found");
}

#[test]
fn test_unregistered_verb_is_named_in_the_error() {
    let app = app();
    let client = TestClient::new(&app);

    let response = client.delete("/greeting");
    assert_eq!(response.status_code(), 405);
    let body = response.json().unwrap();
    assert!(body["title"].as_str().unwrap().contains("DELETE"));
}

#[test]
fn test_query_params_reach_the_handler() {
    let mut app = App::new();
    app.add_route(
        "/echo",
        Resource::builder()
            .get(|req| {
                let name = req.param("name").map(|p| p.first().to_owned()).unwrap_or_default();
                Ok(Reply::Value(Value::from(name)))
            })
            .build(),
    )
    .unwrap();
    let client = TestClient::new(&app);

    let response = client.get("/echo?name=Ada");
    assert_eq!(response.text(), r#""Ada""#);
}

#[test]
fn test_default_headers_are_applied_everywhere() {
    let mut app = app();
    app.set_default_header(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    let client = TestClient::new(&app);

    let ok = client.get("/greeting");
    assert_eq!(ok.headers().get(http::header::CONTENT_TYPE).unwrap(), "application/json");

    let not_found = client.get("/nothing-here");
    assert_eq!(not_found.headers().get(http::header::CONTENT_TYPE).unwrap(), "application/json");
}

#[test]
fn test_custom_error_formatter_shapes_every_error_body() {
    struct Problem;
    impl ErrorFormatter for Problem {
        fn format(&self, message: &str) -> Value {
            let mut body = indexmap::IndexMap::new();
            body.insert("detail".to_owned(), Value::from(message));
            Value::Map(body)
        }
    }

    let mut app = app();
    app.set_error_formatter(Problem);
    let client = TestClient::new(&app);

    let response = client.get("/nothing-here");
    assert_eq!(response.json().unwrap()["detail"], "Resource not found");
}

#[test]
fn test_handler_error_is_generic_unless_debug() {
    fn boom() -> Resource {
        Resource::builder().get(|_req| Err(Error::internal("connection pool exhausted"))).build()
    }

    let mut app = App::new();
    app.add_route("/boom", boom()).unwrap();
    let client = TestClient::new(&app);
    let response = client.get("/boom");
    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json().unwrap()["title"], "Internal server error");

    let mut app = App::new();
    app.set_debug(true);
    app.add_route("/boom", boom()).unwrap();
    let client = TestClient::new(&app);
    let response = client.get("/boom");
    assert_eq!(response.json().unwrap()["title"], "connection pool exhausted");
}

#[test]
fn test_api_key_authentication() {
    let mut app = app();
    app.set_authenticator(ApiKeyAuthenticator::new([("secret".to_owned(), Value::from("client-1"))]));
    let client = TestClient::new(&app);

    let response = client.get("/greeting");
    assert_eq!(response.status_code(), 401);

    let mut headers = http::HeaderMap::new();
    headers.insert("x-api-key", "secret".parse().unwrap());
    let response = client.request(http::Method::GET, "/greeting", headers, bytes::Bytes::new());
    assert_eq!(response.status_code(), 200);
}

#[test]
fn test_api_description_lists_routes_and_schemas() {
    let app = app();
    let description = app.api_description();

    let items = description.get("/items").and_then(|v| v.get("POST")).unwrap();
    let properties = items.get("properties").unwrap();
    assert!(properties.get("name").is_some());

    let greeting = description.get("/greeting").and_then(|v| v.get("GET")).unwrap();
    assert_eq!(greeting, &Value::Map(indexmap::IndexMap::new()));
}
