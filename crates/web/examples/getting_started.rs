use http::StatusCode;
use once_cell::sync::Lazy;
use restkit_schema::{Descriptor, ModelSchema, Value};
use restkit_web::testing::TestClient;
use restkit_web::{App, Reply, Resource};
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
        .post_with_body(&ITEM, |req| {
            let item = req.model().ok_or_else(|| restkit_web::Error::internal("missing body"))?;
            Ok(Reply::ValueWithStatus(item.to_value(), StatusCode::CREATED))
        })
        .build()
}

fn main() {
    restkit_web::logging::init(true);

    let mut app = App::new();
    app.set_default_header(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    app.add_route("/greeting", greeting()).unwrap();
    app.add_route("/items", items()).unwrap();

    let client = TestClient::new(&app);

    let response = client.get("/greeting");
    println!("GET /greeting -> {} {}", response.status_code(), response.text());

    let response = client.post_json("/items", &json!({"name": "Apple", "quantity": 10}));
    println!("POST /items -> {} {}", response.status_code(), response.text());

    // missing required field: rejected before the handler runs
    let response = client.post_json("/items", &json!({"name": "Apple"}));
    println!("POST /items -> {} {}", response.status_code(), response.text());

    println!("api description: {}", restkit_schema::ser::to_string(app.api_description()).unwrap());
}
