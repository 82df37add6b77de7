//! A small, schema-first web framework.
//!
//! Resources declare which verbs they support and which body schema each verb
//! expects; the [`App`] owns the route table and turns every outcome, success
//! or failure, into a well-formed [`Response`]. Transport is out of scope:
//! [`App::handle`] consumes an [`Environ`] that any carrier can construct.
//!
//! ```
//! use restkit_schema::{Descriptor, ModelSchema};
//! use restkit_web::{App, Reply, Resource};
//! use http::StatusCode;
//! use once_cell::sync::Lazy;
//!
//! static ITEM: Lazy<ModelSchema> = Lazy::new(|| {
//!     ModelSchema::builder("Item")
//!         .field("name", Descriptor::String)
//!         .field("quantity", Descriptor::Integer)
//!         .build()
//! });
//!
//! let resource = Resource::builder()
//!     .post_with_body(&ITEM, |req| {
//!         let item = req.model().unwrap();
//!         Ok(Reply::ValueWithStatus(item.to_value(), StatusCode::CREATED))
//!     })
//!     .build();
//!
//! let mut app = App::new();
//! app.add_route("/items", resource).unwrap();
//!
//! let client = restkit_web::testing::TestClient::new(&app);
//! let response = client.post_json("/items", &serde_json::json!({"name": "Apple", "quantity": 3}));
//! assert_eq!(response.status_code(), 201);
//! ```

pub mod app;
pub mod auth;
pub mod environ;
pub mod error;
pub mod format;
pub mod logging;
pub mod request;
pub mod resource;
pub mod response;
pub mod testing;

pub use app::App;
pub use environ::Environ;
pub use error::{Error, RouteConflictError};
pub use format::{DefaultErrorFormatter, ErrorFormatter};
pub use request::{Body, ParamValue, Params, Request};
pub use resource::{Reply, Resource, ResourceBuilder, VERBS};
pub use response::Response;
