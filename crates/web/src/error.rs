use http::{Method, StatusCode};
use restkit_schema::SchemaError;
use thiserror::Error;

/// Setup-time failure: the path is already bound to a resource.
///
/// Registration never overwrites; the first registration stays in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("route `{path}` already registered")]
pub struct RouteConflictError {
    pub path: String,
}

/// Everything that can go wrong between route lookup and a handler's reply.
///
/// The dispatcher is the single catch boundary: nothing below it swallows
/// errors, and every variant maps onto a well-formed error response there.
#[derive(Debug, Error)]
pub enum Error {
    /// No resource matches the path, or a handler reported a missing entity.
    #[error("{message}")]
    NotFound { message: String, status: StatusCode },

    /// The route exists but the resource has no handler for the verb.
    #[error("method `{0}` not allowed")]
    MethodNotAllowed(Method),

    /// Body validation failed while constructing the request.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// An authenticator rejected the request.
    #[error("{message}")]
    Unauthorized { message: String },

    /// Anything unexpected; the client only ever sees a generic message.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// The default not-found error.
    pub fn not_found() -> Self {
        Error::NotFound { message: "Resource not found".to_owned(), status: StatusCode::NOT_FOUND }
    }

    /// A not-found error with a custom message and status.
    pub fn not_found_with(message: impl Into<String>, status: StatusCode) -> Self {
        Error::NotFound { message: message.into(), status }
    }

    pub fn unauthorized() -> Self {
        Error::Unauthorized { message: "Unauthorized".to_owned() }
    }

    pub fn internal(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Other(cause.into())
    }

    /// The response status this error maps to at the dispatch boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound { status, .. } => *status,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::Other(Box::new(cause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::MethodNotAllowed(Method::PUT).status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(Error::Schema(SchemaError::missing("name")).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(Error::unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::internal("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_default_message() {
        assert_eq!(Error::not_found().to_string(), "Resource not found");
    }
}
