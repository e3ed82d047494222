//! Routing error taxonomy.
//!
//! Configuration-time failures (`DuplicateRouteName`, `UnknownDefaultRoute`,
//! `InvalidActionReference`, `InvalidPattern`, `UnsupportedMethod`) are returned
//! to the registering caller. `RouteNotFound` and `HandlerFailure` are recovered by
//! the router's redirect fallback.

use thiserror::Error;

use crate::routing::action::HandlerError;

/// Errors produced while registering, matching or dispatching routes.
#[derive(Debug, Error)]
pub enum RouteError {
    /// No route matched a request (`GET /path`) or a name lookup (`route "x"`).
    #[error("No route found for {0}")]
    RouteNotFound(String),

    /// Override requested for a name that is not one of the default routes.
    #[error("{0} does not exist in the default routes container")]
    UnknownDefaultRoute(String),

    /// Action string is not of the form `Class:method`.
    #[error("Invalid action reference: {0}")]
    InvalidActionReference(String),

    /// A route with this name is already registered.
    #[error("Route name already registered: {0}")]
    DuplicateRouteName(String),

    /// The handler returned an error.
    #[error("Handler failed: {0}")]
    HandlerFailure(#[source] HandlerError),

    /// The route template could not be compiled.
    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Routes may only be registered for GET, POST, PUT and DELETE.
    #[error("Unsupported route method: {0}")]
    UnsupportedMethod(String),

    /// URL generation lacked a value for a pattern variable.
    #[error("Missing parameter {parameter:?} to generate a URL for route {route:?}")]
    MissingParameter { route: String, parameter: String },
}

impl RouteError {
    /// Text carried to the error route when this failure is recovered.
    ///
    /// Handler failures report the handler's own message; every other variant
    /// reports itself.
    pub fn detail(&self) -> String {
        match self {
            RouteError::HandlerFailure(inner) => inner.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_unwraps_handler_failure() {
        let err = RouteError::HandlerFailure(HandlerError::msg("boom"));
        assert_eq!(err.detail(), "boom");
        assert_eq!(err.to_string(), "Handler failed: boom");
    }

    #[test]
    fn test_detail_of_other_variants() {
        let err = RouteError::RouteNotFound("GET /x".into());
        assert_eq!(err.detail(), "No route found for GET /x");
    }
}
