//! In-process HTTP request routing.
//!
//! Register `(method, pattern) → handler` routes, match incoming requests,
//! invoke handlers with a deterministic argument list, and recover from
//! unmatched or failing requests by redirecting to the `404` and `500` routes.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::HostConfig;
pub use crate::http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use routing::{Action, HandlerError, Invocation, Reply, RouteError, Router};
