//! HTTP message handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body limit)
//!     → request.rs (method, path, query/form bags, attribute store)
//!     → routing::Router::process_request
//!     → response.rs (handler response, or 302 fallback)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Attributes, ParameterBag, Request};
pub use response::Response;
pub use server::{HttpServer, X_REQUEST_ID};
