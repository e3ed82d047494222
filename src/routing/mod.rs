//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before traffic):
//!     get/post/put/delete(path, name, action)
//!     → action.rs (closure, or validated `Class:method` reference)
//!     → pattern.rs (compile literal / `{variable}` segments)
//!     → table.rs (unique name, registration order)
//!
//! Incoming Request (method, path)
//!     → matcher.rs (first route with same method and matching segments)
//!     → dispatcher.rs (strip bookkeeping, assemble arguments, invoke)
//!     → resolver.rs (reference handlers only)
//!     → Reply, or a 302 to the `404` / `500` route from router.rs
//! ```
//!
//! # Design Decisions
//! - Routes compiled at registration, read-only while serving
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)
//! - Failure pages are ordinary routes reached through a redirect

pub mod action;
pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod pattern;
pub mod resolver;
pub mod router;
pub mod table;

pub use action::{Action, ActionRef, Argument, Handler, HandlerError, Invocation, Reply};
pub use dispatcher::Dispatcher;
pub use error::{RouteError, RouteResult};
pub use matcher::{Bindings, MatchResult, Matcher};
pub use pattern::PathPattern;
pub use resolver::{Controller, ControllerRegistry, Resolver};
pub use router::Router;
pub use table::{RouteEntry, RouteTable, ERROR_ROUTE, NOT_FOUND_ROUTE};
