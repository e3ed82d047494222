//! Route registrations.
//!
//! # Responsibilities
//! - Own every `RouteEntry` in registration order
//! - Enforce unique route names
//! - Seed the `404` and `500` fallback routes
//! - Swap the handler of a fallback route on request
//! - Generate URLs for named routes
//!
//! # Design Decisions
//! - Registration order is match order (first registered wins)
//! - Default routes are registered first, so they are never shadowed
//! - The only post-construction mutation is a default-handler swap; method and
//!   pattern of a default route never change

use http::Method;

use crate::http::Response;
use crate::routing::action::{Handler, Reply};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::pattern::PathPattern;

/// Name of the fallback route for unmatched requests.
pub const NOT_FOUND_ROUTE: &str = "404";

/// Name of the fallback route for failed dispatches.
pub const ERROR_ROUTE: &str = "500";

/// Names of the routes seeded at construction.
pub const DEFAULT_ROUTES: [&str; 2] = [NOT_FOUND_ROUTE, ERROR_ROUTE];

/// Body rendered by the default `404` handler.
pub const NOT_FOUND_MESSAGE: &str = "oops! could not find what you were looking for.";

const ROUTE_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// A registered route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    name: String,
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

impl RouteEntry {
    /// Build an entry. The method is upper-cased and must be GET, POST, PUT or
    /// DELETE.
    pub fn new(
        name: impl Into<String>,
        method: &str,
        pattern: &str,
        handler: Handler,
    ) -> RouteResult<Self> {
        let upper = method.to_ascii_uppercase();
        let method = ROUTE_METHODS
            .iter()
            .find(|m| m.as_str() == upper)
            .cloned()
            .ok_or(RouteError::UnsupportedMethod(upper))?;

        Ok(Self {
            name: name.into(),
            method,
            pattern: PathPattern::compile(pattern)?,
            handler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// All routes known to a router.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// A table holding only the default routes.
    ///
    /// The default `500` handler renders the query parameter `error_param`.
    pub fn new(error_param: &str) -> Self {
        let error_param = error_param.to_string();
        let not_found = Handler::inline(|_| Ok(Response::new(NOT_FOUND_MESSAGE).into()));
        let error = Handler::inline(move |invocation| {
            let detail = invocation.request().get(&error_param).unwrap_or_default();
            Ok(Reply::from(Response::new(detail)))
        });

        let entries = vec![
            default_entry(NOT_FOUND_ROUTE, not_found),
            default_entry(ERROR_ROUTE, error),
        ];
        Self { entries }
    }

    /// Add a route. Fails if the name is taken, default names included.
    pub fn register(&mut self, entry: RouteEntry) -> RouteResult<()> {
        if self.entries.iter().any(|e| e.name == entry.name) {
            return Err(RouteError::DuplicateRouteName(entry.name));
        }
        tracing::debug!(
            route = %entry.name,
            method = %entry.method,
            pattern = %entry.pattern,
            handler = %entry.handler.describe(),
            "Route registered"
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Replace the handler of a default route.
    pub fn replace_default(&mut self, name: &str, handler: Handler) -> RouteResult<()> {
        if !DEFAULT_ROUTES.contains(&name) {
            return Err(RouteError::UnknownDefaultRoute(name.to_string()));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| RouteError::UnknownDefaultRoute(name.to_string()))?;
        entry.handler = handler;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// URL for a named route. Parameters fill pattern variables; the rest
    /// become the query string.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> RouteResult<String> {
        let entry = self
            .get(name)
            .ok_or_else(|| RouteError::RouteNotFound(format!("route {name:?}")))?;
        entry
            .pattern
            .generate(params)
            .map_err(|parameter| RouteError::MissingParameter {
                route: name.to_string(),
                parameter,
            })
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn default_entry(name: &str, handler: Handler) -> RouteEntry {
    RouteEntry {
        name: name.to_string(),
        method: Method::GET,
        pattern: PathPattern::literal(name),
        handler,
    }
}
