//! Router facade: registration and per-request processing.
//!
//! # Request States
//! ```text
//! Matching ──no match──────────────▶ NotFoundFallback (302 → /404)
//!    │
//!    ▼
//! Dispatching ──RouteNotFound / HandlerFailure──▶ ErrorFallback (302 → /500?error_details=…)
//!    │
//!    ▼
//! Succeeded (handler reply, unchanged)
//! ```
//!
//! # Design Decisions
//! - Fallback routes are never invoked inline; they run when the client follows
//!   the redirect back into this router
//! - Only a string survives the redirect hop; see `RouteError::detail`
//! - Registration and default overrides take `&mut self`, so they cannot overlap
//!   with request processing through a shared router

use std::sync::Arc;

use crate::config::RouterConfig;
use crate::http::{Request, Response};
use crate::routing::action::{Action, Reply};
use crate::routing::dispatcher::Dispatcher;
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::matcher::Matcher;
use crate::routing::resolver::Resolver;
use crate::routing::table::{RouteEntry, RouteTable, DEFAULT_ROUTES, ERROR_ROUTE, NOT_FOUND_ROUTE};

/// HTTP request router.
pub struct Router {
    table: RouteTable,
    dispatcher: Dispatcher,
    config: RouterConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router with default configuration and the `404`/`500` routes.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            table: RouteTable::new(&config.error_detail_param),
            dispatcher: Dispatcher::new(),
            config,
        }
    }

    /// Use `resolver` for `Class:method` actions.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.dispatcher.set_resolver(resolver);
        self
    }

    pub fn set_resolver(&mut self, resolver: Arc<dyn Resolver>) {
        self.dispatcher.set_resolver(resolver);
    }

    /// Register a GET route.
    pub fn get(&mut self, path: &str, name: &str, action: impl Into<Action>) -> RouteResult<()> {
        self.add_route("GET", path, name, action)
    }

    /// Register a POST route.
    pub fn post(&mut self, path: &str, name: &str, action: impl Into<Action>) -> RouteResult<()> {
        self.add_route("POST", path, name, action)
    }

    /// Register a PUT route.
    pub fn put(&mut self, path: &str, name: &str, action: impl Into<Action>) -> RouteResult<()> {
        self.add_route("PUT", path, name, action)
    }

    /// Register a DELETE route.
    pub fn delete(&mut self, path: &str, name: &str, action: impl Into<Action>) -> RouteResult<()> {
        self.add_route("DELETE", path, name, action)
    }

    /// Register a route for `method` (case-insensitive).
    ///
    /// A string action must have the form `Class:method`.
    pub fn add_route(
        &mut self,
        method: &str,
        path: &str,
        name: &str,
        action: impl Into<Action>,
    ) -> RouteResult<()> {
        let handler = action.into().into_handler(&self.config.default_namespace)?;
        let entry = RouteEntry::new(name, method, path, handler)?;
        self.table.register(entry)
    }

    /// Replace the handler of the `404` or `500` route.
    ///
    /// Any other name fails with `UnknownDefaultRoute` and leaves the table
    /// untouched.
    pub fn override_default_route(&mut self, name: &str, action: impl Into<Action>) -> RouteResult<()> {
        if !DEFAULT_ROUTES.contains(&name) {
            return Err(RouteError::UnknownDefaultRoute(name.to_string()));
        }
        let handler = action.into().into_handler(&self.config.default_namespace)?;
        let description = handler.describe();
        self.table.replace_default(name, handler)?;
        tracing::info!(route = %name, handler = %description, "Default route overridden");
        Ok(())
    }

    /// Route a request.
    ///
    /// Returns the handler's reply unchanged, or a 302 redirect to the `404`
    /// route (no match) or the `500` route (failed dispatch).
    pub fn process_request(&self, request: Request) -> Reply {
        let method = request.method().clone();
        let path = request.path().to_string();

        let result = Matcher::new(&self.table).match_request(&request);
        if !result.is_match() {
            tracing::warn!(method = %method, path = %path, "No route matched");
            return Response::redirect(&self.not_found_url()).into();
        }

        match self.dispatcher.dispatch(result, request) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(method = %method, path = %path, error = %err, "Dispatch failed");
                Response::redirect(&self.error_url(&err)).into()
            }
        }
    }

    /// URL of a named route; see `RouteTable::url_for`.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> RouteResult<String> {
        self.table.url_for(name, params)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn not_found_url(&self) -> String {
        self.table
            .url_for(NOT_FOUND_ROUTE, &[])
            .unwrap_or_else(|_| format!("/{NOT_FOUND_ROUTE}"))
    }

    fn error_url(&self, err: &RouteError) -> String {
        let detail = err.detail();
        let params = [(self.config.error_detail_param.as_str(), detail.as_str())];
        self.table
            .url_for(ERROR_ROUTE, &params)
            .unwrap_or_else(|_| format!("/{ERROR_ROUTE}"))
    }
}
