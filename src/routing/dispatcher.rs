//! Handler invocation for matched routes.
//!
//! # Data Flow
//! ```text
//! MatchResult + Request
//!     → record match attributes on the request
//!     → strip `_route` / `_handler`
//!     → arguments: bound values (capture order), Request, [Response if GET]
//!     → inline closure, or Resolver for `Class:method` references
//!     → Reply (unchanged) or HandlerFailure
//! ```
//!
//! Failures are returned, never recovered here; the router decides what a
//! failure turns into.

use std::sync::Arc;

use http::Method;

use crate::http::{Request, Response};
use crate::routing::action::{Handler, HandlerError, Invocation, Reply};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::matcher::{MatchResult, RESERVED_ATTRIBUTES};
use crate::routing::resolver::Resolver;
use crate::routing::table::RouteEntry;

/// Assembles arguments and invokes handlers.
#[derive(Clone, Default)]
pub struct Dispatcher {
    resolver: Option<Arc<dyn Resolver>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `resolver` for `Class:method` handlers.
    pub fn set_resolver(&mut self, resolver: Arc<dyn Resolver>) {
        self.resolver = Some(resolver);
    }

    /// Build the invocation for a match.
    pub fn prepare<'a>(
        &self,
        result: &MatchResult<'a>,
        mut request: Request,
    ) -> RouteResult<(&'a RouteEntry, Invocation)> {
        let entry = result.entry().ok_or_else(|| {
            RouteError::RouteNotFound(format!("{} {}", request.method(), request.path()))
        })?;

        request.attributes.extend(result.attributes());
        for key in RESERVED_ATTRIBUTES {
            request.attributes.remove(key);
        }

        // Attributes the host set earlier keep their slot in the bag, so
        // positional values come from the bindings alone.
        let params: Vec<String> = result
            .bindings()
            .map(|b| b.iter().map(|(_, v)| v.to_string()).collect())
            .unwrap_or_default();
        let response = if *entry.method() == Method::GET {
            Some(Response::empty().prepare(&request))
        } else {
            None
        };

        Ok((entry, Invocation::new(params, request, response)))
    }

    /// Invoke the matched handler and return its reply unchanged.
    pub fn dispatch(&self, result: MatchResult<'_>, request: Request) -> RouteResult<Reply> {
        let (entry, invocation) = self.prepare(&result, request)?;

        tracing::debug!(
            route = %entry.name(),
            args = invocation.params().len() + 1 + usize::from(invocation.response().is_some()),
            "Dispatching"
        );

        let outcome = match entry.handler() {
            Handler::Inline(f) => f(invocation),
            Handler::Reference(action) => match &self.resolver {
                Some(resolver) => resolver.resolve(action, invocation),
                None => Err(HandlerError::UnresolvedAction(format!(
                    "no resolver configured for {action}"
                ))),
            },
        };
        outcome.map_err(RouteError::HandlerFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::action::Argument;
    use crate::routing::matcher::Matcher;
    use crate::routing::table::RouteTable;

    fn table() -> RouteTable {
        let mut table = RouteTable::new("error_details");
        table
            .register(
                RouteEntry::new(
                    "show",
                    "GET",
                    "/users/{user}/posts/{post}",
                    Handler::inline(|inv| Ok(Reply::from(inv.params().join(",")))),
                )
                .unwrap(),
            )
            .unwrap();
        table
            .register(
                RouteEntry::new(
                    "update",
                    "PUT",
                    "/users/{user}",
                    Handler::inline(|inv| Ok(Reply::from(inv.args().len() as u16))),
                )
                .unwrap(),
            )
            .unwrap();
        table
            .register(
                RouteEntry::new(
                    "boom",
                    "DELETE",
                    "/boom",
                    Handler::inline(|_| Err(HandlerError::msg("error"))),
                )
                .unwrap(),
            )
            .unwrap();
        table
            .register(
                RouteEntry::new(
                    "greet",
                    "GET",
                    "/greet",
                    Handler::Reference(
                        crate::routing::action::ActionRef::parse("Greeter:hello", "app").unwrap(),
                    ),
                )
                .unwrap(),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_not_found_fails() {
        let table = table();
        let request = Request::new(Method::GET, "/xxx");
        let result = Matcher::new(&table).match_request(&request);
        let err = Dispatcher::new().dispatch(result, request).unwrap_err();
        assert!(matches!(err, RouteError::RouteNotFound(_)));
    }

    #[test]
    fn test_get_arguments() {
        let table = table();
        let request = Request::new(Method::GET, "/users/ann/posts/7");
        let result = Matcher::new(&table).match_request(&request);
        let (entry, invocation) = Dispatcher::new().prepare(&result, request).unwrap();

        assert_eq!(entry.name(), "show");
        let args = invocation.args();
        assert_eq!(args.len(), 4);
        assert!(matches!(args[0], Argument::Param("ann")));
        assert!(matches!(args[1], Argument::Param("7")));
        assert!(matches!(args[2], Argument::Request(_)));
        assert!(matches!(args[3], Argument::Response(_)));
    }

    #[test]
    fn test_params_follow_capture_order_over_host_attributes() {
        let table = table();
        let mut request = Request::new(Method::GET, "/users/ann/posts/7");
        request.attributes.insert("post", "stale");
        request.attributes.insert("session", "abc");
        let result = Matcher::new(&table).match_request(&request);
        let (_, invocation) = Dispatcher::new().prepare(&result, request).unwrap();

        assert_eq!(invocation.params(), ["ann", "7"]);
        assert_eq!(invocation.args().len(), 4);
        assert_eq!(invocation.request().get("post"), Some("7"));
        assert_eq!(invocation.request().get("session"), Some("abc"));
    }

    #[test]
    fn test_bookkeeping_stripped() {
        let table = table();
        let request = Request::new(Method::GET, "/users/ann/posts/7");
        let result = Matcher::new(&table).match_request(&request);
        let (_, invocation) = Dispatcher::new().prepare(&result, request).unwrap();

        let attributes = &invocation.request().attributes;
        assert!(!attributes.contains("_route"));
        assert!(!attributes.contains("_handler"));
        assert_eq!(attributes.get("user"), Some("ann"));
    }

    #[test]
    fn test_non_get_has_no_response() {
        let table = table();
        let request = Request::create(Method::PUT, "/users/ann", [("name", "Ann")]);
        let result = Matcher::new(&table).match_request(&request);
        let reply = Dispatcher::new().dispatch(result, request).unwrap();
        assert_eq!(reply, Reply::from(2u16));
    }

    #[test]
    fn test_reply_returned_unchanged() {
        let table = table();
        let request = Request::new(Method::GET, "/users/ann/posts/7");
        let result = Matcher::new(&table).match_request(&request);
        let reply = Dispatcher::new().dispatch(result, request).unwrap();
        assert_eq!(reply, Reply::from("ann,7"));
    }

    #[test]
    fn test_handler_failure_propagates() {
        let table = table();
        let request = Request::new(Method::DELETE, "/boom");
        let result = Matcher::new(&table).match_request(&request);
        let err = Dispatcher::new().dispatch(result, request).unwrap_err();
        assert!(matches!(err, RouteError::HandlerFailure(HandlerError::Message(ref m)) if m == "error"));
    }

    #[test]
    fn test_reference_without_resolver() {
        let table = table();
        let request = Request::new(Method::GET, "/greet");
        let result = Matcher::new(&table).match_request(&request);
        let err = Dispatcher::new().dispatch(result, request).unwrap_err();
        assert!(matches!(
            err,
            RouteError::HandlerFailure(HandlerError::UnresolvedAction(_))
        ));
    }
}
