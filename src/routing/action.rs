//! Handler values and the invocation contract.
//!
//! # Responsibilities
//! - Represent a route handler as an inline closure or a `Class:method` reference
//! - Validate reference strings at registration
//! - Carry the ordered argument list a handler is invoked with
//!
//! # Design Decisions
//! - References are only carried and validated here; calling them is the job of
//!   a `Resolver`
//! - Argument order is fixed by construction: path values, then the request,
//!   then the prepared response for GET routes

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::http::{Request, Response};
use crate::routing::error::{RouteError, RouteResult};

/// Signature of inline handlers.
pub type HandlerFn = dyn Fn(Invocation) -> Result<Reply, HandlerError> + Send + Sync;

/// Errors raised by handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Message(String),

    /// A reference handler could not be located by the resolver.
    #[error("Unresolved action: {0}")]
    UnresolvedAction(String),

    /// A nested routing operation failed.
    #[error(transparent)]
    Routing(Box<RouteError>),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<RouteError> for HandlerError {
    fn from(err: RouteError) -> Self {
        Self::Routing(Box::new(err))
    }
}

/// A `Class:method` reference, qualified by namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionRef {
    pub namespace: String,
    pub class: String,
    pub method: String,
}

impl ActionRef {
    /// Parse `Class:method` or `ns::path::Class:method`.
    ///
    /// A bare class is qualified with `default_namespace`.
    pub fn parse(action: &str, default_namespace: &str) -> RouteResult<Self> {
        let invalid = || RouteError::InvalidActionReference(action.to_string());

        let (qualified, method) = split_action(action).ok_or_else(invalid)?;
        let (namespace, class) = match qualified.rsplit_once("::") {
            Some((namespace, class)) => (namespace, class),
            None => (default_namespace, qualified),
        };

        if !is_identifier(class) || !is_identifier(method) {
            return Err(invalid());
        }
        if !namespace.is_empty() && !namespace.split("::").all(is_identifier) {
            return Err(invalid());
        }

        Ok(Self {
            namespace: namespace.to_string(),
            class: class.to_string(),
            method: method.to_string(),
        })
    }

    /// Namespace-qualified class name.
    pub fn qualified_class(&self) -> String {
        if self.namespace.is_empty() {
            self.class.clone()
        } else {
            format!("{}::{}", self.namespace, self.class)
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.qualified_class(), self.method)
    }
}

/// Split on the last `:` that is not part of a `::`.
fn split_action(action: &str) -> Option<(&str, &str)> {
    let bytes = action.as_bytes();
    let index = (0..bytes.len()).rev().find(|&i| {
        bytes[i] == b':'
            && (i == 0 || bytes[i - 1] != b':')
            && bytes.get(i + 1) != Some(&b':')
    })?;
    Some((&action[..index], &action[index + 1..]))
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A route handler.
#[derive(Clone)]
pub enum Handler {
    Inline(Arc<HandlerFn>),
    Reference(ActionRef),
}

impl Handler {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(Invocation) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(f))
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Handler::Inline(_) => "<inline>".to_string(),
            Handler::Reference(action) => action.to_string(),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Inline(_) => f.write_str("Inline(..)"),
            Handler::Reference(action) => f.debug_tuple("Reference").field(action).finish(),
        }
    }
}

/// An action as supplied at registration, before validation.
pub enum Action {
    Handler(Handler),
    /// A `Class:method` string, validated when registered.
    Reference(String),
}

impl Action {
    /// Wrap a closure.
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(Invocation) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        Self::Handler(Handler::inline(f))
    }

    /// Resolve into a handler, validating reference strings.
    pub fn into_handler(self, default_namespace: &str) -> RouteResult<Handler> {
        match self {
            Action::Handler(handler) => Ok(handler),
            Action::Reference(action) => {
                ActionRef::parse(&action, default_namespace).map(Handler::Reference)
            }
        }
    }
}

impl From<Handler> for Action {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

impl From<&str> for Action {
    fn from(action: &str) -> Self {
        Self::Reference(action.to_string())
    }
}

impl From<String> for Action {
    fn from(action: String) -> Self {
        Self::Reference(action)
    }
}

/// One positional handler argument.
#[derive(Debug, Clone, Copy)]
pub enum Argument<'a> {
    Param(&'a str),
    Request(&'a Request),
    Response(&'a Response),
}

/// The arguments a handler is invoked with.
#[derive(Debug, Clone)]
pub struct Invocation {
    params: Vec<String>,
    request: Request,
    response: Option<Response>,
}

impl Invocation {
    pub(crate) fn new(params: Vec<String>, request: Request, response: Option<Response>) -> Self {
        Self {
            params,
            request,
            response,
        }
    }

    /// Positional arguments: path values, the request, then the prepared
    /// response when present.
    pub fn args(&self) -> Vec<Argument<'_>> {
        let mut args: Vec<Argument<'_>> = self.params.iter().map(|p| Argument::Param(p)).collect();
        args.push(Argument::Request(&self.request));
        if let Some(response) = &self.response {
            args.push(Argument::Response(response));
        }
        args
    }

    /// Path values in capture order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// The prepared response, or an empty one prepared for this request.
    pub fn take_response(&mut self) -> Response {
        match self.response.take() {
            Some(response) => response,
            None => Response::empty().prepare(&self.request),
        }
    }
}

/// What a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Response(Response),
    Value(serde_json::Value),
}

impl Reply {
    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Reply::Response(response) => Some(response),
            Reply::Value(_) => None,
        }
    }

    /// Convert to a response for the wire.
    ///
    /// Strings become the body as-is, other values are serialized as JSON.
    pub fn into_response(self) -> Response {
        match self {
            Reply::Response(response) => response,
            Reply::Value(serde_json::Value::String(s)) => Response::new(s),
            Reply::Value(value) => {
                let mut response = Response::new(value.to_string());
                response.headers_mut().insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/json"),
                );
                response
            }
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<serde_json::Value> for Reply {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<u16> for Reply {
    fn from(value: u16) -> Self {
        Self::Value(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_parse_bare_class() {
        let action = ActionRef::parse("Greeter:hello", "app::controllers").unwrap();
        assert_eq!(action.namespace, "app::controllers");
        assert_eq!(action.class, "Greeter");
        assert_eq!(action.method, "hello");
        assert_eq!(action.to_string(), "app::controllers::Greeter:hello");
    }

    #[test]
    fn test_parse_qualified_class() {
        let action = ActionRef::parse("admin::Users:delete", "app").unwrap();
        assert_eq!(action.namespace, "admin");
        assert_eq!(action.qualified_class(), "admin::Users");
        assert_eq!(action.method, "delete");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["Greeter", "Greeter:", ":hello", "Greeter::hello", "Gre eter:hello", "a:b:c", ""] {
            let err = ActionRef::parse(bad, "app").unwrap_err();
            assert!(
                matches!(err, RouteError::InvalidActionReference(_)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invocation_args_order() {
        let request = Request::new(Method::GET, "/foo/6");
        let response = Response::empty().prepare(&request);
        let invocation = Invocation::new(vec!["6".into(), "x".into()], request, Some(response));

        let args = invocation.args();
        assert_eq!(args.len(), 4);
        assert!(matches!(args[0], Argument::Param("6")));
        assert!(matches!(args[1], Argument::Param("x")));
        assert!(matches!(args[2], Argument::Request(_)));
        assert!(matches!(args[3], Argument::Response(_)));
    }

    #[test]
    fn test_reply_into_response() {
        let res = Reply::from("route").into_response();
        assert_eq!(res.content(), "route");
        assert_eq!(res.status(), http::StatusCode::OK);

        let res = Reply::from(200u16).into_response();
        assert_eq!(res.content(), "200");
        assert_eq!(
            res.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
