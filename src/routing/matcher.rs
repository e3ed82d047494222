//! Route matching logic.
//!
//! # Responsibilities
//! - Scan the route table in registration order
//! - Match method exactly and path segment by segment
//! - Produce ordered bindings for the first matching route
//!
//! # Design Decisions
//! - First registered route wins
//! - A path registered only under another method is a plain no-match; there is
//!   no separate "method not allowed" outcome
//! - Bookkeeping attributes (`_route`, `_handler`) travel with the bindings so
//!   the dispatcher can strip them

use http::Method;

use crate::http::Request;
use crate::routing::table::{RouteEntry, RouteTable};

/// Attribute carrying the matched route name.
pub const ROUTE_ATTRIBUTE: &str = "_route";

/// Attribute carrying a description of the matched handler.
pub const HANDLER_ATTRIBUTE: &str = "_handler";

/// Routing-internal attribute names, never passed to handlers.
pub const RESERVED_ATTRIBUTES: [&str; 2] = [ROUTE_ATTRIBUTE, HANDLER_ATTRIBUTE];

/// `(name, value)` pairs captured from a path, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(Vec<(String, String)>);

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<Vec<(String, String)>> for Bindings {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

/// Outcome of matching one request.
#[derive(Debug)]
pub enum MatchResult<'a> {
    Matched {
        entry: &'a RouteEntry,
        bindings: Bindings,
    },
    NotFound,
}

impl<'a> MatchResult<'a> {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    pub fn entry(&self) -> Option<&'a RouteEntry> {
        match self {
            MatchResult::Matched { entry, .. } => Some(*entry),
            MatchResult::NotFound => None,
        }
    }

    pub fn bindings(&self) -> Option<&Bindings> {
        match self {
            MatchResult::Matched { bindings, .. } => Some(bindings),
            MatchResult::NotFound => None,
        }
    }

    /// Attributes recorded on the request for this match: routing
    /// bookkeeping first, then bindings in capture order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        match self {
            MatchResult::Matched { entry, bindings } => {
                let mut attributes = vec![
                    (ROUTE_ATTRIBUTE.to_string(), entry.name().to_string()),
                    (HANDLER_ATTRIBUTE.to_string(), entry.handler().describe()),
                ];
                attributes.extend(bindings.0.iter().cloned());
                attributes
            }
            MatchResult::NotFound => Vec::new(),
        }
    }
}

/// Matches requests against a route table.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    table: &'a RouteTable,
}

impl<'a> Matcher<'a> {
    pub fn new(table: &'a RouteTable) -> Self {
        Self { table }
    }

    /// Find the first route registered for `method` whose pattern matches `path`.
    pub fn match_path(&self, method: &Method, path: &str) -> MatchResult<'a> {
        for entry in self.table.iter() {
            if entry.method() != method {
                continue;
            }
            if let Some(bindings) = entry.pattern().match_path(path) {
                tracing::debug!(route = %entry.name(), method = %method, path = %path, "Route matched");
                return MatchResult::Matched {
                    entry,
                    bindings: bindings.into(),
                };
            }
        }
        MatchResult::NotFound
    }

    pub fn match_request(&self, request: &Request) -> MatchResult<'a> {
        self.match_path(request.method(), request.path())
    }
}
