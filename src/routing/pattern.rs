//! Route template compilation and matching.
//!
//! # Responsibilities
//! - Compile a template such as `/route/{id}` into literal and variable segments
//! - Match a request path against the compiled segments
//! - Generate a URL from a template and parameter values
//!
//! # Design Decisions
//! - A variable occupies a whole segment; no partial, prefix or wildcard segments
//! - Segment counts must be equal for a match
//! - Request segments are percent-decoded before comparison and capture
//! - Variable names are unique within a template, duplicates fail compilation
//! - `_route` and `_handler` are reserved for routing bookkeeping

use std::fmt;

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::matcher::RESERVED_ATTRIBUTES;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A compiled route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a template.
    pub fn compile(template: &str) -> RouteResult<Self> {
        let invalid = |reason: String| RouteError::InvalidPattern {
            pattern: template.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        for raw in split_path(template) {
            let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    if name.is_empty() {
                        return Err(invalid("empty variable name".into()));
                    }
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid(format!("invalid variable name {name:?}")));
                    }
                    if RESERVED_ATTRIBUTES.contains(&name) {
                        return Err(invalid(format!("variable name {name:?} is reserved")));
                    }
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Variable(v) if v == name))
                    {
                        return Err(invalid(format!("variable {name:?} declared twice")));
                    }
                    Segment::Variable(name.to_string())
                }
                None if raw.contains(['{', '}']) => {
                    return Err(invalid(format!(
                        "segment {raw:?} mixes literal text and a variable"
                    )));
                }
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The one-segment literal pattern `/{segment}`.
    pub(crate) fn literal(segment: &str) -> Self {
        Self {
            template: format!("/{segment}"),
            segments: vec![Segment::Literal(segment.to_string())],
        }
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Variable names in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match `path`, returning the captured `(name, value)` pairs left to right.
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut bindings = Vec::new();
        for (segment, raw) in self.segments.iter().zip(parts) {
            let value = decode_segment(raw);
            match segment {
                Segment::Literal(literal) => {
                    if *literal != value {
                        return None;
                    }
                }
                Segment::Variable(name) => {
                    if value.is_empty() {
                        return None;
                    }
                    bindings.push((name.clone(), value));
                }
            }
        }
        Some(bindings)
    }

    /// Build a URL from this template.
    ///
    /// Values for variables are percent-encoded into their segments; remaining
    /// parameters are appended as a query string in the order given. Returns the
    /// name of the first variable without a value on failure.
    pub(crate) fn generate(&self, params: &[(&str, &str)]) -> Result<String, String> {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Variable(name) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| name.clone())?;
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }

        let extra: Vec<_> = params
            .iter()
            .filter(|(k, _)| !self.variables().any(|v| v == *k))
            .collect();
        if !extra.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(extra)
                .finish();
            path.push('?');
            path.push_str(&query);
        }
        Ok(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::compile("/route").unwrap();
        assert_eq!(pattern.match_path("/route"), Some(vec![]));
        assert_eq!(pattern.match_path("/route/1"), None);
        assert_eq!(pattern.match_path("/rout"), None);
        assert_eq!(pattern.match_path("/"), None);
    }

    #[test]
    fn test_root_match() {
        let pattern = PathPattern::compile("/").unwrap();
        assert_eq!(pattern.match_path("/"), Some(vec![]));
        assert_eq!(pattern.match_path("/foo"), None);
    }

    #[test]
    fn test_variables_captured_in_order() {
        let pattern = PathPattern::compile("/users/{user}/posts/{post}").unwrap();
        let bindings = pattern.match_path("/users/ann/posts/7").unwrap();
        assert_eq!(
            bindings,
            vec![
                ("user".to_string(), "ann".to_string()),
                ("post".to_string(), "7".to_string()),
            ]
        );
        assert_eq!(pattern.variables().collect::<Vec<_>>(), vec!["user", "post"]);
    }

    #[test]
    fn test_no_prefix_matching() {
        let pattern = PathPattern::compile("/route/{id}").unwrap();
        assert_eq!(pattern.match_path("/route"), None);
        assert_eq!(pattern.match_path("/route/"), None);
        assert_eq!(pattern.match_path("/route/1/extra"), None);
    }

    #[test]
    fn test_captured_values_are_decoded() {
        let pattern = PathPattern::compile("/greet/{name}").unwrap();
        let bindings = pattern.match_path("/greet/hello%20world").unwrap();
        assert_eq!(bindings[0].1, "hello world");
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let err = PathPattern::compile("/a/{id}/b/{id}").unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_reserved_variable_rejected() {
        for template in ["/x/{_route}", "/x/{_handler}"] {
            let err = PathPattern::compile(template).unwrap_err();
            assert!(matches!(err, RouteError::InvalidPattern { .. }), "{template}");
        }
        assert!(PathPattern::compile("/x/{_id}").is_ok());
    }

    #[test]
    fn test_malformed_segments_rejected() {
        assert!(PathPattern::compile("/a/{}").is_err());
        assert!(PathPattern::compile("/a/pre{id}").is_err());
        assert!(PathPattern::compile("/a/{id").is_err());
        assert!(PathPattern::compile("/a/{i-d}").is_err());
    }

    #[test]
    fn test_generate() {
        let pattern = PathPattern::compile("/foo/{id}").unwrap();
        let url = pattern.generate(&[("id", "a b"), ("q", "x&y")]).unwrap();
        assert_eq!(url, "/foo/a%20b?q=x%26y");

        assert_eq!(pattern.generate(&[("q", "1")]), Err("id".to_string()));
    }

    #[test]
    fn test_generate_query_only() {
        let pattern = PathPattern::compile("/500").unwrap();
        let url = pattern.generate(&[("error_details", "oops! it broke")]).unwrap();
        assert_eq!(url, "/500?error_details=oops%21+it+broke");
    }
}
