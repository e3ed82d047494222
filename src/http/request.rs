//! Inbound request representation.
//!
//! # Responsibilities
//! - Carry method, path, version and headers of an incoming request
//! - Hold query and form input as ordered parameter bags
//! - Provide the attribute store that routing writes bindings into
//!
//! # Design Decisions
//! - Parameter bags preserve insertion order; handler arguments are built by
//!   iterating the attribute store, so its order must be deterministic
//! - Replacing an existing key keeps its original position
//! - `get` resolves attributes first, then query, then form input

use http::{HeaderMap, Method, Version};

/// Insertion-ordered string map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBag {
    entries: Vec<(String, String)>,
}

/// The request attribute store.
pub type Attributes = ParameterBag;

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string.
    pub fn from_urlencoded(input: &str) -> Self {
        let mut bag = Self::new();
        for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
            bag.insert(key, value);
        }
        bag
    }

    /// Insert a value. An existing key is overwritten in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert every pair, in order.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An HTTP request as seen by the router.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    version: Version,
    headers: HeaderMap,
    /// Query string parameters.
    pub query: ParameterBag,
    /// Urlencoded body parameters.
    pub form: ParameterBag,
    /// Routing attributes (path bindings and routing bookkeeping).
    pub attributes: Attributes,
}

impl Request {
    /// Create a request for a target such as `/foo/6?message=hi`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, ParameterBag::from_urlencoded(query)),
            None => (target, ParameterBag::new()),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            method,
            path: path.to_string(),
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            query,
            form: ParameterBag::new(),
            attributes: Attributes::new(),
        }
    }

    /// Create a request carrying input parameters.
    ///
    /// Parameters go to the query for GET and HEAD, and to the form body for
    /// every other method.
    pub fn create<I, K, V>(method: Method, target: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new(method, target);
        if request.method == Method::GET || request.method == Method::HEAD {
            request.query.extend(params);
        } else {
            request.form.extend(params);
        }
        request
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_method(&self, method: &Method) -> bool {
        self.method == *method
    }

    /// Raw request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Look up a parameter in attributes, then query, then form input.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .or_else(|| self.query.get(key))
            .or_else(|| self.form.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_preserves_insertion_order() {
        let mut bag = ParameterBag::new();
        bag.insert("b", "1");
        bag.insert("a", "2");
        bag.insert("c", "3");
        bag.insert("a", "4");

        let pairs: Vec<_> = bag.iter().collect();
        assert_eq!(pairs, vec![("b", "1"), ("a", "4"), ("c", "3")]);
    }

    #[test]
    fn test_bag_remove() {
        let mut bag = ParameterBag::new();
        bag.insert("id", "6");
        bag.insert("_route", "foo");

        assert_eq!(bag.remove("_route").as_deref(), Some("foo"));
        assert_eq!(bag.remove("_route"), None);
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_new_splits_query() {
        let req = Request::new(Method::GET, "/500?error_details=oops%21+Something");
        assert_eq!(req.path(), "/500");
        assert_eq!(req.get("error_details"), Some("oops! Something"));
    }

    #[test]
    fn test_create_places_params_by_method() {
        let get = Request::create(Method::GET, "/foo", [("message", "hi")]);
        assert_eq!(get.query.get("message"), Some("hi"));
        assert!(get.form.is_empty());

        let post = Request::create(Method::POST, "/foo", [("message", "hi")]);
        assert_eq!(post.form.get("message"), Some("hi"));
        assert!(post.query.is_empty());
    }

    #[test]
    fn test_get_prefers_attributes() {
        let mut req = Request::create(Method::GET, "/foo?id=query", [("id", "ignored")]);
        assert_eq!(req.get("id"), Some("ignored"));

        req.attributes.insert("id", "path");
        assert_eq!(req.get("id"), Some("path"));
        assert_eq!(req.get("missing"), None);
    }
}
