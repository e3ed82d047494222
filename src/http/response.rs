//! Outbound response representation.
//!
//! # Responsibilities
//! - Hold status, headers and string content produced by handlers
//! - Derive protocol defaults from the request (`prepare`)
//! - Build the 302 redirects used by the routing fallback
//!
//! # Design Decisions
//! - Content is text; handlers returning structured data use `Reply::Value`
//! - `prepare` only fills in what is missing, it never overrides handler choices

use std::time::SystemTime;

use http::{header, HeaderMap, HeaderValue, Method, StatusCode, Version};

use crate::http::request::Request;

const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// An HTTP response under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    content: String,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            content: String::new(),
        }
    }
}

impl Response {
    /// A 200 response with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// A 200 response with no content.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A 302 redirect to `url`.
    pub fn redirect(url: &str) -> Self {
        let mut response = Self::new(format!(
            "<!DOCTYPE html>\n<html><head><meta http-equiv=\"refresh\" content=\"0;url={url}\" />\
             <title>Redirecting to {url}</title></head>\
             <body>Redirecting to <a href=\"{url}\">{url}</a>.</body></html>"
        ))
        .with_status(StatusCode::FOUND);

        match HeaderValue::from_str(url) {
            Ok(value) => {
                response.headers.insert(header::LOCATION, value);
            }
            Err(e) => tracing::warn!(url = %url, error = %e, "Redirect target is not a valid header value"),
        }
        response
    }

    /// Fill in protocol defaults derived from `request`.
    ///
    /// Sets a default content type and a `Date` header when absent, answers in
    /// the request's HTTP version, and drops the body for HEAD requests.
    pub fn prepare(mut self, request: &Request) -> Self {
        self.version = request.version();

        if !self.headers.contains_key(header::CONTENT_TYPE) {
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            );
        }

        if !self.headers.contains_key(header::DATE) {
            let date = httpdate::fmt_http_date(SystemTime::now());
            if let Ok(value) = HeaderValue::from_str(&date) {
                self.headers.insert(header::DATE, value);
            }
        }

        if request.is_method(&Method::HEAD) {
            self.content.clear();
        }

        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = content.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Redirect target, if this is a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection() && self.headers.contains_key(header::LOCATION)
    }
}

impl From<&str> for Response {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Response {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}
