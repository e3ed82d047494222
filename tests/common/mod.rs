//! Shared utilities for integration tests.

use http::{Method, StatusCode};
use junction::{Reply, Request, Response, Router};

/// Assert `reply` is a 302 and return its target.
pub fn redirect_target(reply: &Reply) -> String {
    let response = reply
        .as_response()
        .unwrap_or_else(|| panic!("expected a redirect response, got {reply:?}"));
    assert_eq!(response.status(), StatusCode::FOUND);
    response
        .location()
        .expect("redirect without Location header")
        .to_string()
}

/// Follow a redirect the way a client would: GET the `Location` target on
/// the same router.
#[allow(dead_code)]
pub fn follow(router: &Router, reply: &Reply) -> Response {
    let target = redirect_target(reply);
    router
        .process_request(Request::new(Method::GET, &target))
        .into_response()
}
