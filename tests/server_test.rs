//! The axum host in front of a router, driven in-process.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request as HttpRequest, StatusCode};
use tower::ServiceExt;

use junction::routing::{Action, HandlerError};
use junction::{HostConfig, HttpServer, Router};

fn server() -> HttpServer {
    let mut router = Router::new();
    router
        .get(
            "/route/{id}",
            "route_id",
            Action::inline(|inv| Ok(format!("ID: {}", inv.param(0).unwrap_or_default()).into())),
        )
        .unwrap();
    router
        .post(
            "/foo/{id}",
            "foo",
            Action::inline(|inv| {
                let message = inv.request().get("message").unwrap_or_default();
                Ok(format!("Request Message: {message} Id Passed in: {}", inv.param(0).unwrap_or_default()).into())
            }),
        )
        .unwrap();
    router
        .get(
            "/json",
            "json",
            Action::inline(|_| Ok(serde_json::json!({ "ok": true }).into())),
        )
        .unwrap();
    router
        .get("/boom", "boom", Action::inline(|_| Err(HandlerError::msg("it broke"))))
        .unwrap();

    let mut config = HostConfig::default();
    config.listener.max_body_bytes = 64;
    HttpServer::new(router, config)
}

async fn send(server: &HttpServer, request: HttpRequest<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = server.app().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn get(uri: &str) -> HttpRequest<Body> {
    HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_get_with_param() {
    let server = server();
    let (status, headers, body) = send(&server, get("/route/5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ID: 5");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_form_post() {
    let server = server();
    let request = HttpRequest::builder()
        .method("POST")
        .uri("/foo/6")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("message=hello+there"))
        .unwrap();

    let (status, _, body) = send(&server, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Request Message: hello there Id Passed in: 6");
}

#[tokio::test]
async fn test_json_reply() {
    let server = server();
    let (status, headers, body) = send(&server, get("/json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(body, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_not_found_redirect_followed() {
    let server = server();
    let (status, headers, _) = send(&server, get("/missing")).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/404");

    let (status, _, body) = send(&server, get("/404")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "oops! could not find what you were looking for.");
}

#[tokio::test]
async fn test_error_redirect_followed() {
    let server = server();
    let (status, headers, _) = send(&server, get("/boom")).await;
    assert_eq!(status, StatusCode::FOUND);
    let location = headers[header::LOCATION].to_str().unwrap().to_string();
    assert_eq!(location, "/500?error_details=it+broke");

    let (status, _, body) = send(&server, get(&location)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "it broke");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = server();
    let request = HttpRequest::builder()
        .uri("/route/1")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&server, request).await;
    assert_eq!(headers["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = server();
    let request = HttpRequest::builder()
        .method("POST")
        .uri("/foo/1")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("message=".to_string() + &"x".repeat(256)))
        .unwrap();
    let (status, _, _) = send(&server, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
