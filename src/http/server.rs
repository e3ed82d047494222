//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app that hands every request to one `Router`
//! - Convert Axum requests into router requests and replies back
//! - Wire up middleware (tracing, timeout, request ID, body limit)
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - The router is shared read-only via `Arc`; registration is finished before
//!   the server is built
//! - Matching and dispatch run synchronously inside the Axum handler
//! - Only `application/x-www-form-urlencoded` bodies are decoded into form input

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request as AxumRequest, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::HostConfig;
use crate::http::{ParameterBag, Request, Response};
use crate::routing::Router;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Application state injected into the handler.
#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
    max_body_bytes: usize,
}

/// HTTP server exposing a router.
pub struct HttpServer {
    app: AxumRouter,
    config: HostConfig,
}

impl HttpServer {
    /// Create a server for a fully registered router.
    pub fn new(router: Router, config: HostConfig) -> Self {
        let state = AppState {
            router: Arc::new(router),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &HostConfig, state: AppState) -> AxumRouter {
        AxumRouter::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum app, for embedding or in-process testing.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

/// Single entry point: every method and path goes through the router.
async fn dispatch_handler(State(state): State<AppState>, request: AxumRequest<Body>) -> AxumResponse {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let mut request = Request::new(parts.method.clone(), target)
        .with_version(parts.version)
        .with_headers(parts.headers.clone());
    if is_form(&parts.headers) {
        request.form = ParameterBag::from_urlencoded(&String::from_utf8_lossy(&bytes));
    }

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %request.path(),
        "Routing request"
    );

    let mut response = to_axum_response(state.router.process_request(request).into_response());
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

fn to_axum_response(response: Response) -> AxumResponse {
    let status = response.status();
    let mut headers = response.headers().clone();
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }

    let mut out = AxumResponse::new(Body::from(response.into_content()));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    out
}
