//! Demo host for the junction router.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http::server (Axum, request ID, limits)    │
//!                              │        │                                     │
//!                              │        ▼                                     │
//!                              │   routing::Router                            │
//!                              │     matcher → dispatcher → handler/resolver  │
//!                              │        │                                     │
//!     Client Response          │        ▼                                     │
//!     ◀────────────────────────┼── reply, or 302 → /404 | /500?error_details  │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use junction::config::{load_config, HostConfig};
use junction::http::HttpServer;
use junction::lifecycle::{signals, Shutdown};
use junction::observability::logging;
use junction::routing::{
    Action, Controller, ControllerRegistry, HandlerError, Invocation, Reply, Router,
};

#[derive(Parser)]
#[command(name = "junction")]
#[command(about = "Serve a demo route table over HTTP", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

struct Greeter;

impl Controller for Greeter {
    fn call(&self, method: &str, invocation: Invocation) -> Option<Result<Reply, HandlerError>> {
        match method {
            "hello" => {
                let name = invocation.param(0).unwrap_or("world");
                Some(Ok(format!("Hello, {name}!").into()))
            }
            _ => None,
        }
    }
}

fn demo_router(config: &HostConfig) -> Result<Router, junction::RouteError> {
    let mut registry = ControllerRegistry::new();
    registry.register(
        format!("{}::Greeter", config.router.default_namespace),
        || Box::new(Greeter),
    );

    let mut router = Router::with_config(config.router.clone()).with_resolver(Arc::new(registry));

    router.get("/", "home", Action::inline(|_| Ok("junction".into())))?;
    router.get(
        "/route/{id}",
        "route_id",
        Action::inline(|inv| Ok(format!("ID: {}", inv.param(0).unwrap_or_default()).into())),
    )?;
    router.post(
        "/foo/{id}",
        "foo",
        Action::inline(|inv| {
            let message = inv.request().get("message").unwrap_or_default();
            let id = inv.param(0).unwrap_or_default();
            Ok(format!("Request Message: {message} Id Passed in: {id}").into())
        }),
    )?;
    router.get("/greet/{name}", "greet", "Greeter:hello")?;
    router.get(
        "/boom",
        "boom",
        Action::inline(|_| Err(HandlerError::msg("Something went wrong."))),
    )?;

    Ok(router)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("junction v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let router = demo_router(&config)?;
    tracing::info!(routes = router.routes().len(), "Routes registered");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_ctrl_c(shutdown.clone()));

    HttpServer::new(router, config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
