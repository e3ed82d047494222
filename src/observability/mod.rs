//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing and HTTP layers emit `tracing` events:
//!     registration (debug), matches (debug), fallbacks (warn / error),
//!     default overrides (info), per-request spans (TraceLayer)
//!     → logging.rs (subscriber: EnvFilter + fmt, text or JSON)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured fields (route, method, path, request_id) rather than formatted text
//! - `RUST_LOG` overrides the configured level

pub mod logging;
