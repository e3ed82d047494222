//! Lifecycle management for hosts serving a router.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging → Register routes → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Server stops accepting → In-flight requests drain → Exit
//!
//! Signals (signals.rs):
//!     Ctrl+C → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Route registration completes before the listener is bound, so the route
//!   table is read-only while traffic is served

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
