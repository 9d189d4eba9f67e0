//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     RouterConfiguration → validate_all (build every schema) → TenantRouter
//!     ServerConfig → metrics exporter → bind listener → HttpServer::run
//!
//! Shutdown (shutdown.rs):
//!     trigger() → HttpServer stops accepting → in-flight requests drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: routing table first, then listeners
//! - A router that fails validation is never constructed

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{launch, validate_all, LaunchError, StartupError};
