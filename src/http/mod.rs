//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers)
//!     → request.rs (request ID, host extraction)
//!     → TenantRouter (stage → host → route → chain → engine)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_host, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
