//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved route (product + optional delineation)
//!     → context.rs (attach RouteContext to request extensions)
//!     → middleware.rs (global → product → delineation layers)
//!     → protocol.rs (GraphQL executor / REST adapter / docs)
//!     → Response, or error.rs maps the failure to a status
//! ```
//!
//! # Design Decisions
//! - Chains are compiled with the routing table and shared across requests
//! - The delineation kind is matched exhaustively; there is no catch-all arm
//! - Configuration errors always produce an explicit response

pub mod context;
pub mod error;
pub mod middleware;
pub mod protocol;

pub use context::{RouteContext, RouteContextExt};
pub use error::DispatchError;
pub use middleware::{from_fn, BoxMiddleware, Chain, Endpoint, Middleware, Next};
