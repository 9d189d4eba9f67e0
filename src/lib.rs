//! Multi-tenant GraphQL / REST request router.
//!
//! One process serves many products. Each product is keyed by a hostname
//! (optionally carrying a stage placeholder) and exposes either a single
//! GraphQL schema or several named routes, each GraphQL or REST.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (trace, request id, timeout, body limit)
//!                          │
//!                          ▼
//!                     proxy::TenantRouter ── ArcSwap<RoutingTable>
//!                          │
//!                          ▼
//!              routing: stage → host matcher → route key
//!                          │
//!                          ▼
//!              dispatch: global → product → route middleware
//!                          │
//!                          ▼
//!              engine: GraphqlExecutor / RestAdapter
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tenant_router::engine::{CompiledSchema, Engines, GraphqlExecutor};
//! use tenant_router::routing::{Delineation, ProductConfig, RouterConfiguration};
//! use tenant_router::TenantRouter;
//!
//! fn build(executor: Arc<dyn GraphqlExecutor>) -> Result<TenantRouter, tenant_router::StartupError> {
//!     let config = RouterConfiguration::new().product(
//!         "shop.example.com",
//!         ProductConfig::multi_route().delineation("graphql", Delineation::graphql(CompiledSchema::new(()))),
//!     );
//!     TenantRouter::new(config, Engines::graphql(executor))
//! }
//! ```

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod http;
pub mod proxy;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use dispatch::{DispatchError, RouteContext, RouteContextExt};
pub use http::HttpServer;
pub use lifecycle::{Shutdown, StartupError};
pub use proxy::TenantRouter;
pub use routing::RouterConfiguration;
