//! The tenant router: entry points the HTTP layer calls.
//!
//! # Responsibilities
//! - Own the current routing table and publish replacements atomically
//! - Resolve each request, attach its [`RouteContext`], run the chain
//! - Offer a local entry point that targets a tenant by explicit host
//!
//! # Design Decisions
//! - The table is read through `ArcSwap`; requests never take a lock
//! - A request keeps the table it started with, even across a reload
//! - A failed reload leaves the previous table serving

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{body::Body, http::Request, response::Response};

use crate::dispatch::context::RouteContext;
use crate::dispatch::error::DispatchError;
use crate::engine::Engines;
use crate::lifecycle::startup::StartupError;
use crate::observability::metrics;
use crate::routing::config::RouterConfiguration;
use crate::routing::router::{Resolution, RoutingTable};

/// Multi-tenant GraphQL / REST router.
pub struct TenantRouter {
    table: ArcSwap<RoutingTable>,
}

impl TenantRouter {
    /// Validate every product and compile the routing table.
    ///
    /// Any error is fatal for this configuration: no router is built, so
    /// nothing can start serving a partially working product set.
    pub fn new(config: RouterConfiguration, engines: Engines) -> Result<Self, StartupError> {
        let table = RoutingTable::compile(config, engines)?;
        tracing::info!(
            products = table.product_count(),
            host_matching = ?table.host_matching(),
            stage_keyword = ?table.stage_keyword(),
            "Routing table ready"
        );
        for (host, routes) in table.summary() {
            tracing::debug!(host = %host, routes = ?routes, "Product registered");
        }
        Ok(Self {
            table: ArcSwap::from_pointee(table),
        })
    }

    /// Route a request by its host. `route` is the route key path parameter.
    pub async fn handle(&self, request: Request<Body>, route: Option<String>) -> Response {
        let table = self.table.load_full();
        let resolution = table.resolve(&request, route.as_deref());
        Self::serve(resolution, request).await
    }

    /// Route a request to the tenant registered under `host`, ignoring the
    /// request's own host and stage.
    pub async fn handle_local(&self, host: &str, request: Request<Body>, route: Option<String>) -> Response {
        let table = self.table.load_full();
        let resolution = table.resolve_local(host, route.as_deref());
        Self::serve(resolution, request).await
    }

    async fn serve(resolution: Result<Resolution<'_>, DispatchError>, mut request: Request<Body>) -> Response {
        let start = Instant::now();
        match resolution {
            Ok(Resolution { entry, context }) => {
                let product = context.product.clone();
                request.extensions_mut().insert::<RouteContext>(context);
                let response = entry.chain.run(request, entry.endpoint.clone()).await;
                metrics::record_request(&product, response.status(), start);
                response
            }
            Err(e) => {
                let response = e.respond();
                metrics::record_request("none", response.status(), start);
                response
            }
        }
    }

    /// Validate and compile a new configuration, then swap it in.
    ///
    /// In-flight requests finish on the table they started with.
    pub fn reload(&self, config: RouterConfiguration, engines: Engines) -> Result<(), StartupError> {
        match RoutingTable::compile(config, engines) {
            Ok(table) => {
                let products = table.product_count();
                self.table.store(Arc::new(table));
                metrics::record_reload(true);
                tracing::info!(products, "Routing table reloaded");
                Ok(())
            }
            Err(e) => {
                metrics::record_reload(false);
                tracing::error!(error = %e, "Reload rejected; keeping current routing table");
                Err(e)
            }
        }
    }

    /// The routing table currently serving.
    pub fn snapshot(&self) -> Arc<RoutingTable> {
        self.table.load_full()
    }
}
