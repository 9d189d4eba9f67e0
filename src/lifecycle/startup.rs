//! Startup orchestration.
//!
//! # Responsibilities
//! - Check that every configured schema builds before serving
//! - Check that every delineation has a collaborator to dispatch to
//! - Initialize metrics, bind the listener, and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: a product that cannot build stops the whole router from
//!   starting, rather than failing only that tenant at request time
//! - Builders are exercised with a synthetic introspection request
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::engine::{Engines, SchemaBuildError, INTROSPECTION_QUERY};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::proxy::TenantRouter;
use crate::routing::config::{DelineationKind, HostMatching, ProductMode, RouterConfiguration};

/// Fatal configuration error found while constructing the router.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("[{host}] build error: {source}")]
    SchemaBuild {
        host: String,
        #[source]
        source: SchemaBuildError,
    },

    #[error("invalid host pattern {pattern}: {source}")]
    InvalidHostPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("host {0} is configured more than once")]
    DuplicateHost(String),

    #[error("[{host}] route {route} is REST but no REST adapter is registered")]
    MissingRestAdapter { host: String, route: String },
}

/// Error returned by [`launch`].
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics exporter error: {0}")]
    Metrics(String),
}

/// The synthetic request handed to schema builders at startup.
pub fn introspection_request() -> Request<Body> {
    let body = serde_json::json!({ "query": INTROSPECTION_QUERY }).to_string();
    let mut request = Request::new(Body::from(body));
    *request.method_mut() = Method::POST;
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    request
}

/// Check a configuration before any table is compiled from it.
///
/// Builds every direct-mode schema and checks that REST delineations have an
/// adapter. The first failure is returned and names the offending host key.
pub fn validate_all(config: &RouterConfiguration, engines: &Engines) -> Result<(), StartupError> {
    let introspection = introspection_request();
    let keyword = config
        .stage
        .as_ref()
        .map(|s| s.keyword.to_lowercase())
        .filter(|k| !k.is_empty());

    for (host, product) in &config.products {
        match &product.mode {
            ProductMode::Direct(builder) => {
                builder
                    .build(&introspection)
                    .map_err(|source| StartupError::SchemaBuild {
                        host: host.clone(),
                        source,
                    })?;
                tracing::debug!(host = %host, "Schema builds");
            }
            ProductMode::MultiRoute(routes) => {
                if routes.is_empty() {
                    tracing::warn!(host = %host, "Product has no delineations; every route will be a 502");
                }
                for (route, delineation) in routes {
                    match &delineation.kind {
                        DelineationKind::Graphql => {}
                        DelineationKind::Rest => {
                            if engines.rest.is_none() {
                                return Err(StartupError::MissingRestAdapter {
                                    host: host.clone(),
                                    route: route.clone(),
                                });
                            }
                        }
                        DelineationKind::Unsupported(kind) => {
                            tracing::warn!(
                                host = %host,
                                route = %route,
                                kind = %kind,
                                "Delineation kind is not supported; requests will fail with 500"
                            );
                        }
                    }
                }
                tracing::debug!(host = %host, routes = routes.len(), "Delineations checked");
            }
        }

        if let (HostMatching::Exact, Some(keyword)) = (config.host_matching, keyword.as_deref()) {
            if !host.to_lowercase().contains(keyword) {
                tracing::debug!(
                    host = %host,
                    keyword = %keyword,
                    "Host key has no stage keyword; it matches under every stage"
                );
            }
        }
    }

    tracing::info!(products = config.products.len(), "All product schemas validated");
    Ok(())
}

/// Run the full serving sequence: metrics exporter, listener, HTTP server.
///
/// Returns once the server has shut down.
pub async fn launch(
    config: ServerConfig,
    router: Arc<TenantRouter>,
    shutdown: &Shutdown,
) -> Result<(), LaunchError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e| LaunchError::Metrics(format!("{}: {}", config.observability.metrics_address, e)))?;
        metrics::init_metrics(addr).map_err(|e| LaunchError::Metrics(e.to_string()))?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, router);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
