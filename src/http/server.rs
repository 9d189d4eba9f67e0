//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the tenant handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Mount the local entry point when enabled
//! - Bind server to listener and drain on shutdown

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderName, Request},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::check_mount;
use crate::config::ServerConfig;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::{shutdown, signals};
use crate::proxy::TenantRouter;

/// Application state injected into the tenant handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<TenantRouter>,
}

/// State for the local entry point: every request goes to one host.
#[derive(Clone)]
struct LocalState {
    router: Arc<TenantRouter>,
    host: Arc<str>,
}

/// HTTP server in front of a [`TenantRouter`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: ServerConfig, tenant_router: Arc<TenantRouter>) -> Self {
        let router = Self::build_router(&config, tenant_router);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, tenant_router: Arc<TenantRouter>) -> Router {
        let mut router = Router::new()
            .route("/", any(root_handler))
            .route("/{route}", any(route_handler))
            .route("/{route}/{*rest}", any(route_handler))
            .with_state(AppState {
                router: tenant_router.clone(),
            });

        match (config.local.enabled, check_mount(&config.local.mount)) {
            (false, _) => {}
            (true, Err(message)) => {
                tracing::error!(mount = %config.local.mount, error = %message, "Local entry point not mounted");
            }
            (true, Ok(())) => {
                tracing::info!(mount = %config.local.mount, host = %config.local.host, "Local entry point enabled");
                let local = Router::new()
                    .route("/", any(local_root_handler))
                    .route("/{route}", any(local_route_handler))
                    .route("/{route}/{*rest}", any(local_route_handler))
                    .with_state(LocalState {
                        router: tenant_router,
                        host: Arc::from(config.local.host.as_str()),
                    });
                router = router.nest(&config.local.mount, local);
            }
        }

        let request_id = HeaderName::from_static(X_REQUEST_ID);
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// The configured application, for in-process use (e.g. `oneshot`).
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a signal arrives or `shutdown_rx` fires.
    pub async fn run(self, listener: TcpListener, shutdown_rx: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = signals::shutdown_signal() => {}
                    _ = shutdown::triggered(shutdown_rx) => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn root_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.router.handle(request, None).await
}

async fn route_handler(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    request: Request<Body>,
) -> Response {
    let route = params.get("route").cloned();
    state.router.handle(request, route).await
}

async fn local_root_handler(State(state): State<LocalState>, request: Request<Body>) -> Response {
    state.router.handle_local(&state.host, request, None).await
}

async fn local_route_handler(
    State(state): State<LocalState>,
    Path(params): Path<HashMap<String, String>>,
    request: Request<Body>,
) -> Response {
    let route = params.get("route").cloned();
    state.router.handle_local(&state.host, request, route).await
}
