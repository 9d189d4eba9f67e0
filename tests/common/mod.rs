//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tenant_router::config::ServerConfig;
use tenant_router::engine::{CompiledSchema, EngineError, Engines, GraphqlExecutor, RestAdapter, SchemaBuildError};
use tenant_router::routing::{Delineation, HeaderStage, ProductConfig, RouterConfiguration, StageConfig};
use tenant_router::{HttpServer, RouteContextExt, TenantRouter};

/// Header the tests use to pick a stage.
pub const STAGE_HEADER: &str = "x-stage";

/// One call observed by the [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// "graphql", "rest" or "docs".
    pub kind: &'static str,
    /// Schema label the collaborator received.
    pub schema: String,
    pub path: String,
    /// Product key from the route context, if it was attached.
    pub product: Option<String>,
}

/// Mock GraphQL executor and REST adapter that records what it was asked to do.
///
/// Schemas are `&'static str` labels; the engine echoes the label back.
#[derive(Default, Clone)]
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn engines(&self) -> Engines {
        Engines::graphql(Arc::new(self.clone())).with_rest(Arc::new(self.clone()))
    }

    fn record(&self, kind: &'static str, schema: &CompiledSchema, request: &Request<Body>) -> Response {
        let label = schema.downcast_ref::<&'static str>().copied().unwrap_or("?").to_string();
        let call = Call {
            kind,
            schema: label.clone(),
            path: request.uri().path().to_string(),
            product: request.route_context().map(|ctx| ctx.product.clone()),
        };
        self.calls.lock().unwrap().push(call);
        (
            StatusCode::OK,
            Json(serde_json::json!({ "kind": kind, "schema": label })),
        )
            .into_response()
    }
}

#[async_trait]
impl GraphqlExecutor for RecordingEngine {
    async fn execute(&self, schema: &CompiledSchema, request: Request<Body>) -> Result<Response, EngineError> {
        if schema.downcast_ref::<&'static str>() == Some(&"failing") {
            return Err(EngineError::new(StatusCode::UNPROCESSABLE_ENTITY, "resolver failed"));
        }
        Ok(self.record("graphql", schema, &request))
    }
}

#[async_trait]
impl RestAdapter for RecordingEngine {
    async fn serve(&self, schema: &CompiledSchema, request: Request<Body>) -> Result<Response, EngineError> {
        Ok(self.record("rest", schema, &request))
    }

    async fn render_docs(&self, schema: &CompiledSchema, _path: &str, request: Request<Body>) -> Result<Response, EngineError> {
        Ok(self.record("docs", schema, &request))
    }
}

pub fn schema(label: &'static str) -> CompiledSchema {
    CompiledSchema::new(label)
}

pub fn direct_builder(_: &Request<Body>) -> Result<CompiledSchema, SchemaBuildError> {
    Ok(schema("direct"))
}

/// Stage keyword `<stage>`, stages A/B/none, selected by [`STAGE_HEADER`].
pub fn stage_config() -> StageConfig {
    StageConfig::new("<stage>", HeaderStage::new(STAGE_HEADER))
        .stage("A", "-stageA")
        .stage("B", "-stageB")
        .stage("", "")
}

/// The staged product from the classic test table, plus a REST route and a
/// direct-mode product.
pub fn staged_config() -> RouterConfiguration {
    RouterConfiguration::new()
        .stage(stage_config())
        .product(
            "myProduct<stage>.example.com",
            ProductConfig::multi_route()
                .delineation("graphql", Delineation::graphql(schema("product")))
                .delineation("catalog", Delineation::rest(schema("catalog"))),
        )
        .product("direct.example.com", ProductConfig::direct(direct_builder))
}

/// Settings with the local entry point pointed at the staged product.
pub fn local_settings() -> ServerConfig {
    let mut settings = ServerConfig::default();
    settings.local.enabled = true;
    settings.local.host = "myProduct<stage>.example.com".to_string();
    settings
}

/// Build the router and the axum app around it.
pub fn app(config: RouterConfiguration, engine: &RecordingEngine, settings: ServerConfig) -> (Arc<TenantRouter>, axum::Router) {
    let router = Arc::new(TenantRouter::new(config, engine.engines()).expect("configuration should validate"));
    let server = HttpServer::new(settings, router.clone());
    (router, server.app())
}

/// POST request with a small GraphQL body.
pub fn request(host: &str, path: &str, stage: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("host", host)
        .header("content-type", "application/json");
    if let Some(stage) = stage {
        builder = builder.header(STAGE_HEADER, stage);
    }
    builder
        .body(Body::from(r#"{"query":"{ __typename }"}"#))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
