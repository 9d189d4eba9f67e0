//! GraphQL and REST execution collaborators.
//!
//! # Responsibilities
//! - Define what the router needs from a GraphQL engine
//! - Define what the router needs from a REST projection adapter
//! - Carry collaborator-chosen failure statuses back to the client
//!
//! # Design Decisions
//! - Requests are handed over by value; the route context travels in extensions
//! - Errors keep the collaborator's status code; the router does not reinterpret them

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::engine::CompiledSchema;

/// Failure reported by a collaborator while executing a request.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub status: StatusCode,
    pub message: String,
}

impl EngineError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Runs a GraphQL operation end-to-end, including any interactive explorer UI.
#[async_trait]
pub trait GraphqlExecutor: Send + Sync {
    async fn execute(
        &self,
        schema: &CompiledSchema,
        request: Request<Body>,
    ) -> Result<Response, EngineError>;
}

/// Projects schema fields onto REST verbs and paths.
#[async_trait]
pub trait RestAdapter: Send + Sync {
    /// Serve a REST call by mapping path segments to schema fields.
    async fn serve(
        &self,
        schema: &CompiledSchema,
        request: Request<Body>,
    ) -> Result<Response, EngineError>;

    /// Serve the generated documentation for `path`.
    async fn render_docs(
        &self,
        schema: &CompiledSchema,
        path: &str,
        request: Request<Body>,
    ) -> Result<Response, EngineError>;
}

/// Collaborators the router dispatches to.
#[derive(Clone)]
pub struct Engines {
    pub graphql: Arc<dyn GraphqlExecutor>,
    pub rest: Option<Arc<dyn RestAdapter>>,
}

impl Engines {
    /// Engines for deployments that only expose GraphQL delineations.
    pub fn graphql(executor: Arc<dyn GraphqlExecutor>) -> Self {
        Self {
            graphql: executor,
            rest: None,
        }
    }

    /// Register the REST adapter used by REST delineations.
    pub fn with_rest(mut self, adapter: Arc<dyn RestAdapter>) -> Self {
        self.rest = Some(adapter);
        self
    }
}
