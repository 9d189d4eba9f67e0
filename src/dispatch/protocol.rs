//! Protocol dispatch.
//!
//! # Responsibilities
//! - Hand GraphQL delineations to the GraphQL executor
//! - Hand REST delineations to the REST adapter, or to its docs renderer
//!   when the path ends in `<route>/docu`
//! - Build the per-request schema for direct-mode products
//! - Fail with a 500 for kinds the router cannot serve
//!
//! # Design Decisions
//! - Endpoints are built once per route when the table compiles
//! - `match` on the kind has no wildcard arm, so a new kind must be handled here

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};

use crate::dispatch::error::DispatchError;
use crate::dispatch::middleware::Endpoint;
use crate::engine::{CompiledSchema, Engines, SchemaBuilder};
use crate::routing::config::DelineationKind;

/// Path segment that selects generated REST documentation.
pub const DOCS_ROUTE: &str = "docu";

/// True when `path` is `.../<route>/docu`.
pub fn is_docs_path(path: &str, route: &str) -> bool {
    path.strip_suffix(DOCS_ROUTE)
        .and_then(|rest| rest.strip_suffix('/'))
        .is_some_and(|rest| rest.ends_with(route))
}

/// Terminal handler for one delineation.
pub struct DelineationEndpoint {
    product: String,
    route: String,
    kind: DelineationKind,
    schema: CompiledSchema,
    engines: Engines,
}

impl DelineationEndpoint {
    pub fn new(
        product: impl Into<String>,
        route: impl Into<String>,
        kind: DelineationKind,
        schema: CompiledSchema,
        engines: Engines,
    ) -> Self {
        Self {
            product: product.into(),
            route: route.into(),
            kind,
            schema,
            engines,
        }
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<Response, DispatchError> {
        match &self.kind {
            DelineationKind::Graphql => Ok(self.engines.graphql.execute(&self.schema, request).await?),
            DelineationKind::Rest => {
                let rest = self.engines.rest.as_ref().ok_or_else(|| DispatchError::MissingRestAdapter {
                    host: self.product.clone(),
                    route: self.route.clone(),
                })?;
                let path = request.uri().path().to_string();
                if is_docs_path(&path, &self.route) {
                    tracing::debug!(product = %self.product, route = %self.route, "Serving REST documentation");
                    Ok(rest.render_docs(&self.schema, &path, request).await?)
                } else {
                    Ok(rest.serve(&self.schema, request).await?)
                }
            }
            DelineationKind::Unsupported(kind) => Err(DispatchError::UnsupportedKind(kind.clone())),
        }
    }
}

#[async_trait]
impl Endpoint for DelineationEndpoint {
    async fn call(&self, request: Request<Body>) -> Response {
        self.dispatch(request)
            .await
            .unwrap_or_else(DispatchError::respond)
    }
}

/// Terminal handler for a direct-mode product: build, then execute as GraphQL.
pub struct DirectEndpoint {
    product: String,
    builder: Arc<dyn SchemaBuilder>,
    engines: Engines,
}

impl DirectEndpoint {
    pub fn new(product: impl Into<String>, builder: Arc<dyn SchemaBuilder>, engines: Engines) -> Self {
        Self {
            product: product.into(),
            builder,
            engines,
        }
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<Response, DispatchError> {
        let schema = self
            .builder
            .build(&request)
            .map_err(|source| DispatchError::SchemaBuild {
                host: self.product.clone(),
                source,
            })?;
        Ok(self.engines.graphql.execute(&schema, request).await?)
    }
}

#[async_trait]
impl Endpoint for DirectEndpoint {
    async fn call(&self, request: Request<Body>) -> Response {
        self.dispatch(request)
            .await
            .unwrap_or_else(DispatchError::respond)
    }
}
