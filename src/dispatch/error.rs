//! Dispatch errors and their HTTP mapping.
//!
//! | Error | Status |
//! |---|---|
//! | unknown stage | 400 |
//! | no product for host, no route for key | 502 |
//! | schema build, unsupported kind, missing adapter | 500 |
//! | collaborator failure | collaborator's choice |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::engine::{EngineError, SchemaBuildError};
use crate::observability::metrics;

/// Message returned to clients when a schema cannot be built.
pub const SCHEMA_BUILD_MESSAGE: &str = "Can't build schema. Please contact the backend developers";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Stage {0} not existing")]
    UnknownStage(String),

    #[error("No schema existing for {0}")]
    NoProduct(String),

    #[error("No route existing for {route} on {host}")]
    NoRoute { host: String, route: String },

    #[error("Can't build schema for {host}: {source}")]
    SchemaBuild {
        host: String,
        #[source]
        source: SchemaBuildError,
    },

    #[error("Can't find delineation kind: {0}")]
    UnsupportedKind(String),

    #[error("No REST adapter registered for route {route} on {host}")]
    MissingRestAdapter { host: String, route: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::UnknownStage(_) => StatusCode::BAD_REQUEST,
            DispatchError::NoProduct(_) | DispatchError::NoRoute { .. } => StatusCode::BAD_GATEWAY,
            DispatchError::SchemaBuild { .. }
            | DispatchError::UnsupportedKind(_)
            | DispatchError::MissingRestAdapter { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::Engine(e) => e.status,
        }
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DispatchError::UnknownStage(_) => "unknown_stage",
            DispatchError::NoProduct(_) => "no_product",
            DispatchError::NoRoute { .. } => "no_route",
            DispatchError::SchemaBuild { .. } => "schema_build",
            DispatchError::UnsupportedKind(_) => "unsupported_kind",
            DispatchError::MissingRestAdapter { .. } => "missing_rest_adapter",
            DispatchError::Engine(_) => "engine",
        }
    }

    /// Client-facing message. Schema build details stay server-side.
    pub fn public_message(&self) -> String {
        match self {
            DispatchError::SchemaBuild { .. } => SCHEMA_BUILD_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Log and count the failure, then turn it into a response.
    pub fn respond(self) -> Response {
        match &self {
            DispatchError::SchemaBuild { host, source } => {
                tracing::error!(host = %host, error = %source, "Schema build failed");
            }
            DispatchError::UnsupportedKind(_) | DispatchError::MissingRestAdapter { .. } => {
                tracing::error!(error = %self, "Dispatch misconfiguration");
            }
            DispatchError::Engine(e) => {
                tracing::debug!(status = %e.status, error = %e, "Collaborator returned an error");
            }
            _ => {
                tracing::warn!(status = %self.status(), error = %self, "Request not routable");
            }
        }
        metrics::record_dispatch_error(self.reason());
        self.into_response()
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        match self {
            DispatchError::Engine(e) => e.into_response(),
            other => (
                other.status(),
                Json(serde_json::json!({ "error": other.public_message() })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(DispatchError::UnknownStage("C".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(DispatchError::NoProduct("h".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            DispatchError::NoRoute { host: "h".into(), route: "r".into() }.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            DispatchError::UnsupportedKind("grpc".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DispatchError::Engine(EngineError::new(StatusCode::UNPROCESSABLE_ENTITY, "bad query")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_unmatched_host_is_echoed() {
        let response = DispatchError::NoProduct("shop.example.com".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("shop.example.com"));
    }

    #[tokio::test]
    async fn test_schema_build_detail_is_hidden() {
        let err = DispatchError::SchemaBuild {
            host: "shop.example.com".into(),
            source: SchemaBuildError::new("database password rejected"),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("contact the backend developers"));
        assert!(!body.contains("password"));
    }
}
