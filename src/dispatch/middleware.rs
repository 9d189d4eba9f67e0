//! Middleware chain composition.
//!
//! # Responsibilities
//! - Concatenate global, product and delineation middleware in that order
//! - Run the chain so the first declared middleware sees the request first
//! - Let any layer short-circuit, pass through, or post-process
//!
//! # Design Decisions
//! - Continuation passing: each layer receives a [`Next`] and decides whether to run it
//! - Chains are flattened once when the routing table is compiled, not per request
//! - `Next` is owned and `'static`, so closures can hold it across await points

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};

/// A request interceptor.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handle the request. Call `next.run(request)` to continue inward.
    async fn handle(&self, request: Request<Body>, next: Next) -> Response;
}

/// The innermost handler a chain wraps.
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, request: Request<Body>) -> Response;
}

/// Shared middleware handle as stored in configuration.
pub type BoxMiddleware = Arc<dyn Middleware>;

/// Remaining layers plus the endpoint they wrap.
pub struct Next {
    layers: Arc<[BoxMiddleware]>,
    position: usize,
    endpoint: Arc<dyn Endpoint>,
}

impl Next {
    /// Invoke the next layer, or the endpoint once every layer has run.
    pub async fn run(mut self, request: Request<Body>) -> Response {
        match self.layers.get(self.position).cloned() {
            Some(layer) => {
                self.position += 1;
                layer.handle(request, self).await
            }
            None => self.endpoint.call(request).await,
        }
    }
}

/// An ordered, flattened middleware chain.
#[derive(Clone)]
pub struct Chain {
    layers: Arc<[BoxMiddleware]>,
}

impl Chain {
    /// Concatenate scopes outermost first: global, then product, then delineation.
    pub fn new(scopes: &[&[BoxMiddleware]]) -> Self {
        let layers: Vec<BoxMiddleware> = scopes
            .iter()
            .flat_map(|scope| scope.iter().cloned())
            .collect();
        Self {
            layers: layers.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Run the request through every layer and into `endpoint`.
    pub async fn run(&self, request: Request<Body>, endpoint: Arc<dyn Endpoint>) -> Response {
        Next {
            layers: self.layers.clone(),
            position: 0,
            endpoint,
        }
        .run(request)
        .await
    }
}

struct FromFn<F>(F);

#[async_trait]
impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn handle(&self, request: Request<Body>, next: Next) -> Response {
        (self.0)(request, next).await
    }
}

/// Build a middleware from an async function or closure.
///
/// ```ignore
/// let audit = from_fn(|req, next: Next| async move {
///     tracing::info!(path = %req.uri().path(), "audit");
///     next.run(req).await
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> BoxMiddleware
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(FromFn(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Mutex;

    struct Terminal(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Endpoint for Terminal {
        async fn call(&self, _request: Request<Body>) -> Response {
            self.0.lock().unwrap().push("terminal".into());
            (StatusCode::OK, "done").into_response()
        }
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> BoxMiddleware {
        let log = log.clone();
        from_fn(move |req, next: Next| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(name.to_string());
                next.run(req).await
            }
        })
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/graphql").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_scopes_run_outermost_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let global = vec![recorder(&log, "global-A"), recorder(&log, "global-B")];
        let product = vec![recorder(&log, "product-A")];
        let delineation = vec![
            recorder(&log, "delineation-A"),
            recorder(&log, "delineation-B"),
            recorder(&log, "delineation-C"),
        ];

        let chain = Chain::new(&[global.as_slice(), product.as_slice(), delineation.as_slice()]);
        assert_eq!(chain.len(), 6);

        let response = chain.run(request(), Arc::new(Terminal(log.clone()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "global-A",
                "global-B",
                "product-A",
                "delineation-A",
                "delineation-B",
                "delineation-C",
                "terminal"
            ]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_layers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let deny = from_fn(|_req, _next: Next| async {
            (StatusCode::UNAUTHORIZED, "denied").into_response()
        });
        let layers = vec![recorder(&log, "outer"), deny, recorder(&log, "inner")];
        let chain = Chain::new(&[layers.as_slice()]);

        let response = chain.run(request(), Arc::new(Terminal(log.clone()))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(*log.lock().unwrap(), vec!["outer"]);
    }

    #[tokio::test]
    async fn test_post_processing_sees_inner_response() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tag = from_fn(|req, next: Next| async move {
            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert("x-tagged", "yes".parse().unwrap());
            response
        });
        let layers = vec![tag];
        let chain = Chain::new(&[layers.as_slice()]);

        let response = chain.run(request(), Arc::new(Terminal(log.clone()))).await;
        assert_eq!(response.headers()["x-tagged"], "yes");
        assert_eq!(*log.lock().unwrap(), vec!["terminal"]);
    }

    #[tokio::test]
    async fn test_empty_chain_calls_endpoint() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(&[]);
        assert!(chain.is_empty());

        chain.run(request(), Arc::new(Terminal(log.clone()))).await;
        assert_eq!(*log.lock().unwrap(), vec!["terminal"]);
    }
}
