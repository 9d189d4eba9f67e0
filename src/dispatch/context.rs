//! Request-scoped routing context.
//!
//! The router stores a [`RouteContext`] in the request extensions once the
//! product (and delineation) are resolved. Middleware and collaborator-side
//! resolvers read it back; the router itself never relies on it being
//! mutated downstream.

use axum::http::Request;

use crate::routing::config::DelineationKind;

/// What the router resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    /// Host as received (lowercased), or the explicit host of a local call.
    pub host: String,
    /// Configured host key or pattern that matched.
    pub product: String,
    /// Resolved stage identifier; `None` when staging is off or bypassed.
    pub stage: Option<String>,
    /// Route key from the path, if any.
    pub route: Option<String>,
    /// Protocol the request is dispatched to.
    pub kind: DelineationKind,
    /// Whether the request came through the local entry point.
    pub local: bool,
}

/// Convenience accessor for the routing context.
pub trait RouteContextExt {
    fn route_context(&self) -> Option<&RouteContext>;
}

impl<B> RouteContextExt for Request<B> {
    fn route_context(&self) -> Option<&RouteContext> {
        self.extensions().get::<RouteContext>()
    }
}
