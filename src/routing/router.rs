//! Route lookup.
//!
//! # Responsibilities
//! - Compile a [`RouterConfiguration`] into an immutable lookup table
//! - Resolve stage, host and route key to a middleware chain and endpoint
//! - Return an explicit error for every miss
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Chains and endpoints are built once per route, not per request
//! - Direct-mode products ignore the route key

use std::collections::HashMap;
use std::sync::Arc;

use axum::{body::Body, http::Request};

use crate::dispatch::context::RouteContext;
use crate::dispatch::error::DispatchError;
use crate::dispatch::middleware::{BoxMiddleware, Chain, Endpoint};
use crate::dispatch::protocol::{DelineationEndpoint, DirectEndpoint};
use crate::engine::Engines;
use crate::http::request::request_host;
use crate::lifecycle::startup::{validate_all, StartupError};
use crate::routing::config::{DelineationKind, HostMatching, ProductConfig, ProductMode, RouterConfiguration};
use crate::routing::matcher::HostMatcher;
use crate::routing::stage::StageResolver;

/// A compiled route: the chain to run and the endpoint at its core.
pub struct RouteEntry {
    pub kind: DelineationKind,
    pub chain: Chain,
    pub endpoint: Arc<dyn Endpoint>,
}

enum ProductRoutes {
    Direct(RouteEntry),
    MultiRoute(HashMap<String, RouteEntry>),
}

struct CompiledProduct {
    key: String,
    routes: ProductRoutes,
}

impl CompiledProduct {
    fn compile(key: String, product: ProductConfig, global: &[BoxMiddleware], engines: &Engines) -> Self {
        let routes = match product.mode {
            ProductMode::Direct(builder) => ProductRoutes::Direct(RouteEntry {
                kind: DelineationKind::Graphql,
                chain: Chain::new(&[global, product.middleware.as_slice()]),
                endpoint: Arc::new(DirectEndpoint::new(key.clone(), builder, engines.clone())),
            }),
            ProductMode::MultiRoute(delineations) => ProductRoutes::MultiRoute(
                delineations
                    .into_iter()
                    .map(|(route, delineation)| {
                        let chain = Chain::new(&[
                            global,
                            product.middleware.as_slice(),
                            delineation.middleware.as_slice(),
                        ]);
                        let endpoint = DelineationEndpoint::new(
                            key.clone(),
                            route.clone(),
                            delineation.kind.clone(),
                            delineation.schema,
                            engines.clone(),
                        );
                        let entry = RouteEntry {
                            kind: delineation.kind,
                            chain,
                            endpoint: Arc::new(endpoint),
                        };
                        (route, entry)
                    })
                    .collect(),
            ),
        };
        Self { key, routes }
    }

    fn route(&self, route: Option<&str>) -> Result<&RouteEntry, DispatchError> {
        match &self.routes {
            ProductRoutes::Direct(entry) => Ok(entry),
            ProductRoutes::MultiRoute(routes) => {
                let route = route.unwrap_or_default();
                routes.get(route).ok_or_else(|| DispatchError::NoRoute {
                    host: self.key.clone(),
                    route: route.to_string(),
                })
            }
        }
    }
}

/// Outcome of a successful lookup.
pub struct Resolution<'a> {
    pub entry: &'a RouteEntry,
    pub context: RouteContext,
}

/// Immutable routing table compiled from a [`RouterConfiguration`].
pub struct RoutingTable {
    stage: Option<StageResolver>,
    matcher: HostMatcher,
    products: Vec<CompiledProduct>,
}

impl RoutingTable {
    /// Validate the configuration, then compile it.
    pub fn compile(config: RouterConfiguration, engines: Engines) -> Result<Self, StartupError> {
        validate_all(&config, &engines)?;

        let RouterConfiguration {
            host_matching,
            stage,
            products,
            global_middleware,
        } = config;

        let stage = stage.as_ref().and_then(StageResolver::new);
        let matcher = HostMatcher::compile(
            host_matching,
            products.iter().map(|(key, _)| key.as_str()),
            stage.as_ref(),
        )?;
        let products = products
            .into_iter()
            .map(|(key, product)| CompiledProduct::compile(key, product, &global_middleware, &engines))
            .collect();

        Ok(Self {
            stage,
            matcher,
            products,
        })
    }

    /// Resolve a live request: stage, then host, then route key.
    pub fn resolve(&self, request: &Request<Body>, route: Option<&str>) -> Result<Resolution<'_>, DispatchError> {
        let host = request_host(request);
        let stage = match &self.stage {
            Some(resolver) => Some(resolver.current(request)?),
            None => None,
        };
        tracing::debug!(host = %host, stage = ?stage, route = ?route, "Resolving request");
        let index = self.matcher.find(&host, stage.as_deref());
        self.lookup(host, index, stage, route, false)
    }

    /// Resolve with an explicit host, bypassing stage handling.
    ///
    /// In exact mode `host` is the configured key (it may contain the stage
    /// keyword); in regex mode it is tested against the patterns.
    pub fn resolve_local(&self, host: &str, route: Option<&str>) -> Result<Resolution<'_>, DispatchError> {
        let host = host.to_lowercase();
        let index = self.matcher.find_canonical(&host);
        self.lookup(host, index, None, route, true)
    }

    fn lookup(
        &self,
        host: String,
        index: Option<usize>,
        stage: Option<String>,
        route: Option<&str>,
        local: bool,
    ) -> Result<Resolution<'_>, DispatchError> {
        let Some(product) = index.and_then(|index| self.products.get(index)) else {
            return Err(DispatchError::NoProduct(host));
        };

        let entry = product.route(route)?;
        Ok(Resolution {
            entry,
            context: RouteContext {
                host,
                product: product.key.clone(),
                stage,
                route: route.map(str::to_string),
                kind: entry.kind.clone(),
                local,
            },
        })
    }

    pub fn host_matching(&self) -> HostMatching {
        self.matcher.mode()
    }

    /// Stage keyword in use, if staging is enabled.
    pub fn stage_keyword(&self) -> Option<&str> {
        self.stage.as_ref().map(StageResolver::keyword)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Configured host keys with their route keys (empty for direct mode).
    pub fn summary(&self) -> Vec<(String, Vec<String>)> {
        self.products
            .iter()
            .map(|product| {
                let mut routes: Vec<String> = match &product.routes {
                    ProductRoutes::Direct(_) => Vec::new(),
                    ProductRoutes::MultiRoute(routes) => routes.keys().cloned().collect(),
                };
                routes.sort();
                (product.key.clone(), routes)
            })
            .collect()
    }
}
