//! Routing configuration as supplied by the embedding application.
//!
//! Built once before serving and never mutated afterwards. Anything that
//! carries code (schema builders, middleware, stage strategies) lives here
//! rather than in the TOML settings file.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::schema::RoutingSettings;
use crate::dispatch::middleware::BoxMiddleware;
use crate::engine::{CompiledSchema, SchemaBuilder};
use crate::routing::stage::StageStrategy;

/// How product host keys are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMatching {
    /// Keys are literal hosts, possibly containing the stage keyword.
    #[default]
    Exact,
    /// Keys are regular expressions tested against the raw host.
    /// First declared pattern that matches wins.
    Regex,
}

/// Stage placeholder handling.
#[derive(Clone)]
pub struct StageConfig {
    /// Placeholder embedded in host keys. Empty disables staging.
    pub keyword: String,
    /// Stage identifier -> fragment that appears in real hostnames.
    pub stages: HashMap<String, String>,
    /// Produces the current stage identifier for a request.
    pub strategy: Arc<dyn StageStrategy>,
}

impl StageConfig {
    pub fn new(keyword: impl Into<String>, strategy: impl StageStrategy + 'static) -> Self {
        Self {
            keyword: keyword.into(),
            stages: HashMap::new(),
            strategy: Arc::new(strategy),
        }
    }

    /// Register a stage and the hostname fragment that identifies it.
    pub fn stage(mut self, id: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.stages.insert(id.into(), fragment.into());
        self
    }
}

/// Protocol binding of a delineation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DelineationKind {
    Graphql,
    Rest,
    /// A kind this router cannot serve; dispatching to it is a 500.
    Unsupported(String),
}

impl FromStr for DelineationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "graphql" => DelineationKind::Graphql,
            "rest" => DelineationKind::Rest,
            _ => DelineationKind::Unsupported(s.to_string()),
        })
    }
}

impl From<&str> for DelineationKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for DelineationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelineationKind::Graphql => f.write_str("graphql"),
            DelineationKind::Rest => f.write_str("rest"),
            DelineationKind::Unsupported(kind) => f.write_str(kind),
        }
    }
}

/// A named protocol binding under a product.
#[derive(Clone)]
pub struct Delineation {
    pub kind: DelineationKind,
    pub schema: CompiledSchema,
    pub middleware: Vec<BoxMiddleware>,
}

impl Delineation {
    pub fn new(kind: impl Into<DelineationKind>, schema: CompiledSchema) -> Self {
        Self {
            kind: kind.into(),
            schema,
            middleware: Vec::new(),
        }
    }

    pub fn graphql(schema: CompiledSchema) -> Self {
        Self::new(DelineationKind::Graphql, schema)
    }

    pub fn rest(schema: CompiledSchema) -> Self {
        Self::new(DelineationKind::Rest, schema)
    }

    /// Append a delineation-scoped middleware.
    pub fn middleware(mut self, middleware: BoxMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }
}

/// Whether a product serves one schema or several named routes.
#[derive(Clone)]
pub enum ProductMode {
    /// One schema per host, always GraphQL, built per request.
    Direct(Arc<dyn SchemaBuilder>),
    /// Route key -> delineation.
    MultiRoute(HashMap<String, Delineation>),
}

/// One tenant.
#[derive(Clone)]
pub struct ProductConfig {
    pub mode: ProductMode,
    pub middleware: Vec<BoxMiddleware>,
}

impl ProductConfig {
    /// A product served by a single request-dependent schema.
    pub fn direct(builder: impl SchemaBuilder + 'static) -> Self {
        Self {
            mode: ProductMode::Direct(Arc::new(builder)),
            middleware: Vec::new(),
        }
    }

    /// A product with named delineations; add them with [`ProductConfig::delineation`].
    pub fn multi_route() -> Self {
        Self {
            mode: ProductMode::MultiRoute(HashMap::new()),
            middleware: Vec::new(),
        }
    }

    /// Register a delineation under `route`.
    ///
    /// Calling this on a direct product switches it to multi-route mode.
    pub fn delineation(mut self, route: impl Into<String>, delineation: Delineation) -> Self {
        match &mut self.mode {
            ProductMode::MultiRoute(routes) => {
                routes.insert(route.into(), delineation);
            }
            ProductMode::Direct(_) => {
                let mut routes = HashMap::new();
                routes.insert(route.into(), delineation);
                self.mode = ProductMode::MultiRoute(routes);
            }
        }
        self
    }

    /// Append a product-scoped middleware.
    pub fn middleware(mut self, middleware: BoxMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }
}

/// Everything the router needs to resolve and dispatch requests.
#[derive(Clone, Default)]
pub struct RouterConfiguration {
    pub host_matching: HostMatching,
    pub stage: Option<StageConfig>,
    /// Host key -> product, in declaration order.
    pub products: Vec<(String, ProductConfig)>,
    pub global_middleware: Vec<BoxMiddleware>,
}

impl RouterConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed matching mode and stage handling from the settings file.
    pub fn from_settings(settings: &RoutingSettings) -> Self {
        Self {
            host_matching: settings.host_matching,
            stage: settings.stage.to_stage_config(),
            ..Self::default()
        }
    }

    pub fn host_matching(mut self, mode: HostMatching) -> Self {
        self.host_matching = mode;
        self
    }

    pub fn stage(mut self, stage: StageConfig) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Append a middleware applied to every product.
    pub fn global_middleware(mut self, middleware: BoxMiddleware) -> Self {
        self.global_middleware.push(middleware);
        self
    }

    /// Register a product under `host` (literal or pattern, per [`HostMatching`]).
    pub fn product(mut self, host: impl Into<String>, product: ProductConfig) -> Self {
        self.products.push((host.into(), product));
        self
    }
}
