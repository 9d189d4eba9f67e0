//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path param, headers)
//!     → stage.rs (resolve + validate stage)
//!     → matcher.rs ((stage, host) lookup or first matching pattern)
//!     → router.rs (route key → delineation, compiled chain)
//!     → Return: Resolution or DispatchError
//!
//! Route Compilation (at startup):
//!     RouterConfiguration (config.rs)
//!     → validate every product (lifecycle::startup)
//!     → compile stage resolver, expand staged keys into the matcher, chains
//!     → Freeze as immutable RoutingTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same product
//! - Regex mode: first declared pattern wins

pub mod config;
pub mod matcher;
pub mod router;
pub mod stage;

pub use config::{
    Delineation, DelineationKind, HostMatching, ProductConfig, ProductMode, RouterConfiguration,
    StageConfig,
};
pub use matcher::HostMatcher;
pub use router::{Resolution, RouteEntry, RoutingTable};
pub use stage::{EnvStage, FixedStage, HeaderStage, StageResolver, StageStrategy};
