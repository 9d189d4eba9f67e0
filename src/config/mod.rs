//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → routing settings feed RouterConfiguration::from_settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a router reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Products are code, not data: they are registered programmatically

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ListenerConfig, LocalConfig, LogFormat, ObservabilityConfig, RoutingSettings, ServerConfig,
    StageSettings, StageSource, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
