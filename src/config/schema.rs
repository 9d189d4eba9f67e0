//! Configuration schema definitions.
//!
//! This module defines the settings file for the router process.
//! All types derive Serde traits for deserialization from config files.
//! Products themselves carry code and are registered programmatically
//! (see [`crate::routing::RouterConfiguration`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::routing::config::{HostMatching, StageConfig};
use crate::routing::stage::{EnvStage, FixedStage, HeaderStage};

/// Root settings for the router process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Host matching and stage handling.
    pub routing: RoutingSettings,

    /// Local entry point for exercising one tenant without DNS.
    pub local: LocalConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request deadline (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Host matching and stage handling.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingSettings {
    /// `exact` (with stage substitution) or `regex`.
    pub host_matching: HostMatching,

    pub stage: StageSettings,
}

/// Where the current stage identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StageSource {
    /// Process environment variable.
    Env { variable: String },
    /// Request header.
    Header { name: String },
    /// Constant stage.
    Fixed { stage: String },
}

impl Default for StageSource {
    fn default() -> Self {
        StageSource::Env {
            variable: "STAGE".to_string(),
        }
    }
}

/// Stage keyword and hostname fragments.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StageSettings {
    /// Placeholder embedded in host keys. Empty disables staging.
    pub keyword: String,

    /// Stage identifier -> hostname fragment.
    pub stages: HashMap<String, String>,

    pub source: StageSource,
}

impl StageSettings {
    pub fn enabled(&self) -> bool {
        !self.keyword.is_empty()
    }

    /// Build the runtime stage config, or `None` when staging is disabled.
    pub fn to_stage_config(&self) -> Option<StageConfig> {
        if !self.enabled() {
            return None;
        }
        let config = match &self.source {
            StageSource::Env { variable } => StageConfig::new(self.keyword.clone(), EnvStage::new(variable.clone())),
            StageSource::Header { name } => StageConfig::new(self.keyword.clone(), HeaderStage::new(name.clone())),
            StageSource::Fixed { stage } => StageConfig::new(self.keyword.clone(), FixedStage::new(stage.clone())),
        };
        Some(
            self.stages
                .iter()
                .fold(config, |config, (id, fragment)| config.stage(id.clone(), fragment.clone())),
        )
    }
}

/// Local entry point configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalConfig {
    pub enabled: bool,

    /// Path prefix the local routes are mounted under.
    pub mount: String,

    /// Canonical host key (or host to test against patterns) to route to.
    pub host: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mount: "/local".to_string(),
            host: String::new(),
        }
    }
}
