//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0, addresses parse)
//! - Check that enabled features carry the settings they need
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{ServerConfig, StageSource};

/// A single semantic problem in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let stage = &config.routing.stage;
    if stage.enabled() {
        if stage.stages.is_empty() {
            errors.push(ValidationError::new(
                "routing.stage.stages",
                "a stage keyword requires at least one stage",
            ));
        }
        let source_empty = match &stage.source {
            StageSource::Env { variable } => variable.is_empty(),
            StageSource::Header { name } => name.is_empty(),
            StageSource::Fixed { .. } => false,
        };
        if source_empty {
            errors.push(ValidationError::new("routing.stage.source", "must name a variable or header"));
        }
    }

    let local = &config.local;
    if let Err(message) = check_mount(&local.mount) {
        errors.push(ValidationError::new("local.mount", message));
    }
    if local.enabled && local.host.is_empty() {
        errors.push(ValidationError::new("local.host", "required when the local entry point is enabled"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A mount must be a static, non-root path that axum can nest under.
pub(crate) fn check_mount(mount: &str) -> Result<(), String> {
    if !mount.starts_with('/') || mount == "/" {
        return Err(format!("'{mount}' must start with '/' and must not be the root"));
    }
    if mount.ends_with('/') || mount.contains(['{', '}', '*']) {
        return Err(format!("'{mount}' must be a static path without a trailing '/'"));
    }
    Ok(())
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{value}' is not a socket address")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_returned() {
        let mut config = ServerConfig::default();
        config.listener.max_body_bytes = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "metrics".into();
        config.local.mount = "/".into();
        config.local.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.max_body_bytes",
                "observability.metrics_address",
                "local.mount",
                "local.host"
            ]
        );
    }

    #[test]
    fn test_stage_keyword_needs_stages_and_source() {
        let mut config = ServerConfig::default();
        config.routing.stage.keyword = "<stage>".into();
        config.routing.stage.source = StageSource::Header { name: String::new() };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "routing.stage.stages");
        assert_eq!(errors[1].field, "routing.stage.source");
    }

    #[test]
    fn test_mount_must_be_absolute() {
        let mut config = ServerConfig::default();
        config.local.mount = "local".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().starts_with("local.mount:"));
    }

    #[test]
    fn test_mount_must_be_static() {
        for mount in ["/{tenant}", "/a/*rest", "/a/{*rest}", "/local/"] {
            let mut config = ServerConfig::default();
            config.local.enabled = true;
            config.local.host = "myProduct<stage>.example.com".into();
            config.local.mount = mount.into();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors.len(), 1, "{mount}");
            assert_eq!(errors[0].field, "local.mount", "{mount}");
        }

        let mut config = ServerConfig::default();
        config.local.mount = "/tenants/local".into();
        assert!(validate_config(&config).is_ok());
    }
}
