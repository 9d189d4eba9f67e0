//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, StageSource};
    use crate::routing::config::HostMatching;
    use std::io::Write;

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:9000"

[observability]
log_format = "json"

[routing]
host_matching = "exact"

[routing.stage]
keyword = "<stage>"
source = { kind = "header", name = "x-stage" }

[routing.stage.stages]
"" = ""
A = "-stageA"
B = "-stageB"

[local]
enabled = true
host = "myproduct<stage>.example.com"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.routing.host_matching, HostMatching::Exact);
        assert_eq!(
            config.routing.stage.source,
            StageSource::Header { name: "x-stage".into() }
        );
        assert_eq!(config.routing.stage.stages.len(), 3);
        assert_eq!(config.local.mount, "/local");

        let stage = config.routing.stage.to_stage_config().unwrap();
        assert_eq!(stage.keyword, "<stage>");
        assert_eq!(stage.stages["A"], "-stageA");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(!config.routing.stage.enabled());
        assert!(config.routing.stage.to_stage_config().is_none());
    }

    #[test]
    fn test_validation_errors_collected() {
        let err = parse_config("[listener]\nbind_address = \"nope\"\n[timeouts]\nrequest_secs = 0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[routing]\nhost_matching = \"fuzzy\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert!(config.local.enabled);

        let missing = load_config(Path::new("/nonexistent/tenant-router.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
