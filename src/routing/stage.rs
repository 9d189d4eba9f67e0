//! Deployment stage resolution.
//!
//! # Responsibilities
//! - Ask the configured strategy which stage a request belongs to
//! - Reject stage identifiers that are not configured
//! - Expand a canonical host key into the real hostname of every stage
//! - Map a real hostname back to its key for diagnostics
//!
//! # Design Decisions
//! - The strategy is injected; the resolver itself never reads process state
//! - The empty stage identifier is always valid and expands with an empty
//!   fragment unless the config maps it to something else
//! - Keys are expanded forward at startup; hosts are never rewritten per request

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::dispatch::error::DispatchError;
use crate::routing::config::StageConfig;

/// Produces the stage identifier for a request.
pub trait StageStrategy: Send + Sync {
    fn resolve(&self, request: &Request<Body>) -> String;
}

impl<F> StageStrategy for F
where
    F: Fn(&Request<Body>) -> String + Send + Sync,
{
    fn resolve(&self, request: &Request<Body>) -> String {
        self(request)
    }
}

/// Reads the stage from a process environment variable. Unset means no stage.
#[derive(Debug, Clone)]
pub struct EnvStage {
    variable: String,
}

impl EnvStage {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl StageStrategy for EnvStage {
    fn resolve(&self, _request: &Request<Body>) -> String {
        std::env::var(&self.variable).unwrap_or_default()
    }
}

/// Reads the stage from a request header. Missing means no stage.
#[derive(Debug, Clone)]
pub struct HeaderStage {
    name: String,
}

impl HeaderStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl StageStrategy for HeaderStage {
    fn resolve(&self, request: &Request<Body>) -> String {
        request
            .headers()
            .get(self.name.as_str())
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

/// Always reports the same stage.
#[derive(Debug, Clone)]
pub struct FixedStage {
    stage: String,
}

impl FixedStage {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
        }
    }
}

impl StageStrategy for FixedStage {
    fn resolve(&self, _request: &Request<Body>) -> String {
        self.stage.clone()
    }
}

/// Compiled stage handling for an enabled stage keyword.
pub struct StageResolver {
    keyword: String,
    fragments: HashMap<String, String>,
    strategy: Arc<dyn StageStrategy>,
}

impl StageResolver {
    /// Compile a stage config. Returns `None` when the keyword is empty,
    /// which turns stage handling into a pass-through.
    ///
    /// Keyword and fragments are lowercased to match lowercased hosts.
    pub fn new(config: &StageConfig) -> Option<Self> {
        if config.keyword.is_empty() {
            return None;
        }
        let mut fragments: HashMap<String, String> = config
            .stages
            .iter()
            .map(|(id, fragment)| (id.clone(), fragment.to_lowercase()))
            .collect();
        fragments.entry(String::new()).or_default();

        Some(Self {
            keyword: config.keyword.to_lowercase(),
            fragments,
            strategy: config.strategy.clone(),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Current stage identifier for the request, as reported by the strategy.
    pub fn resolve(&self, request: &Request<Body>) -> String {
        self.strategy.resolve(request)
    }

    /// Accept configured stages and the empty "no stage" identifier.
    pub fn validate(&self, stage: &str) -> Result<(), DispatchError> {
        if self.fragments.contains_key(stage) {
            Ok(())
        } else {
            Err(DispatchError::UnknownStage(stage.to_string()))
        }
    }

    /// Resolve and validate in one step.
    pub fn current(&self, request: &Request<Body>) -> Result<String, DispatchError> {
        let stage = self.resolve(request);
        self.validate(&stage)?;
        Ok(stage)
    }

    /// Map a real hostname back to its host key by replacing the stage's
    /// fragment with the keyword (first occurrence).
    ///
    /// Unknown stages and empty fragments leave the host untouched, so this
    /// is only a diagnostic; request matching uses [`expand`](Self::expand).
    pub fn substitute(&self, host: &str, stage: &str) -> String {
        match self.fragments.get(stage) {
            Some(fragment) if !fragment.is_empty() => host.replacen(fragment.as_str(), &self.keyword, 1),
            _ => host.to_string(),
        }
    }

    /// Real hostnames of a host key, one per stage, sorted by stage identifier.
    ///
    /// Returns `None` when the key does not contain the keyword. `key` must
    /// already be lowercased.
    pub fn expand(&self, key: &str) -> Option<Vec<(String, String)>> {
        if !key.contains(self.keyword.as_str()) {
            return None;
        }
        let mut hosts: Vec<(String, String)> = self
            .fragments
            .iter()
            .map(|(stage, fragment)| (stage.clone(), key.replace(self.keyword.as_str(), fragment)))
            .collect();
        hosts.sort();
        Some(hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn resolver(strategy: impl StageStrategy + 'static) -> StageResolver {
        let config = StageConfig::new("<stage>", strategy)
            .stage("A", "-stageA")
            .stage("B", "-stageB")
            .stage("", "");
        StageResolver::new(&config).unwrap()
    }

    fn request() -> Request<Body> {
        Request::builder().body(Body::empty()).unwrap()
    }

    #[test]
    fn test_empty_keyword_disables_staging() {
        let config = StageConfig::new("", FixedStage::new("A")).stage("A", "-stageA");
        assert!(StageResolver::new(&config).is_none());
    }

    #[test]
    fn test_expand_every_stage() {
        let r = resolver(FixedStage::new("A"));
        assert_eq!(
            r.expand("myproduct<stage>.example.com").unwrap(),
            vec![
                (String::new(), "myproduct.example.com".to_string()),
                ("A".to_string(), "myproduct-stagea.example.com".to_string()),
                ("B".to_string(), "myproduct-stageb.example.com".to_string()),
            ]
        );
        assert!(r.expand("plain.example.com").is_none());
    }

    #[test]
    fn test_substitute_first_occurrence_only() {
        let r = resolver(FixedStage::new("A"));
        assert_eq!(
            r.substitute("x-stagea-stagea.example.com", "A"),
            "x<stage>-stagea.example.com"
        );
        assert_eq!(r.substitute("myproduct.example.com", ""), "myproduct.example.com");
    }

    #[test]
    fn test_empty_stage_always_valid() {
        let config = StageConfig::new("<stage>", FixedStage::new("")).stage("A", "-stageA");
        let r = StageResolver::new(&config).unwrap();
        assert!(r.validate("").is_ok());
        assert_eq!(r.current(&request()).unwrap(), "");

        let hosts = r.expand("<stage>api.example.com").unwrap();
        assert!(hosts.contains(&(String::new(), "api.example.com".to_string())));
        assert!(hosts.contains(&("A".to_string(), "-stageaapi.example.com".to_string())));
    }

    #[test]
    fn test_unknown_stage_is_bad_request() {
        let r = resolver(FixedStage::new("C"));
        let err = r.current(&request()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains('C'));
    }

    #[test]
    fn test_header_strategy() {
        let r = resolver(HeaderStage::new("x-stage"));
        let req = Request::builder()
            .header("x-stage", "B")
            .body(Body::empty())
            .unwrap();
        assert_eq!(r.current(&req).unwrap(), "B");
        assert_eq!(r.resolve(&request()), "");
    }

    #[test]
    fn test_env_strategy() {
        let var = "TENANT_ROUTER_STAGE_TEST_ENV";
        std::env::set_var(var, "A");
        let r = resolver(EnvStage::new(var));
        assert_eq!(r.resolve(&request()), "A");
        std::env::remove_var(var);
        assert_eq!(r.resolve(&request()), "");
    }

    #[test]
    fn test_closure_strategy() {
        let r = resolver(|req: &Request<Body>| {
            if req.uri().path().starts_with("/canary") { "B".to_string() } else { String::new() }
        });
        let req = Request::builder().uri("/canary/graphql").body(Body::empty()).unwrap();
        assert_eq!(r.resolve(&req), "B");
    }
}
