//! Host matching logic.
//!
//! # Responsibilities
//! - Map a request host to the product registered for it
//! - Exact mode: O(1) lookup of the request host within its stage
//! - Regex mode: test the raw host against each pattern in declaration order
//!
//! # Design Decisions
//! - Host matching is case-insensitive, as RFC 9110 requires
//! - Patterns are compiled once at startup; a bad pattern is a startup error
//! - Regex mode: first declared pattern wins. Overlapping patterns are a
//!   configuration hazard and are not reordered or rejected
//! - One mode per router; a key is never read as both literal and pattern
//! - Exact keys containing the stage keyword are expanded once per stage at
//!   compile time; keys without it match under every stage

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::lifecycle::startup::StartupError;
use crate::routing::config::HostMatching;
use crate::routing::stage::StageResolver;

/// Exact-mode host index. Values are indexes into the product list.
#[derive(Debug, Default)]
pub struct ExactHosts {
    /// Every key as configured (lowercased), for the local entry point.
    canonical: HashMap<String, usize>,
    /// Keys without the stage keyword.
    literal: HashMap<String, usize>,
    /// Stage identifier -> expanded host -> product.
    staged: HashMap<String, HashMap<String, usize>>,
}

impl ExactHosts {
    fn compile<'a>(
        keys: impl IntoIterator<Item = &'a str>,
        stage: Option<&StageResolver>,
    ) -> Result<Self, StartupError> {
        let mut hosts = ExactHosts::default();
        for (index, key) in keys.into_iter().enumerate() {
            let lowered = key.to_lowercase();
            if hosts.canonical.insert(lowered.clone(), index).is_some() {
                return Err(StartupError::DuplicateHost(key.to_string()));
            }
            match stage.and_then(|resolver| resolver.expand(&lowered)) {
                Some(expanded) => {
                    for (stage, host) in expanded {
                        if hosts.literal.contains_key(&host) {
                            return Err(StartupError::DuplicateHost(host));
                        }
                        let by_host = hosts.staged.entry(stage).or_default();
                        if by_host.insert(host.clone(), index).is_some() {
                            return Err(StartupError::DuplicateHost(host));
                        }
                    }
                }
                None => {
                    if hosts.staged.values().any(|by_host| by_host.contains_key(&lowered)) {
                        return Err(StartupError::DuplicateHost(key.to_string()));
                    }
                    hosts.literal.insert(lowered, index);
                }
            }
        }
        Ok(hosts)
    }

    fn find(&self, host: &str, stage: Option<&str>) -> Option<usize> {
        stage
            .and_then(|stage| self.staged.get(stage))
            .and_then(|by_host| by_host.get(host))
            .or_else(|| self.literal.get(host))
            .copied()
    }
}

/// Compiled host lookup. Values are indexes into the product list.
#[derive(Debug)]
pub enum HostMatcher {
    Exact(ExactHosts),
    Regex(Vec<(Regex, usize)>),
}

impl HostMatcher {
    /// Compile host keys (in declaration order) for the given mode.
    ///
    /// `stage` only affects exact mode; regex patterns are tested against the
    /// raw host and encode stages themselves.
    pub fn compile<'a>(
        mode: HostMatching,
        keys: impl IntoIterator<Item = &'a str>,
        stage: Option<&StageResolver>,
    ) -> Result<Self, StartupError> {
        match mode {
            HostMatching::Exact => ExactHosts::compile(keys, stage).map(HostMatcher::Exact),
            HostMatching::Regex => {
                let mut patterns: Vec<(Regex, usize)> = Vec::new();
                for (index, key) in keys.into_iter().enumerate() {
                    if patterns.iter().any(|(p, _)| p.as_str() == key) {
                        return Err(StartupError::DuplicateHost(key.to_string()));
                    }
                    let regex = RegexBuilder::new(key)
                        .case_insensitive(true)
                        .build()
                        .map_err(|source| StartupError::InvalidHostPattern {
                            pattern: key.to_string(),
                            source,
                        })?;
                    patterns.push((regex, index));
                }
                Ok(HostMatcher::Regex(patterns))
            }
        }
    }

    pub fn mode(&self) -> HostMatching {
        match self {
            HostMatcher::Exact(_) => HostMatching::Exact,
            HostMatcher::Regex(_) => HostMatching::Regex,
        }
    }

    /// Find the product for a live request host under the resolved stage.
    pub fn find(&self, host: &str, stage: Option<&str>) -> Option<usize> {
        match self {
            HostMatcher::Exact(hosts) => hosts.find(&host.to_lowercase(), stage),
            HostMatcher::Regex(patterns) => Self::first_match(patterns, host),
        }
    }

    /// Find the product by its configured key (exact) or by pattern (regex).
    pub fn find_canonical(&self, key: &str) -> Option<usize> {
        match self {
            HostMatcher::Exact(hosts) => hosts.canonical.get(&key.to_lowercase()).copied(),
            HostMatcher::Regex(patterns) => Self::first_match(patterns, key),
        }
    }

    fn first_match(patterns: &[(Regex, usize)], host: &str) -> Option<usize> {
        patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(host))
            .map(|(_, index)| *index)
    }

    /// Number of configured host keys.
    pub fn len(&self) -> usize {
        match self {
            HostMatcher::Exact(hosts) => hosts.canonical.len(),
            HostMatcher::Regex(patterns) => patterns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
