//! Rule set providers
//!
//! The rule set is immutable after first retrieval: both providers cache and
//! return byte-identical strings for the lifetime of the process.

use crate::error::{EngineError, EngineResult};
use crate::ports::rules::RulesProvider;
use std::path::PathBuf;
use std::sync::OnceLock;

/// The default workflow rule set, compiled into the crate
pub const WORKFLOW_RULES: &str = include_str!("../rules/workflow.n3");

/// Provider for the embedded default rule set
#[derive(Debug, Default)]
pub struct EmbeddedRules;

impl EmbeddedRules {
    pub fn new() -> Self {
        Self
    }
}

impl RulesProvider for EmbeddedRules {
    fn get_rules(&self) -> EngineResult<String> {
        Ok(WORKFLOW_RULES.to_string())
    }
}

/// Provider reading an N3 rule file once and caching it
pub struct FileRules {
    path: PathBuf,
    cache: OnceLock<String>,
}

impl FileRules {
    /// Create a provider for `path`; fails with `Unavailable` when the file
    /// does not exist, so misconfiguration surfaces at construction
    pub fn new(path: impl Into<PathBuf>) -> EngineResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(EngineError::Unavailable(format!(
                "Rules file not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            path,
            cache: OnceLock::new(),
        })
    }
}

impl RulesProvider for FileRules {
    fn get_rules(&self) -> EngineResult<String> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached.clone());
        }
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            EngineError::Unavailable(format!(
                "Failed to read rules file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        // First writer wins; later readers always see the same bytes
        Ok(self.cache.get_or_init(|| text).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_rules_are_byte_identical_across_calls() {
        let provider = EmbeddedRules::new();
        let first = provider.get_rules().unwrap();
        let second = provider.get_rules().unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.rules_hash().unwrap(), provider.rules_hash().unwrap());
    }

    #[test]
    fn embedded_rules_contain_implications() {
        let rules = EmbeddedRules::new().get_rules().unwrap();
        assert!(rules.contains("=>"), "rule set must contain implications");
        assert!(rules.contains("@prefix kgc:"));
        assert!(rules.contains("yawl:flowsInto"));
    }

    #[test]
    fn file_rules_cache_first_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ ?a ?b ?c }} => {{ ?a ?b ?c }} .").unwrap();

        let provider = FileRules::new(file.path()).unwrap();
        let first = provider.get_rules().unwrap();

        // Rewrite the file on disk; the provider must keep serving the
        // original bytes
        std::fs::write(file.path(), "changed").unwrap();
        let second = provider.get_rules().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_rules_file_fails_at_construction() {
        let result = FileRules::new("/nonexistent/rules.n3");
        assert!(matches!(result, Err(EngineError::Unavailable(_))));
    }
}
