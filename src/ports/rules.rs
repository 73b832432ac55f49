//! Rules provider port
//!
//! The rule set is loaded once and cached; `get_rules` MUST return a
//! byte-identical string for the lifetime of the process.

use crate::error::EngineResult;

/// Port over the immutable N3 rule set
pub trait RulesProvider: Send + Sync {
    /// The N3 rule set; byte-identical across calls
    fn get_rules(&self) -> EngineResult<String>;

    /// Blake3 hex digest over the rule set's UTF-8 bytes; stable across calls
    fn rules_hash(&self) -> EngineResult<String> {
        Ok(blake3::hash(self.get_rules()?.as_bytes())
            .to_hex()
            .to_string())
    }
}
