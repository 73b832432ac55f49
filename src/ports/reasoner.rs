//! N3 reasoner port
//!
//! Given a state serialization and a rule set, the reasoner returns a
//! serialization containing the deductive closure. Whether the output is the
//! full closure or only the new deductions is adapter-defined; the tick
//! executor ingests it unconditionally and relies on the store's set
//! semantics to deduplicate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of one reasoner invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningOutput {
    /// Whether reasoning completed successfully
    pub success: bool,
    /// Serialized deductions (N3/Turtle) when successful, empty otherwise
    pub output: String,
    /// Error message when reasoning failed
    pub error: Option<String>,
    /// Wall-clock duration of the invocation
    pub duration_ms: f64,
    /// Whether the failure was the configured deadline expiring
    pub timed_out: bool,
}

impl ReasoningOutput {
    /// A failed result with an error message
    pub fn failed(error: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
            duration_ms,
            timed_out: false,
        }
    }

    /// A failed result caused by the deadline expiring
    pub fn timed_out(error: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            timed_out: true,
            ..Self::failed(error, duration_ms)
        }
    }
}

/// Port over the N3 reasoner
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Whether the reasoner backend is installed and usable
    fn is_available(&self) -> bool;

    /// Apply `rules` to `state` and return the deductive closure
    async fn reason(&self, state: &str, rules: &str) -> ReasoningOutput;
}
