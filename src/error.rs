//! Error types for the hybrid engine

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error kinds surfaced by the engine and its ports
///
/// The engine recovers nothing on its own: every fatal error propagates to
/// the caller, and the scoped-transaction contract only rolls back, never
/// retries.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed Turtle, N3, or SPARQL; the store is left unchanged
    #[error("Parse error: {0}")]
    Parse(String),

    /// The reasoner returned non-success for a tick
    #[error("Reasoner error: {0}")]
    Reasoner(String),

    /// The run exhausted its tick bound without reaching a fixed point
    #[error("No convergence after {max_ticks} ticks (final delta: {final_delta})")]
    Convergence { max_ticks: u32, final_delta: i64 },

    /// SHACL violations at VIOLATION severity
    #[error("Validation failed: {0}")]
    Validation(String),

    /// SPARQL UPDATE failed or a batch partially failed
    #[error("Mutation failed: {0}")]
    Mutation(String),

    /// Begin-while-active, commit of a non-active transaction, or a failed
    /// rollback (critical: snapshot state is never silently dropped)
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// External collaborator missing at construction (reasoner binary,
    /// rules file, store path)
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Reasoning exceeded its configured deadline
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl EngineError {
    /// Short stable kind tag, for callers distinguishing retryable from fatal
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Parse(_) => "parse",
            EngineError::Reasoner(_) => "reasoner",
            EngineError::Convergence { .. } => "convergence",
            EngineError::Validation(_) => "validation",
            EngineError::Mutation(_) => "mutation",
            EngineError::Transaction(_) => "transaction",
            EngineError::Unavailable(_) => "unavailable",
            EngineError::Timeout(_) => "timeout",
        }
    }
}
