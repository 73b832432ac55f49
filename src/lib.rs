//! Hybrid knowledge-graph evolution engine
//!
//! This crate executes workflow-like RDF topologies as a converging sequence
//! of reasoning ticks:
//! - Monotonic deduction is delegated to an N3 reasoner (EYE by default)
//! - Non-monotonic state transitions go through atomic SPARQL UPDATE mutations
//! - SHACL shapes guard transitions with closed-world pre/post conditions
//! - Snapshot-based transactions make the whole tick atomic
//!
//! Every component boundary is a port (trait); concrete adapters are composed
//! at construction, so a store or reasoner can be swapped without touching the
//! tick loop.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod executor;
pub mod inspector;
pub mod ns;
pub mod ports;
pub mod runner;
pub mod telemetry;

pub use adapters::{
    EmbeddedRules, EyeReasoner, FileRules, OxigraphStore, ShaclValidator, SnapshotTxnManager,
    SparqlMutator,
};
pub use config::{EngineConfig, ReasonerConfig};
pub use engine::HybridEngine;
pub use error::{EngineError, EngineResult};
pub use events::{Event, EventLog, EventType};
pub use executor::{TickExecutor, TickResult};
pub use ports::mutator::{MutationResult, StateMutation, StateMutator, TriplePattern};
pub use ports::reasoner::{Reasoner, ReasoningOutput};
pub use ports::rules::RulesProvider;
pub use ports::store::RdfStore;
pub use ports::transaction::{
    Snapshot, Transaction, TransactionManager, TransactionResult, TransactionState,
};
pub use ports::validator::{
    ValidationResult, ValidationSeverity, ValidationViolation, WorkflowValidator,
};
pub use runner::ConvergenceRunner;
