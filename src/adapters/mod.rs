//! Concrete adapters behind the engine's ports

pub mod eye_reasoner;
pub mod oxigraph_store;
pub mod rules_provider;
pub mod shacl_validator;
pub mod snapshot_txn;
pub mod sparql_mutator;

pub use eye_reasoner::EyeReasoner;
pub use oxigraph_store::OxigraphStore;
pub use rules_provider::{EmbeddedRules, FileRules};
pub use shacl_validator::ShaclValidator;
pub use snapshot_txn::SnapshotTxnManager;
pub use sparql_mutator::SparqlMutator;
