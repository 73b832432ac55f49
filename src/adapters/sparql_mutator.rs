//! SPARQL UPDATE mutator
//!
//! Composes mutations into single UPDATE requests and executes them through
//! the store port, which applies an update atomically. A batch is submitted
//! as one multi-statement request (statements joined with `;`), so either
//! every statement applies or none does.

use crate::error::EngineResult;
use crate::ns;
use crate::ports::mutator::{MutationResult, StateMutation, StateMutator};
use crate::ports::store::RdfStore;
use std::sync::Arc;

/// Mutator adapter over the store port
pub struct SparqlMutator {
    store: Arc<dyn RdfStore>,
    prefixes: String,
}

impl SparqlMutator {
    /// Mutator with the standard kgc/yawl/xsd prefix block
    pub fn new(store: Arc<dyn RdfStore>) -> Self {
        Self {
            store,
            prefixes: ns::SPARQL_PREFIXES.to_string(),
        }
    }

    /// Mutator with a caller-supplied prefix block
    pub fn with_prefixes(store: Arc<dyn RdfStore>, prefixes: impl Into<String>) -> Self {
        Self {
            store,
            prefixes: prefixes.into(),
        }
    }

    /// Counts are net: oxigraph does not report per-triple effects, so
    /// deleted/inserted are derived from cardinality around the update
    fn run_update(&self, sparql: &str, mutations_applied: usize) -> EngineResult<MutationResult> {
        let before = self.store.triple_count();
        match self.store.update(sparql) {
            Ok(()) => {
                let after = self.store.triple_count();
                let delta = after as i64 - before as i64;
                Ok(MutationResult {
                    success: true,
                    mutations_applied,
                    triples_deleted: (-delta).max(0) as usize,
                    triples_inserted: delta.max(0) as usize,
                    error: None,
                })
            }
            Err(e) => {
                tracing::warn!("SPARQL update failed: {}", e);
                Ok(MutationResult::failed(e.to_string()))
            }
        }
    }
}

impl StateMutator for SparqlMutator {
    fn apply_mutation(&self, mutation: &StateMutation) -> EngineResult<MutationResult> {
        tracing::debug!("Applying mutation: {}", mutation.description);
        self.run_update(&mutation.to_sparql(&self.prefixes), 1)
    }

    fn apply_mutations(&self, mutations: &[StateMutation]) -> EngineResult<MutationResult> {
        if mutations.is_empty() {
            return Ok(MutationResult {
                success: true,
                mutations_applied: 0,
                triples_deleted: 0,
                triples_inserted: 0,
                error: None,
            });
        }
        // One request, one prologue: the PREFIX block stays in effect for
        // every statement in the batch
        let body = mutations
            .iter()
            .map(|m| m.to_sparql(""))
            .collect::<Vec<_>>()
            .join(" ;\n");
        let sparql = format!("{}\n{}", self.prefixes.trim_end(), body);
        self.run_update(&sparql, mutations.len())
    }

    fn execute_sparql_update(&self, sparql: &str) -> EngineResult<MutationResult> {
        self.run_update(sparql, 1)
    }
}
