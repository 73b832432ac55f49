//! State mutator port
//!
//! N3 inference is monotonic: it can only add facts. Workflow execution needs
//! state *transitions*: remove the old status, bump a counter, clear a guard
//! marker. Mutations are the sole sanctioned mechanism for that, each one a
//! single atomic SPARQL `DELETE { } INSERT { } WHERE { }` request.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One triple pattern in a DELETE/INSERT/WHERE clause
///
/// Terms may be variables (`?x`), bracketed or prefixed IRIs, or literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Serialize for SPARQL: bracket bare IRIs, quote bare literals, pass
    /// variables, bracketed terms, prefixed names, and quoted literals through
    pub fn to_sparql(&self) -> String {
        let object = if self.object.starts_with('"')
            || self.object.starts_with('\'')
            || self.object.starts_with('?')
            || self.object.starts_with('<')
            || self.object.contains(':')
        {
            self.object.clone()
        } else {
            format!("\"{}\"", self.object)
        };

        format!(
            "{} {} {}",
            Self::term(&self.subject),
            Self::term(&self.predicate),
            object
        )
    }

    fn term(t: &str) -> String {
        if t.starts_with('<') || t.starts_with('?') || t.starts_with('_') {
            t.to_string()
        } else if t.contains("://") || t.starts_with("urn:") {
            format!("<{}>", t)
        } else {
            // Prefixed name (kgc:status) or already-formatted term
            t.to_string()
        }
    }
}

/// An atomic delete/insert mutation
///
/// Serializes to one SPARQL UPDATE. Zero WHERE matches make the mutation a
/// no-op, not a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateMutation {
    /// Triples to remove
    pub delete_patterns: Vec<TriplePattern>,
    /// Triples to add
    pub insert_patterns: Vec<TriplePattern>,
    /// Patterns binding the variables used above
    pub where_patterns: Vec<TriplePattern>,
    /// Variable name to BIND expression, e.g. `?new` -> `BIND(?old + 1 AS ?new)`
    pub bindings: BTreeMap<String, String>,
    /// Human-readable tag
    pub description: String,
}

impl StateMutation {
    /// Compose the SPARQL UPDATE request
    pub fn to_sparql(&self, prefixes: &str) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !prefixes.is_empty() {
            parts.push(prefixes.trim_end().to_string());
        }

        if !self.delete_patterns.is_empty() {
            parts.push(format!(
                "DELETE {{\n    {} .\n}}",
                Self::join_patterns(&self.delete_patterns)
            ));
        }
        if !self.insert_patterns.is_empty() {
            parts.push(format!(
                "INSERT {{\n    {} .\n}}",
                Self::join_patterns(&self.insert_patterns)
            ));
        }
        if !self.where_patterns.is_empty() || !self.bindings.is_empty() {
            let mut where_parts: Vec<String> = Vec::new();
            if !self.where_patterns.is_empty() {
                where_parts.push(Self::join_patterns(&self.where_patterns));
            }
            for bind_expr in self.bindings.values() {
                where_parts.push(bind_expr.clone());
            }
            parts.push(format!("WHERE {{\n    {} .\n}}", where_parts.join(" .\n    ")));
        } else {
            // DELETE/INSERT without WHERE is not valid SPARQL 1.1
            parts.push("WHERE { }".to_string());
        }

        parts.join("\n")
    }

    fn join_patterns(patterns: &[TriplePattern]) -> String {
        patterns
            .iter()
            .map(TriplePattern::to_sparql)
            .collect::<Vec<_>>()
            .join(" .\n    ")
    }
}

/// Outcome of applying one mutation or a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    /// Mutations that were applied (all-or-nothing for a batch)
    pub mutations_applied: usize,
    /// Net triples removed across the request
    pub triples_deleted: usize,
    /// Net triples added across the request
    pub triples_inserted: usize,
    pub error: Option<String>,
}

impl MutationResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            mutations_applied: 0,
            triples_deleted: 0,
            triples_inserted: 0,
            error: Some(error.into()),
        }
    }
}

/// Port over atomic state mutation
pub trait StateMutator: Send + Sync {
    /// Apply one mutation as a single SPARQL UPDATE
    fn apply_mutation(&self, mutation: &StateMutation) -> EngineResult<MutationResult>;

    /// Apply a batch atomically: all succeed, or state is unchanged
    fn apply_mutations(&self, mutations: &[StateMutation]) -> EngineResult<MutationResult>;

    /// Escape hatch for raw SPARQL UPDATE text
    fn execute_sparql_update(&self, sparql: &str) -> EngineResult<MutationResult>;
}
