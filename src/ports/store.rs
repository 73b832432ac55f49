//! RDF store port
//!
//! The store holds the authoritative triple set. Loading is set-union and
//! idempotent; deletion only happens through SPARQL UPDATE. Operations are
//! individually atomic: a failed load leaves the store unchanged.

use crate::error::EngineResult;
use oxigraph::io::RdfFormat;
use std::collections::BTreeMap;

/// A single SELECT solution: variable name to term text
///
/// Term text is the IRI string for named nodes, `_:id` for blank nodes, the
/// bare value for plain string literals, and `"v"@lang` / `"v"^^<dt>`
/// otherwise.
pub type Binding = BTreeMap<String, String>;

/// Port over the authoritative triple store
pub trait RdfStore: Send + Sync {
    /// Parse Turtle and add the resulting triples; returns the number of
    /// triples that were new to the store
    fn load_turtle(&self, data: &str) -> EngineResult<usize>;

    /// Parse N3 (reasoner output) and add the resulting triples
    fn load_n3(&self, data: &str) -> EngineResult<usize>;

    /// Load an already-serialized document with an explicit format
    fn load_raw(&self, data: &[u8], format: RdfFormat) -> EngineResult<()>;

    /// Serialize the default graph in a Turtle-compatible form suitable for
    /// the reasoner's consumption
    fn dump(&self) -> EngineResult<String>;

    /// Serialize the entire store preserving named graphs (preferred
    /// reasoner input)
    fn dump_trig(&self) -> EngineResult<String>;

    /// Serialize the entire store as N-Quads; the snapshot substrate
    fn dump_nquads(&self) -> EngineResult<Vec<u8>>;

    /// Total quad cardinality
    fn triple_count(&self) -> usize;

    /// SPARQL SELECT (or CONSTRUCT/DESCRIBE, returned as subject/predicate/
    /// object rows). An ASK query yields one empty row for true, none for
    /// false, so `query(..).len() > 0` matches the ASK answer.
    fn query(&self, sparql: &str) -> EngineResult<Vec<Binding>>;

    /// SPARQL ASK
    fn ask(&self, sparql: &str) -> EngineResult<bool>;

    /// Execute a SPARQL 1.1 UPDATE atomically
    fn update(&self, sparql: &str) -> EngineResult<()>;

    /// Remove all quads
    fn clear(&self) -> EngineResult<()>;
}
