//! Oxigraph-backed store adapter
//!
//! In-memory by default, optionally on-disk. The lock gives concurrent
//! readers a consistent view while serializing writers; loads parse fully
//! into quads before the first insert so a malformed document leaves the
//! store unchanged.

use crate::error::{EngineError, EngineResult};
use crate::ports::store::{Binding, RdfStore};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::vocab::xsd;
use oxigraph::model::{GraphNameRef, Quad, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;

/// RDF store adapter over `oxigraph::store::Store`
pub struct OxigraphStore {
    store: RwLock<Store>,
}

impl OxigraphStore {
    /// Create an in-memory store
    pub fn new() -> EngineResult<Self> {
        let store = Store::new()
            .map_err(|e| EngineError::Unavailable(format!("Failed to create store: {}", e)))?;
        Ok(Self {
            store: RwLock::new(store),
        })
    }

    /// Open a persistent store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let store = Store::open(path)
            .map_err(|e| EngineError::Unavailable(format!("Failed to open store: {}", e)))?;
        Ok(Self {
            store: RwLock::new(store),
        })
    }

    /// Parse a document completely before touching the store
    fn parse_quads(data: &[u8], format: RdfFormat) -> EngineResult<Vec<Quad>> {
        let mut quads = Vec::new();
        for quad in RdfParser::from_format(format).for_reader(data) {
            let quad = quad.map_err(|e| EngineError::Parse(format!("{}", e)))?;
            quads.push(quad);
        }
        Ok(quads)
    }

    fn load_parsed(&self, data: &[u8], format: RdfFormat) -> EngineResult<usize> {
        let quads = Self::parse_quads(data, format)?;
        let store = self.store.write();
        let mut added = 0;
        for quad in &quads {
            if store
                .insert(quad)
                .map_err(|e| EngineError::Parse(format!("RDF store error: {}", e)))?
            {
                added += 1;
            }
        }
        Ok(added)
    }

}

/// Render a term for bindings: IRI string, `_:id`, bare value for plain
/// string literals, `"v"@lang` / `"v"^^<dt>` otherwise
pub(crate) fn term_text(term: &Term) -> String {
    match term {
        Term::NamedNode(named) => named.as_str().to_string(),
        Term::BlankNode(blank) => format!("_:{}", blank.as_str()),
        Term::Literal(literal) => {
            if let Some(lang) = literal.language() {
                format!("\"{}\"@{}", literal.value(), lang)
            } else if literal.datatype() == xsd::STRING {
                literal.value().to_string()
            } else {
                format!("\"{}\"^^<{}>", literal.value(), literal.datatype().as_str())
            }
        }
        other => other.to_string(),
    }
}

impl RdfStore for OxigraphStore {
    fn load_turtle(&self, data: &str) -> EngineResult<usize> {
        self.load_parsed(data.as_bytes(), RdfFormat::Turtle)
    }

    fn load_n3(&self, data: &str) -> EngineResult<usize> {
        self.load_parsed(data.as_bytes(), RdfFormat::N3)
    }

    fn load_raw(&self, data: &[u8], format: RdfFormat) -> EngineResult<()> {
        self.load_parsed(data, format)?;
        Ok(())
    }

    fn dump(&self) -> EngineResult<String> {
        let store = self.store.read();
        let mut buffer = Vec::new();
        store
            .dump_graph_to_writer(GraphNameRef::DefaultGraph, RdfFormat::Turtle, &mut buffer)
            .map_err(|e| EngineError::Parse(format!("Serialization failed: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| EngineError::Parse(format!("{}", e)))
    }

    fn dump_trig(&self) -> EngineResult<String> {
        let store = self.store.read();
        let mut buffer = Vec::new();
        store
            .dump_to_writer(RdfFormat::TriG, &mut buffer)
            .map_err(|e| EngineError::Parse(format!("Serialization failed: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| EngineError::Parse(format!("{}", e)))
    }

    fn dump_nquads(&self) -> EngineResult<Vec<u8>> {
        let store = self.store.read();
        let mut buffer = Vec::new();
        store
            .dump_to_writer(RdfFormat::NQuads, &mut buffer)
            .map_err(|e| EngineError::Parse(format!("Serialization failed: {}", e)))?;
        Ok(buffer)
    }

    fn triple_count(&self) -> usize {
        self.store.read().len().unwrap_or(0)
    }

    fn query(&self, sparql: &str) -> EngineResult<Vec<Binding>> {
        let store = self.store.read();
        let results = store
            .query(sparql)
            .map_err(|e| EngineError::Parse(format!("SPARQL query failed: {}", e)))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution
                        .map_err(|e| EngineError::Parse(format!("SPARQL solution error: {}", e)))?;
                    let mut row = BTreeMap::new();
                    for (variable, term) in solution.iter() {
                        row.insert(variable.as_str().to_string(), term_text(term));
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            QueryResults::Boolean(answer) => {
                // ASK as SELECT: one empty row for true, none for false
                if answer {
                    Ok(vec![BTreeMap::new()])
                } else {
                    Ok(Vec::new())
                }
            }
            QueryResults::Graph(triples) => {
                let mut rows = Vec::new();
                for triple in triples {
                    let triple = triple
                        .map_err(|e| EngineError::Parse(format!("SPARQL triple error: {}", e)))?;
                    let mut row = BTreeMap::new();
                    row.insert("subject".to_string(), triple.subject.to_string());
                    row.insert("predicate".to_string(), triple.predicate.to_string());
                    row.insert("object".to_string(), term_text(&triple.object));
                    rows.push(row);
                }
                Ok(rows)
            }
        }
    }

    fn ask(&self, sparql: &str) -> EngineResult<bool> {
        let store = self.store.read();
        match store
            .query(sparql)
            .map_err(|e| EngineError::Parse(format!("SPARQL query failed: {}", e)))?
        {
            QueryResults::Boolean(answer) => Ok(answer),
            _ => Err(EngineError::Parse(
                "Expected ASK query results".to_string(),
            )),
        }
    }

    fn update(&self, sparql: &str) -> EngineResult<()> {
        let store = self.store.write();
        store
            .update(sparql)
            .map_err(|e| EngineError::Mutation(format!("SPARQL update failed: {}", e)))
    }

    fn clear(&self) -> EngineResult<()> {
        let store = self.store.write();
        store
            .clear()
            .map_err(|e| EngineError::Parse(format!("RDF store error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EX: &str = "@prefix ex: <http://example.org/> .\nex:a ex:b ex:c .\n";

    #[test]
    fn load_turtle_counts_new_triples() {
        let store = OxigraphStore::new().unwrap();
        assert_eq!(store.load_turtle(EX).unwrap(), 1);
        assert_eq!(store.triple_count(), 1);
    }

    #[test]
    fn loading_twice_is_idempotent() {
        let store = OxigraphStore::new().unwrap();
        assert_eq!(store.load_turtle(EX).unwrap(), 1);
        assert_eq!(store.load_turtle(EX).unwrap(), 0);
        assert_eq!(store.triple_count(), 1);
    }

    #[test]
    fn malformed_turtle_leaves_store_unchanged() {
        let store = OxigraphStore::new().unwrap();
        store.load_turtle(EX).unwrap();
        let result = store.load_turtle("@prefix broken <no-dot>\nex:a ex:b");
        assert!(matches!(result, Err(EngineError::Parse(_))));
        assert_eq!(store.triple_count(), 1);
    }

    #[test]
    fn dump_parse_round_trip_preserves_triples() {
        let store = OxigraphStore::new().unwrap();
        store
            .load_turtle(
                "@prefix ex: <http://example.org/> .\n\
                 ex:a ex:b ex:c .\n\
                 ex:a ex:status \"Active\" .\n\
                 ex:n ex:count \"3\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n",
            )
            .unwrap();
        let dumped = store.dump().unwrap();

        let other = OxigraphStore::new().unwrap();
        other.load_turtle(&dumped).unwrap();
        assert_eq!(other.triple_count(), store.triple_count());

        // Set equality, not byte equality: serialization order may differ
        let lines = |bytes: Vec<u8>| {
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect::<std::collections::BTreeSet<_>>()
        };
        assert_eq!(
            lines(store.dump_nquads().unwrap()),
            lines(other.dump_nquads().unwrap())
        );
    }

    #[test]
    fn query_returns_plain_literal_values() {
        let store = OxigraphStore::new().unwrap();
        store
            .load_turtle(
                "@prefix ex: <http://example.org/> .\nex:task1 ex:status \"Active\" .\n",
            )
            .unwrap();
        let rows = store
            .query("SELECT ?s ?o WHERE { ?s <http://example.org/status> ?o }")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("s").map(String::as_str), Some("http://example.org/task1"));
        assert_eq!(rows[0].get("o").map(String::as_str), Some("Active"));
    }

    #[test]
    fn ask_answers_boolean() {
        let store = OxigraphStore::new().unwrap();
        store.load_turtle(EX).unwrap();
        assert!(store
            .ask("ASK { <http://example.org/a> ?p ?o }")
            .unwrap());
        assert!(!store
            .ask("ASK { <http://example.org/missing> ?p ?o }")
            .unwrap());
    }

    #[test]
    fn update_deletes_and_inserts() {
        let store = OxigraphStore::new().unwrap();
        store
            .load_turtle(
                "@prefix ex: <http://example.org/> .\nex:t ex:status \"Active\" .\n",
            )
            .unwrap();
        store
            .update(
                "PREFIX ex: <http://example.org/>\n\
                 DELETE { ?t ex:status ?old }\n\
                 INSERT { ?t ex:status \"Completed\" }\n\
                 WHERE { ?t ex:status ?old }",
            )
            .unwrap();
        let rows = store
            .query("SELECT ?o WHERE { <http://example.org/t> <http://example.org/status> ?o }")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("o").map(String::as_str), Some("Completed"));
    }

    #[test]
    fn clear_empties_the_store() {
        let store = OxigraphStore::new().unwrap();
        store.load_turtle(EX).unwrap();
        store.clear().unwrap();
        assert_eq!(store.triple_count(), 0);
    }

    #[test]
    fn nquads_round_trip_restores_exact_state() {
        let store = OxigraphStore::new().unwrap();
        store.load_turtle(EX).unwrap();
        let snapshot = store.dump_nquads().unwrap();

        store.load_turtle("@prefix ex: <http://example.org/> .\nex:x ex:y ex:z .\n").unwrap();
        assert_eq!(store.triple_count(), 2);

        store.clear().unwrap();
        store.load_raw(&snapshot, RdfFormat::NQuads).unwrap();
        assert_eq!(store.triple_count(), 1);
        assert!(store.ask("ASK { <http://example.org/a> ?p ?o }").unwrap());
    }
}
