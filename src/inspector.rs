//! Task status inspection
//!
//! Convenience queries over the current state graph, used by the engine's
//! `inspect()` API and by hosts that want a quick status map without writing
//! SPARQL.

use crate::error::EngineResult;
use crate::ports::store::RdfStore;
use std::collections::BTreeMap;

const STATUS_QUERY: &str = "\
PREFIX kgc: <https://kgc.org/ns/>
SELECT ?task ?status WHERE { ?task kgc:status ?status }";

/// Map of task IRI to status string for every subject carrying a status
pub fn task_statuses(store: &dyn RdfStore) -> EngineResult<BTreeMap<String, String>> {
    let mut statuses = BTreeMap::new();
    for row in store.query(STATUS_QUERY)? {
        if let (Some(task), Some(status)) = (row.get("task"), row.get("status")) {
            statuses.insert(task.clone(), status.clone());
        }
    }
    Ok(statuses)
}

/// Status of a single task, if it has one
pub fn status_of(store: &dyn RdfStore, task_iri: &str) -> EngineResult<Option<String>> {
    Ok(task_statuses(store)?.remove(task_iri))
}
