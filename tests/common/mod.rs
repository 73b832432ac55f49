//! Shared fixtures: deterministic stand-in reasoners and topology data
//!
//! `StubReasoner` computes the same propagation the production rule set
//! encodes (sequence, AND-join, XOR-split) directly over a scratch store, so
//! the suite runs without EYE installed. It emits only the new deductions;
//! the tick executor ingests them and the store deduplicates.

#![allow(dead_code)]

use async_trait::async_trait;
use kgcl_hybrid::{Reasoner, ReasoningOutput};
use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

pub const PREFIXES: &str = "@prefix kgc: <https://kgc.org/ns/> .\n\
                            @prefix yawl: <http://www.yawlfoundation.org/yawlschema#> .\n";

/// S1: A (Completed) -> flow -> B
pub fn linear_topology() -> String {
    format!(
        "{PREFIXES}\
         <urn:task:A> a yawl:Task ; kgc:status \"Completed\" ; yawl:flowsInto <urn:flow:1> .\n\
         <urn:flow:1> yawl:nextElementRef <urn:task:B> .\n\
         <urn:task:B> a yawl:Task .\n"
    )
}

/// S2: A and B (both Completed) -> AND-join C
pub fn and_join_topology() -> String {
    format!(
        "{PREFIXES}\
         <urn:task:A> a yawl:Task ; kgc:status \"Completed\" ; yawl:flowsInto <urn:flow:1> .\n\
         <urn:task:B> a yawl:Task ; kgc:status \"Completed\" ; yawl:flowsInto <urn:flow:2> .\n\
         <urn:flow:1> yawl:nextElementRef <urn:task:C> .\n\
         <urn:flow:2> yawl:nextElementRef <urn:task:C> .\n\
         <urn:task:C> a yawl:Task ; yawl:join yawl:ControlTypeAnd .\n"
    )
}

/// AND-join with only one predecessor done: C must stay inactive
pub fn and_join_partial_topology() -> String {
    format!(
        "{PREFIXES}\
         <urn:task:A> a yawl:Task ; kgc:status \"Completed\" ; yawl:flowsInto <urn:flow:1> .\n\
         <urn:task:B> a yawl:Task ; kgc:status \"Active\" ; yawl:flowsInto <urn:flow:2> .\n\
         <urn:flow:1> yawl:nextElementRef <urn:task:C> .\n\
         <urn:flow:2> yawl:nextElementRef <urn:task:C> .\n\
         <urn:task:C> a yawl:Task ; yawl:join yawl:ControlTypeAnd .\n"
    )
}

/// S3: A (Completed) XOR-splits to B (predicate true) and C (default)
pub fn xor_split_topology() -> String {
    format!(
        "{PREFIXES}\
         <urn:task:A> a yawl:Task ; kgc:status \"Completed\" ;\n\
             yawl:split yawl:ControlTypeXor ;\n\
             yawl:flowsInto <urn:flow:1> , <urn:flow:2> .\n\
         <urn:flow:1> yawl:nextElementRef <urn:task:B> ; kgc:predicate true .\n\
         <urn:flow:2> yawl:nextElementRef <urn:task:C> ; kgc:isDefaultFlow true .\n\
         <urn:task:B> a yawl:Task .\n\
         <urn:task:C> a yawl:Task .\n"
    )
}

pub const ACTIVATED_STATUSES: [&str; 3] = ["Active", "Completed", "Archived"];

/// Deterministic propagation reasoner used in place of EYE
pub struct StubReasoner;

impl StubReasoner {
    fn iri(term: &Term) -> Option<String> {
        match term {
            Term::NamedNode(n) => Some(n.as_str().to_string()),
            _ => None,
        }
    }

    fn select_iris(store: &Store, sparql: &str, variable: &str) -> Vec<String> {
        let Ok(QueryResults::Solutions(solutions)) = store.query(sparql) else {
            return Vec::new();
        };
        let mut iris = BTreeSet::new();
        for solution in solutions.flatten() {
            if let Some(iri) = solution.get(variable).and_then(Self::iri) {
                iris.insert(iri);
            }
        }
        iris.into_iter().collect()
    }

    fn ask(store: &Store, sparql: &str) -> bool {
        matches!(store.query(sparql), Ok(QueryResults::Boolean(true)))
    }

    /// The rule semantics: completed work activates downstream elements,
    /// honoring XOR splits and AND-joins
    fn deduce(state: &str) -> Result<String, String> {
        let store = Store::new().map_err(|e| e.to_string())?;
        store
            .load_from_reader(RdfFormat::TriG, state.as_bytes())
            .map_err(|e| e.to_string())?;

        let completed = Self::select_iris(
            &store,
            "PREFIX kgc: <https://kgc.org/ns/>\n\
             SELECT ?task WHERE { ?task kgc:status \"Completed\" }",
            "task",
        );

        let mut deductions = BTreeSet::new();
        for task in &completed {
            let is_xor = Self::ask(
                &store,
                &format!(
                    "PREFIX yawl: <http://www.yawlfoundation.org/yawlschema#>\n\
                     ASK {{ <{task}> yawl:split yawl:ControlTypeXor }}"
                ),
            );

            let mut flows = Self::select_iris(
                &store,
                &format!(
                    "PREFIX yawl: <http://www.yawlfoundation.org/yawlschema#>\n\
                     SELECT ?flow WHERE {{ <{task}> yawl:flowsInto ?flow }}"
                ),
                "flow",
            );

            if is_xor {
                let predicate_true: Vec<String> = flows
                    .iter()
                    .filter(|flow| {
                        Self::ask(
                            &store,
                            &format!(
                                "PREFIX kgc: <https://kgc.org/ns/>\n\
                                 ASK {{ <{flow}> kgc:predicate true }}"
                            ),
                        )
                    })
                    .cloned()
                    .collect();
                flows = if predicate_true.is_empty() {
                    flows
                        .iter()
                        .filter(|flow| {
                            Self::ask(
                                &store,
                                &format!(
                                    "PREFIX kgc: <https://kgc.org/ns/>\n\
                                     ASK {{ <{flow}> kgc:isDefaultFlow true }}"
                                ),
                            )
                        })
                        .cloned()
                        .collect()
                } else {
                    predicate_true
                };
            }

            for flow in &flows {
                let targets = Self::select_iris(
                    &store,
                    &format!(
                        "PREFIX yawl: <http://www.yawlfoundation.org/yawlschema#>\n\
                         SELECT ?next WHERE {{ <{flow}> yawl:nextElementRef ?next }}"
                    ),
                    "next",
                );
                for next in &targets {
                    let has_status = Self::ask(
                        &store,
                        &format!(
                            "PREFIX kgc: <https://kgc.org/ns/>\n\
                             ASK {{ <{next}> kgc:status ?s }}"
                        ),
                    );
                    if has_status {
                        continue;
                    }

                    let is_and_join = Self::ask(
                        &store,
                        &format!(
                            "PREFIX yawl: <http://www.yawlfoundation.org/yawlschema#>\n\
                             ASK {{ <{next}> yawl:join yawl:ControlTypeAnd }}"
                        ),
                    );
                    if is_and_join {
                        let predecessors = Self::select_iris(
                            &store,
                            &format!(
                                "PREFIX yawl: <http://www.yawlfoundation.org/yawlschema#>\n\
                                 SELECT ?pred WHERE {{\n\
                                     ?pred yawl:flowsInto ?f .\n\
                                     ?f yawl:nextElementRef <{next}> .\n\
                                 }}"
                            ),
                            "pred",
                        );
                        let all_done = predecessors.iter().all(|p| completed.contains(p));
                        if !all_done {
                            continue;
                        }
                    }

                    deductions.insert(format!(
                        "<{next}> <https://kgc.org/ns/status> \"Active\" ."
                    ));
                }
            }
        }

        Ok(deductions.into_iter().collect::<Vec<_>>().join("\n"))
    }
}

#[async_trait]
impl Reasoner for StubReasoner {
    fn is_available(&self) -> bool {
        true
    }

    async fn reason(&self, state: &str, _rules: &str) -> ReasoningOutput {
        match Self::deduce(state) {
            Ok(output) => ReasoningOutput {
                success: true,
                output,
                error: None,
                duration_ms: 0.1,
                timed_out: false,
            },
            Err(error) => ReasoningOutput::failed(error, 0.1),
        }
    }
}

/// Emits one fresh triple per call; never reaches a fixed point
pub struct NonConvergingReasoner {
    counter: AtomicU64,
}

impl NonConvergingReasoner {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Reasoner for NonConvergingReasoner {
    fn is_available(&self) -> bool {
        true
    }

    async fn reason(&self, _state: &str, _rules: &str) -> ReasoningOutput {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        ReasoningOutput {
            success: true,
            output: format!(
                "<urn:spin:{n}> <https://kgc.org/ns/instanceCount> \"{n}\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
            ),
            error: None,
            duration_ms: 0.1,
            timed_out: false,
        }
    }
}

/// Always fails, optionally as a timeout
pub struct FailingReasoner {
    pub timed_out: bool,
}

#[async_trait]
impl Reasoner for FailingReasoner {
    fn is_available(&self) -> bool {
        true
    }

    async fn reason(&self, _state: &str, _rules: &str) -> ReasoningOutput {
        if self.timed_out {
            ReasoningOutput::timed_out("reasoning deadline expired", 0.1)
        } else {
            ReasoningOutput::failed("synthetic reasoner failure", 0.1)
        }
    }
}
