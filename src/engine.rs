//! Engine facade
//!
//! Wires the six ports together and exposes the small API collaborators use:
//! load data, tick, run to completion, inspect, query. The governed tick
//! implements the Design-by-Contract sequence (begin, validate
//! preconditions, reason, mutate, validate postconditions, commit), rolling
//! back with a reason tag at whichever step fails.
//!
//! Every engine-mediated change is recorded in the event log, including
//! per-triple add/remove events derived by set-diffing the store around each
//! operation, which is what makes log replay reproduce the state graph.

use crate::adapters::{ShaclValidator, SnapshotTxnManager, SparqlMutator};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{EventLog, EventType};
use crate::executor::{TickExecutor, TickResult};
use crate::inspector;
use crate::ports::mutator::{StateMutation, StateMutator};
use crate::ports::reasoner::Reasoner;
use crate::ports::rules::RulesProvider;
use crate::ports::store::{Binding, RdfStore};
use crate::ports::transaction::{Transaction, TransactionManager};
use crate::ports::validator::{ValidationResult, WorkflowValidator};
use crate::runner::ConvergenceRunner;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The hybrid knowledge-graph evolution engine
pub struct HybridEngine {
    store: Arc<dyn RdfStore>,
    runner: ConvergenceRunner,
    validator: Arc<dyn WorkflowValidator>,
    mutator: Arc<dyn StateMutator>,
    transactions: Arc<dyn TransactionManager>,
    events: EventLog,
    config: EngineConfig,
}

impl HybridEngine {
    /// Compose an engine from its ports, with default validator, mutator,
    /// and transaction manager built over the store
    pub fn new(
        store: Arc<dyn RdfStore>,
        reasoner: Arc<dyn Reasoner>,
        rules: Arc<dyn RulesProvider>,
        config: EngineConfig,
    ) -> Self {
        let executor = TickExecutor::new(store.clone(), reasoner, rules);
        Self {
            runner: ConvergenceRunner::new(executor),
            validator: Arc::new(ShaclValidator::new()),
            mutator: Arc::new(SparqlMutator::new(store.clone())),
            transactions: Arc::new(SnapshotTxnManager::new(store.clone())),
            events: EventLog::new(),
            store,
            config,
        }
    }

    /// Swap in a different validator
    pub fn with_validator(mut self, validator: Arc<dyn WorkflowValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Swap in a different mutator
    pub fn with_mutator(mut self, mutator: Arc<dyn StateMutator>) -> Self {
        self.mutator = mutator;
        self
    }

    /// Swap in a different transaction manager
    pub fn with_transaction_manager(mut self, transactions: Arc<dyn TransactionManager>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn store(&self) -> &Arc<dyn RdfStore> {
        &self.store
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks executed by this engine across all runs
    pub fn tick_count(&self) -> u32 {
        self.runner.tick_count()
    }

    /// Load Turtle into the store, recording the change in the event log
    ///
    /// With `trigger_hooks`, a synthetic `StatusChange` event is appended so
    /// hook runtimes observing the log see external loads too.
    pub fn load_data(&self, turtle: &str, trigger_hooks: bool) -> EngineResult<usize> {
        let before = self.triple_set()?;
        let loaded = self.store.load_turtle(turtle)?;
        let after = self.triple_set()?;
        self.emit_triple_diff(&before, &after);
        if trigger_hooks {
            self.events.append(
                EventType::StatusChange,
                json!({ "source": "load_data", "triples_loaded": loaded }),
            );
        }
        tracing::info!("Loaded {} triples", loaded);
        Ok(loaded)
    }

    /// Execute one tick with a caller-supplied tick number
    pub async fn execute_tick(&mut self, tick_number: u32) -> EngineResult<TickResult> {
        let before = self.triple_set()?;
        self.events
            .append(EventType::TickStart, json!({ "tick_number": tick_number }));
        let result = self.runner.executor().execute_tick(tick_number).await?;
        let after = self.triple_set()?;
        self.emit_triple_diff(&before, &after);
        self.append_tick_end(&result)?;
        Ok(result)
    }

    /// Run ticks until a fixed point, up to `max_ticks`
    ///
    /// Raises `Convergence` when the bound is exhausted with a non-zero
    /// final delta. Triple events are still recorded in that case: the
    /// ingested deductions are real state.
    pub async fn run_to_completion(&mut self, max_ticks: u32) -> EngineResult<Vec<TickResult>> {
        let before = self.triple_set()?;
        let outcome = self.runner.run(max_ticks).await;
        let after = self.triple_set()?;
        self.emit_triple_diff(&before, &after);

        let results = outcome?;
        for result in &results {
            self.events.append(
                EventType::TickStart,
                json!({ "tick_number": result.tick_number }),
            );
            self.append_tick_end(result)?;
        }
        Ok(results)
    }

    /// Run with the configured default bound
    pub async fn run(&mut self) -> EngineResult<Vec<TickResult>> {
        let max_ticks = self.config.max_ticks;
        self.run_to_completion(max_ticks).await
    }

    /// The Design-by-Contract tick: validate, reason, mutate, validate,
    /// commit, or roll back with a reason tag
    ///
    /// A pure-inference call (empty `mutations`) skips the mutation and
    /// postcondition steps but still rolls back on reasoner failure.
    pub async fn execute_governed_tick(
        &mut self,
        mutations: &[StateMutation],
    ) -> EngineResult<TickResult> {
        let before = self.triple_set()?;
        let mut txn = self.transactions.begin()?;
        self.events.append(
            EventType::TransactionBegin,
            json!({ "transaction_id": txn.transaction_id }),
        );

        match self.governed_body(&mut txn, mutations).await {
            Ok(result) => {
                self.transactions.commit(&mut txn)?;
                self.events.append(
                    EventType::TransactionCommit,
                    json!({
                        "transaction_id": txn.transaction_id,
                        "operations": txn.operations.len(),
                    }),
                );
                let after = self.triple_set()?;
                self.emit_triple_diff(&before, &after);
                self.append_tick_end(&result)?;
                Ok(result)
            }
            Err((stage, error)) => {
                self.transactions.rollback(&mut txn, stage)?;
                self.events.append(
                    EventType::TransactionRollback,
                    json!({
                        "transaction_id": txn.transaction_id,
                        "reason": stage,
                        "error": error.to_string(),
                    }),
                );
                Err(error)
            }
        }
    }

    async fn governed_body(
        &mut self,
        txn: &mut Transaction,
        mutations: &[StateMutation],
    ) -> Result<TickResult, (&'static str, EngineError)> {
        let pre = self
            .validate_current("pre")
            .map_err(|e| ("pre", e))?;
        if !pre.conforms {
            return Err((
                "pre",
                EngineError::Validation(format!(
                    "{} precondition violation(s)",
                    pre.violation_count()
                )),
            ));
        }
        txn.log_operation("preconditions validated");

        let result = self
            .runner
            .run_single_tick()
            .await
            .map_err(|e| ("reasoner", e))?;
        txn.log_operation("inference applied");

        if !mutations.is_empty() {
            let outcome = self
                .mutator
                .apply_mutations(mutations)
                .map_err(|e| ("mutation", e))?;
            if !outcome.success {
                let message = outcome
                    .error
                    .unwrap_or_else(|| "Unknown mutation error".to_string());
                return Err(("mutation", EngineError::Mutation(message)));
            }
            txn.log_operation(&format!("{} mutation(s) applied", mutations.len()));

            let post = self
                .validate_current("post")
                .map_err(|e| ("post", e))?;
            if !post.conforms {
                return Err((
                    "post",
                    EngineError::Validation(format!(
                        "{} postcondition violation(s)",
                        post.violation_count()
                    )),
                ));
            }
            txn.log_operation("postconditions validated");
        }

        Ok(result)
    }

    fn validate_current(&self, phase: &str) -> EngineResult<ValidationResult> {
        let state = self.store.dump()?;
        let result = if phase == "pre" {
            self.validator.validate_preconditions(&state)?
        } else {
            self.validator.validate_postconditions(&state)?
        };
        if !result.conforms {
            self.events.append(
                EventType::ValidationFailure,
                json!({
                    "phase": phase,
                    "violations": result.violation_count(),
                    "first_message": result
                        .violations
                        .first()
                        .map(|v| v.message.clone()),
                }),
            );
        }
        Ok(result)
    }

    /// Map of task IRI to status string over the current state graph
    pub fn inspect(&self) -> EngineResult<BTreeMap<String, String>> {
        inspector::task_statuses(self.store.as_ref())
    }

    /// SPARQL passthrough to the store
    pub fn query(&self, sparql: &str) -> EngineResult<Vec<Binding>> {
        self.store.query(sparql)
    }

    /// Current state as a set of N-Quads lines; comparable with
    /// `EventLog::replay_state`
    pub fn triple_set(&self) -> EngineResult<BTreeSet<String>> {
        let dump = self.store.dump_nquads()?;
        Ok(String::from_utf8_lossy(&dump)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Blake3 hash of the canonical (sorted N-Quads) state
    pub fn state_hash(&self) -> EngineResult<String> {
        let lines = self.triple_set()?;
        let mut hasher = blake3::Hasher::new();
        for line in &lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        Ok(hasher.finalize().to_hex().to_string())
    }

    fn append_tick_end(&self, result: &TickResult) -> EngineResult<()> {
        let state_hash = self.state_hash()?;
        self.events.append(
            EventType::TickEnd,
            json!({
                "tick_number": result.tick_number,
                "delta": result.delta,
                "duration_ms": result.duration_ms,
                "state_hash": state_hash,
            }),
        );
        Ok(())
    }

    fn emit_triple_diff(&self, before: &BTreeSet<String>, after: &BTreeSet<String>) {
        for line in after.difference(before) {
            self.events
                .append(EventType::TripleAdded, json!({ "triple": line }));
        }
        for line in before.difference(after) {
            self.events
                .append(EventType::TripleRemoved, json!({ "triple": line }));
        }
    }
}
