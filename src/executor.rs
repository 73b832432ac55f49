//! Tick executor: the export-reason-ingest loop
//!
//! One tick materializes the current state, applies the rule set through the
//! reasoner, and ingests the deductions back into the store. Given the same
//! store state and rule set, a tick always produces the same delta: no
//! wall-clock inputs, no randomness, no hidden state.

use crate::error::{EngineError, EngineResult};
use crate::ports::reasoner::Reasoner;
use crate::ports::rules::RulesProvider;
use crate::ports::store::RdfStore;
use oxigraph::io::RdfFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    /// Caller-supplied sequence number (>= 1)
    pub tick_number: u32,
    pub duration_ms: f64,
    pub triples_before: usize,
    pub triples_after: usize,
    /// `triples_after - triples_before`
    pub delta: i64,
}

impl TickResult {
    /// A tick converges iff it produced no change
    pub fn converged(&self) -> bool {
        self.delta == 0
    }
}

/// Executes single ticks against the store
pub struct TickExecutor {
    store: Arc<dyn RdfStore>,
    reasoner: Arc<dyn Reasoner>,
    rules: Arc<dyn RulesProvider>,
}

impl TickExecutor {
    pub fn new(
        store: Arc<dyn RdfStore>,
        reasoner: Arc<dyn Reasoner>,
        rules: Arc<dyn RulesProvider>,
    ) -> Self {
        Self {
            store,
            reasoner,
            rules,
        }
    }

    pub fn store(&self) -> &Arc<dyn RdfStore> {
        &self.store
    }

    /// Execute one tick: export state, reason, ingest the deductions
    ///
    /// The reasoner output may be the full closure or only the new
    /// deductions; it is loaded unconditionally and the store's set
    /// semantics deduplicate.
    pub async fn execute_tick(&self, tick_number: u32) -> EngineResult<TickResult> {
        if !self.reasoner.is_available() {
            return Err(EngineError::Unavailable(
                "Reasoner is not available; refusing to tick".to_string(),
            ));
        }

        let start = Instant::now();
        let triples_before = self.store.triple_count();

        // Named graphs survive the round trip when the store can speak TriG
        let state = match self.store.dump_trig() {
            Ok(state) => state,
            Err(_) => self.store.dump()?,
        };
        let rules = self.rules.get_rules()?;

        tracing::info!("Tick {}: invoking reasoner", tick_number);
        let result = self.reasoner.reason(&state, &rules).await;

        if !result.success {
            let message = result
                .error
                .unwrap_or_else(|| "Unknown reasoning error".to_string());
            tracing::error!("Tick {}: reasoning failed: {}", tick_number, message);
            if result.timed_out {
                return Err(EngineError::Timeout(message));
            }
            return Err(EngineError::Reasoner(message));
        }

        self.store
            .load_raw(result.output.as_bytes(), RdfFormat::N3)?;

        let triples_after = self.store.triple_count();
        let delta = triples_after as i64 - triples_before as i64;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            "Tick {}: applied in {:.2}ms, delta={}",
            tick_number,
            duration_ms,
            delta
        );

        Ok(TickResult {
            tick_number,
            duration_ms,
            triples_before,
            triples_after,
            delta,
        })
    }
}
