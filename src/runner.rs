//! Convergence runner: drive ticks to a fixed point
//!
//! Ticks halt on `delta == 0` rather than on an explicit "done" marker;
//! `max_ticks` is a safety bound, not a correctness knob. Reasoner errors
//! propagate unchanged, and the runner opens no transaction of its own.

use crate::error::{EngineError, EngineResult};
use crate::executor::{TickExecutor, TickResult};

/// Runs the tick executor until a fixed point or the tick bound
pub struct ConvergenceRunner {
    executor: TickExecutor,
    tick_count: u32,
}

impl ConvergenceRunner {
    pub fn new(executor: TickExecutor) -> Self {
        Self {
            executor,
            tick_count: 0,
        }
    }

    pub fn executor(&self) -> &TickExecutor {
        &self.executor
    }

    /// Ticks executed across all runs
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// Execute ticks until `delta == 0` or `max_ticks` is exhausted
    pub async fn run(&mut self, max_ticks: u32) -> EngineResult<Vec<TickResult>> {
        let mut results: Vec<TickResult> = Vec::new();
        tracing::info!("Starting run to completion (max_ticks={})", max_ticks);

        for _ in 0..max_ticks {
            self.tick_count += 1;
            let result = self.executor.execute_tick(self.tick_count).await?;
            results.push(result);

            if result.converged() {
                let total_ms: f64 = results.iter().map(|r| r.duration_ms).sum();
                tracing::info!(
                    "Converged at tick {} after {} ticks ({:.2}ms total)",
                    result.tick_number,
                    results.len(),
                    total_ms
                );
                return Ok(results);
            }
        }

        let final_delta = results.last().map(|r| r.delta).unwrap_or(0);
        tracing::warn!(
            "Max ticks ({}) reached without convergence, final delta: {}",
            max_ticks,
            final_delta
        );
        Err(EngineError::Convergence {
            max_ticks,
            final_delta,
        })
    }

    /// Execute one tick without convergence checking
    pub async fn run_single_tick(&mut self) -> EngineResult<TickResult> {
        self.tick_count += 1;
        self.executor.execute_tick(self.tick_count).await
    }

    /// Reset the tick counter, e.g. before replaying a topology
    pub fn reset_tick_count(&mut self) {
        self.tick_count = 0;
        tracing::debug!("Tick count reset to 0");
    }
}
