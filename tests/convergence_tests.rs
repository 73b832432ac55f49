//! End-to-end convergence scenarios
//!
//! These tests use real collaborators (oxigraph store, default rules,
//! transaction manager) with a deterministic stand-in reasoner, and verify
//! state, not interactions.

mod common;

use common::{
    and_join_partial_topology, and_join_topology, linear_topology, xor_split_topology,
    FailingReasoner, NonConvergingReasoner, StubReasoner, ACTIVATED_STATUSES,
};
use kgcl_hybrid::{
    EmbeddedRules, EngineConfig, EngineError, HybridEngine, OxigraphStore, RdfStore, Reasoner,
};
use std::sync::Arc;

fn engine_with(reasoner: Arc<dyn Reasoner>) -> HybridEngine {
    let store: Arc<dyn RdfStore> = Arc::new(OxigraphStore::new().expect("store"));
    HybridEngine::new(
        store,
        reasoner,
        Arc::new(EmbeddedRules::new()),
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn simple_propagation_activates_the_downstream_task() {
    // Arrange: A (Completed) flows into B
    let mut engine = engine_with(Arc::new(StubReasoner));
    engine
        .load_data(&linear_topology(), false)
        .expect("load topology");

    // Act
    let results = engine.run_to_completion(10).await.expect("run");

    // Assert: at least one tick ran and the run reached a fixed point
    assert!(!results.is_empty());
    assert_eq!(results.last().map(|r| r.delta), Some(0));

    let statuses = engine.inspect().expect("inspect");
    let status_b = statuses
        .get("urn:task:B")
        .expect("B should have gained a status");
    assert!(
        ACTIVATED_STATUSES.contains(&status_b.as_str()),
        "unexpected status for B: {}",
        status_b
    );
}

#[tokio::test]
async fn and_join_waits_for_all_predecessors_then_fires() {
    // Arrange: A and B both Completed, joining at C (ControlTypeAnd)
    let mut engine = engine_with(Arc::new(StubReasoner));
    engine
        .load_data(&and_join_topology(), false)
        .expect("load topology");

    // Act
    let results = engine.run_to_completion(5).await.expect("run");

    // Assert
    assert!(results.len() <= 5);
    let statuses = engine.inspect().expect("inspect");
    let status_c = statuses.get("urn:task:C").expect("C should be activated");
    assert!(ACTIVATED_STATUSES.contains(&status_c.as_str()));
}

#[tokio::test]
async fn and_join_does_not_fire_with_a_pending_predecessor() {
    let mut engine = engine_with(Arc::new(StubReasoner));
    engine
        .load_data(&and_join_partial_topology(), false)
        .expect("load topology");

    engine.run_to_completion(5).await.expect("run");

    let statuses = engine.inspect().expect("inspect");
    assert!(
        !statuses.contains_key("urn:task:C"),
        "C must stay inactive while B is unfinished, got {:?}",
        statuses.get("urn:task:C")
    );
}

#[tokio::test]
async fn xor_split_activates_exactly_one_branch() {
    // Arrange: A XOR-splits to B (predicate true) and C (default)
    let mut engine = engine_with(Arc::new(StubReasoner));
    engine
        .load_data(&xor_split_topology(), false)
        .expect("load topology");

    // Act
    engine.run_to_completion(10).await.expect("run");

    // Assert: B taken, C untouched
    let statuses = engine.inspect().expect("inspect");
    let status_b = statuses.get("urn:task:B").expect("B should be activated");
    assert!(ACTIVATED_STATUSES.contains(&status_b.as_str()));

    if let Some(status_c) = statuses.get("urn:task:C") {
        assert!(
            !ACTIVATED_STATUSES.contains(&status_c.as_str()),
            "C must not be activated, got {}",
            status_c
        );
    }
}

#[tokio::test]
async fn non_converging_topology_hits_the_tick_bound() {
    let mut engine = engine_with(Arc::new(NonConvergingReasoner::new()));

    let result = engine.run_to_completion(5).await;
    match result {
        Err(EngineError::Convergence {
            max_ticks,
            final_delta,
        }) => {
            assert_eq!(max_ticks, 5);
            assert!(final_delta > 0, "final delta must be positive");
        }
        other => panic!(
            "expected ConvergenceError, got {:?}",
            other.map(|r| r.len())
        ),
    }
}

#[tokio::test]
async fn converged_state_is_a_fixed_point() {
    let mut engine = engine_with(Arc::new(StubReasoner));
    engine
        .load_data(&linear_topology(), false)
        .expect("load topology");
    engine.run_to_completion(10).await.expect("run");

    // One more tick from the converged state changes nothing
    let extra = engine.execute_tick(99).await.expect("extra tick");
    assert_eq!(extra.delta, 0);
    assert_eq!(extra.triples_after, extra.triples_before);
}

#[tokio::test]
async fn pure_inference_never_shrinks_the_store() {
    let mut engine = engine_with(Arc::new(StubReasoner));
    engine
        .load_data(&and_join_topology(), false)
        .expect("load topology");

    let results = engine.run_to_completion(10).await.expect("run");
    for result in &results {
        assert!(
            result.delta >= 0,
            "tick {} shrank the store",
            result.tick_number
        );
        assert!(result.triples_after >= result.triples_before);
    }
}

#[tokio::test]
async fn reasoner_failures_propagate_unchanged() {
    let mut engine = engine_with(Arc::new(FailingReasoner { timed_out: false }));
    engine
        .load_data(&linear_topology(), false)
        .expect("load topology");

    let result = engine.run_to_completion(10).await;
    assert!(matches!(result, Err(EngineError::Reasoner(_))));
}

#[tokio::test]
async fn reasoner_timeouts_surface_as_timeout_errors() {
    let mut engine = engine_with(Arc::new(FailingReasoner { timed_out: true }));
    engine
        .load_data(&linear_topology(), false)
        .expect("load topology");

    let result = engine.run_to_completion(10).await;
    assert!(matches!(result, Err(EngineError::Timeout(_))));
}

#[tokio::test]
async fn runs_are_bounded_by_max_ticks() {
    let mut engine = engine_with(Arc::new(StubReasoner));
    engine
        .load_data(&linear_topology(), false)
        .expect("load topology");

    let results = engine.run_to_completion(10).await.expect("run");
    assert!(results.len() <= 10);
    // Converged before the bound, so the last tick is the zero-delta one
    assert!(results.len() < 10);
    assert_eq!(results.last().map(|r| r.delta), Some(0));
}
