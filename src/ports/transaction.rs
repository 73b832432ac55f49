//! Transaction manager port
//!
//! Atomicity is bought with whole-state snapshots: `begin` captures the
//! store, `commit` discards the capture, `rollback` restores it byte-exactly.
//! The tick is the natural unit of atomicity and the hot state is small
//! enough to snapshot in memory.

use crate::error::EngineResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable capture of store state, sufficient for exact restoration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: String,
    /// Serialized quads (N-Quads)
    pub data: Vec<u8>,
    /// Cardinality at capture time
    pub triple_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    Pending,
    Active,
    Committed,
    RolledBack,
}

/// An open unit of work with its rollback snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub snapshot: Snapshot,
    pub state: TransactionState,
    pub started_at: DateTime<Utc>,
    /// Append-only log of operation descriptors
    pub operations: Vec<String>,
}

impl Transaction {
    /// Record an operation performed within this transaction
    pub fn log_operation(&mut self, operation: &str) {
        self.operations
            .push(format!("{}: {}", Utc::now().to_rfc3339(), operation));
    }
}

/// Outcome of commit or rollback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    pub state: TransactionState,
    pub operations_count: usize,
    pub duration_ms: f64,
    pub error: Option<String>,
}

/// Port over snapshot-based transaction management
///
/// At most one transaction may be active per manager instance. A failed
/// rollback is critical and surfaces as a `Transaction` error; snapshot
/// state is never silently lost.
pub trait TransactionManager: Send + Sync {
    /// Snapshot the store and return an ACTIVE transaction
    fn begin(&self) -> EngineResult<Transaction>;

    /// Discard the snapshot; `Active -> Committed`
    fn commit(&self, transaction: &mut Transaction) -> EngineResult<TransactionResult>;

    /// Restore the snapshot byte-exactly; `Active -> RolledBack`
    fn rollback(
        &self,
        transaction: &mut Transaction,
        reason: &str,
    ) -> EngineResult<TransactionResult>;

    /// Low-level: capture current state
    fn create_snapshot(&self) -> EngineResult<Snapshot>;

    /// Low-level: restore a prior capture
    fn restore_snapshot(&self, snapshot: &Snapshot) -> EngineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_operation_appends_with_timestamp() {
        let mut txn = Transaction {
            transaction_id: "t1".to_string(),
            snapshot: Snapshot {
                snapshot_id: "s1".to_string(),
                data: Vec::new(),
                triple_count: 0,
                created_at: Utc::now(),
            },
            state: TransactionState::Active,
            started_at: Utc::now(),
            operations: Vec::new(),
        };
        txn.log_operation("applied mutation");
        txn.log_operation("validated postconditions");
        assert_eq!(txn.operations.len(), 2);
        assert!(txn.operations[0].ends_with("applied mutation"));
    }
}
