//! Snapshot-based transaction manager
//!
//! `begin` captures the whole store as N-Quads; `commit` discards the
//! capture; `rollback` clears the store and reloads the capture. At most one
//! transaction is active per manager instance.

use crate::error::{EngineError, EngineResult};
use crate::ports::store::RdfStore;
use crate::ports::transaction::{
    Snapshot, Transaction, TransactionManager, TransactionResult, TransactionState,
};
use chrono::Utc;
use oxigraph::io::RdfFormat;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Transaction manager adapter over the store port
pub struct SnapshotTxnManager {
    store: Arc<dyn RdfStore>,
    active: Mutex<Option<String>>,
}

impl SnapshotTxnManager {
    pub fn new(store: Arc<dyn RdfStore>) -> Self {
        Self {
            store,
            active: Mutex::new(None),
        }
    }

    /// Scoped contract: commit on `Ok`, rollback and propagate on `Err`
    pub fn with_transaction<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Transaction) -> EngineResult<T>,
    {
        let mut txn = self.begin()?;
        match f(&mut txn) {
            Ok(value) => {
                self.commit(&mut txn)?;
                Ok(value)
            }
            Err(error) => {
                // A failed rollback outranks the original error
                self.rollback(&mut txn, &error.to_string())?;
                Err(error)
            }
        }
    }

    fn result_for(txn: &Transaction, error: Option<String>) -> TransactionResult {
        TransactionResult {
            success: error.is_none(),
            state: txn.state,
            operations_count: txn.operations.len(),
            duration_ms: (Utc::now() - txn.started_at).num_milliseconds() as f64,
            error,
        }
    }
}

impl TransactionManager for SnapshotTxnManager {
    fn begin(&self) -> EngineResult<Transaction> {
        let mut active = self.active.lock();
        if let Some(id) = active.as_ref() {
            return Err(EngineError::Transaction(format!(
                "Transaction {} is already active",
                id
            )));
        }

        let snapshot = self.create_snapshot()?;
        let transaction = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            snapshot,
            state: TransactionState::Active,
            started_at: Utc::now(),
            operations: Vec::new(),
        };
        *active = Some(transaction.transaction_id.clone());
        tracing::info!(
            "Transaction {} began ({} triples snapshotted)",
            transaction.transaction_id,
            transaction.snapshot.triple_count
        );
        Ok(transaction)
    }

    fn commit(&self, transaction: &mut Transaction) -> EngineResult<TransactionResult> {
        if transaction.state != TransactionState::Active {
            return Err(EngineError::Transaction(format!(
                "Cannot commit transaction {} in state {:?}",
                transaction.transaction_id, transaction.state
            )));
        }
        let mut active = self.active.lock();
        if active.as_deref() != Some(transaction.transaction_id.as_str()) {
            return Err(EngineError::Transaction(format!(
                "Transaction {} is not the active transaction",
                transaction.transaction_id
            )));
        }

        transaction.state = TransactionState::Committed;
        *active = None;
        tracing::info!("Transaction {} committed", transaction.transaction_id);
        Ok(Self::result_for(transaction, None))
    }

    fn rollback(
        &self,
        transaction: &mut Transaction,
        reason: &str,
    ) -> EngineResult<TransactionResult> {
        if transaction.state != TransactionState::Active {
            return Err(EngineError::Transaction(format!(
                "Cannot rollback transaction {} in state {:?}",
                transaction.transaction_id, transaction.state
            )));
        }

        // Restore before releasing the active slot: a failed restore keeps
        // the manager locked out rather than losing snapshot state
        self.restore_snapshot(&transaction.snapshot)?;

        let mut active = self.active.lock();
        transaction.state = TransactionState::RolledBack;
        transaction.log_operation(&format!("rolled back: {}", reason));
        *active = None;
        tracing::warn!(
            "Transaction {} rolled back: {}",
            transaction.transaction_id,
            reason
        );
        Ok(Self::result_for(transaction, None))
    }

    fn create_snapshot(&self) -> EngineResult<Snapshot> {
        let data = self.store.dump_nquads()?;
        Ok(Snapshot {
            snapshot_id: Uuid::new_v4().to_string(),
            triple_count: self.store.triple_count(),
            data,
            created_at: Utc::now(),
        })
    }

    fn restore_snapshot(&self, snapshot: &Snapshot) -> EngineResult<()> {
        self.store
            .clear()
            .map_err(|e| EngineError::Transaction(format!("Snapshot restore failed: {}", e)))?;
        self.store
            .load_raw(&snapshot.data, RdfFormat::NQuads)
            .map_err(|e| EngineError::Transaction(format!("Snapshot restore failed: {}", e)))?;
        Ok(())
    }
}
