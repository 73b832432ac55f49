//! Append-only event log
//!
//! Every tick, mutation, and transaction outcome is recorded as an ordered
//! event. Replaying the `TripleAdded`/`TripleRemoved` events from the empty
//! graph reproduces the current state graph, which makes the log the
//! substrate for any time-travel tooling layered on top. The engine itself
//! never depends on log queries for correctness.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Kind of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    TickStart,
    TickEnd,
    TripleAdded,
    TripleRemoved,
    TransactionBegin,
    TransactionCommit,
    TransactionRollback,
    ValidationFailure,
    StatusChange,
}

/// One log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    /// Total order within this log; monotonic, starts at 1
    pub sequence: u64,
    pub payload: serde_json::Value,
}

/// In-memory append-only event log
#[derive(Debug, Default)]
pub struct EventLog {
    events: RwLock<Vec<Event>>,
    sequence: AtomicU64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event; returns the stored entry
    pub fn append(&self, event_type: EventType, payload: serde_json::Value) -> Event {
        let event = Event {
            event_id: Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            payload,
        };
        self.events.write().push(event.clone());
        event
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// All events in sequence order
    pub fn all(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Events of one type, in sequence order
    pub fn by_type(&self, event_type: EventType) -> Vec<Event> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Events within `[start, end]`; either bound may be open
    pub fn in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<Event> {
        self.events
            .read()
            .iter()
            .filter(|e| start.map_or(true, |s| e.timestamp >= s))
            .filter(|e| end.map_or(true, |t| e.timestamp <= t))
            .cloned()
            .collect()
    }

    /// Fold all triple events from the empty graph
    ///
    /// Returns the set of N-Quads lines the state graph should contain.
    /// Idempotent: replaying twice yields the same set.
    pub fn replay_state(&self) -> BTreeSet<String> {
        let mut state = BTreeSet::new();
        for event in self.events.read().iter() {
            let Some(triple) = event.payload.get("triple").and_then(|t| t.as_str()) else {
                continue;
            };
            match event.event_type {
                EventType::TripleAdded => {
                    state.insert(triple.to_string());
                }
                EventType::TripleRemoved => {
                    state.remove(triple);
                }
                _ => {}
            }
        }
        state
    }
}
