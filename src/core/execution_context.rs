//! Run-scoped execution state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;

use crate::core::cancellation::CancellationSignal;
use crate::error::NodeError;
use crate::graph::types::NodeStatus;

/// Mutable state of one run, exclusively owned and written by the
/// scheduler's wave-completion step. Node operations communicate only
/// through their return value or error; each node's entry here is written
/// at most once, immediately after it settles, and never mutated again.
#[derive(Debug)]
pub struct ExecutionContext {
    pub run_id: String,
    /// Settled result per node. Absent for failed or never-started nodes.
    pub node_results: HashMap<String, Value>,
    /// Error per failed node. The run's terminal report is this map plus
    /// `statuses`, not a single pass/fail verdict.
    pub errors: HashMap<String, NodeError>,
    /// Terminal (or idle) status per node at the end of the run.
    pub statuses: HashMap<String, NodeStatus>,
    pub started_at: DateTime<Utc>,
    pub cancellation: CancellationSignal,
    /// Run-scoped store backing the cache node kind. The one piece of
    /// state shared between node operations; concurrent same-key access
    /// within a wave is unspecified.
    pub cache: Arc<DashMap<String, Value>>,
}

impl ExecutionContext {
    pub fn new(cancellation: CancellationSignal) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            node_results: HashMap::new(),
            errors: HashMap::new(),
            statuses: HashMap::new(),
            started_at: Utc::now(),
            cancellation,
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn status_of(&self, node_id: &str) -> NodeStatus {
        self.statuses
            .get(node_id)
            .copied()
            .unwrap_or(NodeStatus::Idle)
    }

    pub fn result_of(&self, node_id: &str) -> Option<&Value> {
        self.node_results.get(node_id)
    }
}
