//! Run update channel.
//!
//! Status transitions and streamed chunks are pushed through an unbounded
//! mpsc channel; the caller consumes them however it likes (canvas
//! repaints, logs, tests). The engine never assumes synchronous delivery
//! and keeps running if the receiver is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::graph::types::NodeStatus;

/// Events emitted over the update channel during a run.
#[derive(Clone, Debug, Serialize)]
pub enum WorkflowEvent {
    /// Run accepted; every node's observable status is reset to idle in
    /// this single batched notification.
    RunStarted {
        run_id: String,
        node_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// A node entered `Running`.
    NodeStarted {
        node_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A node settled with `Success` or `Warning`.
    NodeFinished {
        node_id: String,
        status: NodeStatus,
        result: Value,
        execution_time_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A node settled with `Error`.
    NodeFailed {
        node_id: String,
        error: String,
        execution_time_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Incremental chunk from a streaming node operation, emitted before
    /// that node's settlement.
    StreamingChunk {
        node_id: String,
        chunk: String,
        index: usize,
    },

    /// All nodes were attempted.
    RunCompleted {
        run_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The run aborted on a structural error.
    RunFailed {
        run_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// The run observed cancellation and stopped dispatching waves.
    RunCancelled {
        run_id: String,
        timestamp: DateTime<Utc>,
    },
}

pub type UpdateSender = mpsc::UnboundedSender<WorkflowEvent>;
pub type UpdateReceiver = mpsc::UnboundedReceiver<WorkflowEvent>;

/// Create the update channel for a run.
pub fn create_update_channel() -> (UpdateSender, UpdateReceiver) {
    mpsc::unbounded_channel()
}
