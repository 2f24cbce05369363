//! Per-wave execution context handed to node executors.

use std::collections::HashMap;

use dashmap::DashMap;
use serde_json::Value;

use crate::core::cancellation::CancellationSignal;
use crate::core::config::EngineConfig;
use crate::core::update::UpdateSender;
use crate::graph::builder::WorkflowGraph;
use crate::services::{CodeEvaluator, GenerationService};

/// Everything a node executor may touch during one invocation.
///
/// `results` is an immutable snapshot: the scheduler only writes between
/// waves, so executors in the same wave all observe the same settled state.
/// Executors never write results back through this context: they return
/// values or errors and the scheduler performs the single authoritative
/// write per node.
pub struct RunContext<'a> {
    pub graph: &'a WorkflowGraph,
    pub results: &'a HashMap<String, Value>,
    pub generation: &'a dyn GenerationService,
    pub code: &'a dyn CodeEvaluator,
    pub http: &'a reqwest::Client,
    pub cache: &'a DashMap<String, Value>,
    pub config: &'a EngineConfig,
    pub cancellation: &'a CancellationSignal,
    pub updates: Option<&'a UpdateSender>,
}

impl<'a> RunContext<'a> {
    /// Upstream values for a node in edge declaration order. A failed or
    /// never-settled upstream yields `None`; dependents of failed nodes
    /// run with absent input rather than being skipped.
    pub fn upstream_values(&self, node_id: &str) -> Vec<Option<&'a Value>> {
        self.graph
            .upstream_ids(node_id)
            .into_iter()
            .map(|id| self.results.get(id))
            .collect()
    }

    /// The first connected upstream's value, by edge declaration order.
    pub fn first_input(&self, node_id: &str) -> Option<&'a Value> {
        self.graph
            .first_upstream(node_id)
            .and_then(|n| self.results.get(&n.id))
    }

    /// Merged input for code-invoking kinds: the single upstream value as
    /// is, or an array in edge order when several upstreams exist (absent
    /// inputs become null to keep positions stable).
    pub fn merged_input(&self, node_id: &str) -> Value {
        let upstream = self.upstream_values(node_id);
        match upstream.len() {
            0 => Value::Null,
            1 => upstream[0].cloned().unwrap_or(Value::Null),
            _ => Value::Array(
                upstream
                    .into_iter()
                    .map(|v| v.cloned().unwrap_or(Value::Null))
                    .collect(),
            ),
        }
    }
}
