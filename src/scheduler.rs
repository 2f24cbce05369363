//! Wave-parallel workflow runner.
//!
//! [`WorkflowRunner`] (constructed via [`WorkflowRunnerBuilder`]) is the
//! main entry point for executing a graph document. It wires together
//! validation, graph construction, the variable resolver, node dispatch,
//! and the update channel, and owns all [`ExecutionContext`] bookkeeping.
//!
//! Scheduling model: the ready set (nodes whose every dependency has
//! settled) executes as one concurrent wave; the runner suspends until
//! the whole wave settles before computing the next. Wave-parallelism
//! keeps a deterministic notion of "generation" for debugging and means no
//! node starts before all of its dependencies are known settled. A failed
//! node never halts the run: its dependents observe an absent input and
//! proceed on their own terms.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;

use crate::core::update::WorkflowEvent;
use crate::core::{CancellationSignal, EngineConfig, ExecutionContext, RunContext, UpdateSender};
use crate::error::{NodeError, WorkflowError};
use crate::graph::builder::WorkflowGraph;
use crate::graph::types::{Edge, Node, NodeStatus};
use crate::graph::validator::{validate, ValidationReport};
use crate::nodes::{self, NodeRunResult};
use crate::services::{
    build_http_client, CodeEvaluator, GenerationService, NullCodeEvaluator, NullGenerationService,
};

/// Validate a graph document without running it.
pub fn validate_workflow(nodes: &[Node], edges: &[Edge]) -> ValidationReport {
    validate(nodes, edges)
}

/// Configured workflow runner. Reusable across runs; each run gets its own
/// [`ExecutionContext`].
pub struct WorkflowRunner {
    generation: Arc<dyn GenerationService>,
    code: Arc<dyn CodeEvaluator>,
    config: EngineConfig,
    updates: Option<UpdateSender>,
    cancellation: CancellationSignal,
    http: reqwest::Client,
}

impl WorkflowRunner {
    pub fn builder() -> WorkflowRunnerBuilder {
        WorkflowRunnerBuilder::default()
    }

    pub fn cancellation(&self) -> &CancellationSignal {
        &self.cancellation
    }

    /// Run a graph document to completion.
    ///
    /// Resolves once every node has been attempted; aborts early only on
    /// an invalid graph, a scheduling deadlock, or cancellation. Node
    /// failures are recorded in the returned context, not raised.
    pub async fn execute(
        &self,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<ExecutionContext, WorkflowError> {
        let report = validate_workflow(&nodes, &edges);
        if !report.valid {
            return Err(WorkflowError::ValidationFailed(Box::new(report)));
        }

        let graph = WorkflowGraph::build(nodes, edges)?;
        let mut context = ExecutionContext::new(self.cancellation.clone());

        // Single batched notification: every node observably starts idle.
        self.emit(WorkflowEvent::RunStarted {
            run_id: context.run_id.clone(),
            node_ids: graph.nodes().iter().map(|n| n.id.clone()).collect(),
            timestamp: Utc::now(),
        });

        let dependencies = graph.dependencies();
        let mut executed: HashSet<String> = HashSet::new();

        while executed.len() < graph.node_count() {
            if self.cancellation.is_cancelled() {
                self.emit(WorkflowEvent::RunCancelled {
                    run_id: context.run_id.clone(),
                    timestamp: Utc::now(),
                });
                return Err(WorkflowError::Cancelled);
            }

            let ready: Vec<&Node> = graph
                .nodes()
                .iter()
                .filter(|n| {
                    !executed.contains(&n.id)
                        && dependencies[&n.id].iter().all(|d| executed.contains(d))
                })
                .collect();

            if ready.is_empty() {
                // Validation admits no cycles or stranded nodes, so an
                // empty ready set here means the graph changed under us.
                let remaining = graph.node_count() - executed.len();
                let error = WorkflowError::NoProgress { remaining };
                self.emit(WorkflowEvent::RunFailed {
                    run_id: context.run_id.clone(),
                    error: error.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(error);
            }

            tracing::debug!(
                wave = ?ready.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
                "dispatching wave"
            );

            let outcomes = {
                let rc = RunContext {
                    graph: &graph,
                    results: &context.node_results,
                    generation: self.generation.as_ref(),
                    code: self.code.as_ref(),
                    http: &self.http,
                    cache: context.cache.as_ref(),
                    config: &self.config,
                    cancellation: &self.cancellation,
                    updates: self.updates.as_ref(),
                };
                join_all(ready.iter().map(|node| self.run_node(node, &rc))).await
            };

            // The single authoritative write per node, after the wave has
            // fully settled.
            for (node_id, outcome, _elapsed) in outcomes {
                executed.insert(node_id.clone());
                match outcome {
                    Ok(result) => {
                        context.statuses.insert(node_id.clone(), result.status);
                        context.node_results.insert(node_id, result.value);
                    }
                    Err(error) => {
                        context.statuses.insert(node_id.clone(), NodeStatus::Error);
                        context.errors.insert(node_id, error);
                    }
                }
            }
        }

        self.emit(WorkflowEvent::RunCompleted {
            run_id: context.run_id.clone(),
            timestamp: Utc::now(),
        });
        Ok(context)
    }

    /// Per-node wrapper: mark running, dispatch, mark settled. Errors are
    /// handed back to the wave loop so bookkeeping stays centralized.
    async fn run_node(
        &self,
        node: &Node,
        rc: &RunContext<'_>,
    ) -> (String, Result<NodeRunResult, NodeError>, u64) {
        self.emit(WorkflowEvent::NodeStarted {
            node_id: node.id.clone(),
            timestamp: Utc::now(),
        });

        let started = Instant::now();
        let outcome = nodes::dispatch(node, rc).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(result) => {
                self.emit(WorkflowEvent::NodeFinished {
                    node_id: node.id.clone(),
                    status: result.status,
                    result: result.value.clone(),
                    execution_time_ms: elapsed_ms,
                    timestamp: Utc::now(),
                });
            }
            Err(error) => {
                tracing::error!(node = %node.id, kind = node.kind.tag(), %error, "node failed");
                self.emit(WorkflowEvent::NodeFailed {
                    node_id: node.id.clone(),
                    error: error.to_string(),
                    execution_time_ms: elapsed_ms,
                    timestamp: Utc::now(),
                });
            }
        }

        (node.id.clone(), outcome, elapsed_ms)
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(updates) = &self.updates {
            // A dropped receiver is the caller's choice, not our problem.
            let _ = updates.send(event);
        }
    }
}

/// Builder-based configuration for [`WorkflowRunner`].
pub struct WorkflowRunnerBuilder {
    generation: Arc<dyn GenerationService>,
    code: Arc<dyn CodeEvaluator>,
    config: EngineConfig,
    updates: Option<UpdateSender>,
    cancellation: CancellationSignal,
}

impl Default for WorkflowRunnerBuilder {
    fn default() -> Self {
        Self {
            generation: Arc::new(NullGenerationService),
            code: Arc::new(NullCodeEvaluator),
            config: EngineConfig::default(),
            updates: None,
            cancellation: CancellationSignal::new(),
        }
    }
}

impl WorkflowRunnerBuilder {
    pub fn generation_service(mut self, service: Arc<dyn GenerationService>) -> Self {
        self.generation = service;
        self
    }

    pub fn code_evaluator(mut self, evaluator: Arc<dyn CodeEvaluator>) -> Self {
        self.code = evaluator;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Update sink for status transitions and streamed chunks.
    pub fn update_sender(mut self, sender: UpdateSender) -> Self {
        self.updates = Some(sender);
        self
    }

    /// Caller-held cancellation signal; defaults to a fresh one reachable
    /// via [`WorkflowRunner::cancellation`].
    pub fn cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancellation = signal;
        self
    }

    pub fn build(self) -> Result<WorkflowRunner, WorkflowError> {
        let http = build_http_client(self.config.http_timeout_secs)
            .map_err(|e| WorkflowError::InternalError(e.to_string()))?;
        Ok(WorkflowRunner {
            generation: self.generation,
            code: self.code,
            config: self.config,
            updates: self.updates,
            cancellation: self.cancellation,
            http,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(doc: serde_json::Value) -> Node {
        serde_json::from_value(doc).unwrap()
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    fn linear_graph() -> (Vec<Node>, Vec<Edge>) {
        (
            vec![
                node(json!({"id": "start", "kind": "entry", "config": {"value": "hello"}, "label": "Start"})),
                node(json!({"id": "mid", "kind": "passthrough", "label": "Mid"})),
                node(json!({"id": "stop", "kind": "terminal", "label": "Stop"})),
            ],
            vec![edge("e1", "start", "mid"), edge("e2", "mid", "stop")],
        )
    }

    #[tokio::test]
    async fn test_linear_run_propagates_value() {
        let runner = WorkflowRunner::builder().build().unwrap();
        let (nodes, edges) = linear_graph();
        let context = runner.execute(nodes, edges).await.unwrap();

        assert_eq!(context.result_of("stop"), Some(&json!("hello")));
        assert_eq!(context.status_of("stop"), NodeStatus::Success);
        assert!(context.errors.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_graph_refused() {
        let runner = WorkflowRunner::builder().build().unwrap();
        let nodes = vec![node(
            json!({"id": "only", "kind": "passthrough", "label": "Only"}),
        )];
        let result = runner.execute(nodes, vec![]).await;
        assert!(matches!(result, Err(WorkflowError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_cancellation_before_first_wave() {
        let runner = WorkflowRunner::builder().build().unwrap();
        runner.cancellation().cancel();
        let (nodes, edges) = linear_graph();
        let result = runner.execute(nodes, edges).await;
        assert!(matches!(result, Err(WorkflowError::Cancelled)));
    }

    #[tokio::test]
    async fn test_at_most_one_outcome_per_node() {
        let runner = WorkflowRunner::builder().build().unwrap();
        let (nodes, edges) = linear_graph();
        let context = runner.execute(nodes, edges).await.unwrap();

        // Every node settled exactly once: a result xor an error.
        for id in ["start", "mid", "stop"] {
            let has_result = context.node_results.contains_key(id);
            let has_error = context.errors.contains_key(id);
            assert!(has_result ^ has_error, "node {}", id);
        }
    }

    #[tokio::test]
    async fn test_runner_reusable_across_runs() {
        let runner = WorkflowRunner::builder().build().unwrap();
        let (nodes, edges) = linear_graph();
        let first = runner
            .execute(nodes.clone(), edges.clone())
            .await
            .unwrap();
        let second = runner.execute(nodes, edges).await.unwrap();
        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.result_of("stop"), second.result_of("stop"));
    }
}
