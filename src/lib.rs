//! # Waveflow — a wave-parallel workflow execution engine
//!
//! `waveflow` turns a directed graph of typed nodes (text generation,
//! transforms, conditionals, HTTP calls, loops, retrieval steps) into a
//! correct, concurrent, partially-recoverable execution. It is the engine
//! behind a visual canvas: the canvas, graph persistence, model backends,
//! and code sandboxing all live outside and reach the engine through a
//! small set of injected contracts.
//!
//! - **Graph model**: serde-serializable [`Node`]/[`Edge`] documents with a
//!   closed [`NodeKind`] tagged union; the dispatcher matches exhaustively,
//!   so every kind is compiler-checked.
//! - **Validation**: accumulated structural checks (entry/terminal
//!   presence, connectivity, cycle detection) gate every run.
//! - **Scheduling**: ready nodes execute as concurrent waves; a node starts
//!   only after all of its dependencies settled, and a failed node never
//!   halts the run; dependents observe an absent input instead.
//! - **Variable resolution**: `{{token}}` references into upstream results
//!   by alias, with dotted property access and fail-soft unresolved tokens.
//! - **External seams**: [`GenerationService`], [`CodeEvaluator`], and an
//!   update channel for status transitions and streamed chunks.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use waveflow::{create_update_channel, validate_workflow, WorkflowRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let document = std::fs::read_to_string("workflow.json").unwrap();
//!     let graph: waveflow::GraphDocument = serde_json::from_str(&document).unwrap();
//!
//!     let report = validate_workflow(&graph.nodes, &graph.edges);
//!     assert!(report.valid, "{:?}", report.errors);
//!
//!     let (updates, mut events) = create_update_channel();
//!     let runner = WorkflowRunner::builder()
//!         .update_sender(updates)
//!         .build()
//!         .unwrap();
//!
//!     let handle = tokio::spawn(async move {
//!         runner.execute(graph.nodes, graph.edges).await
//!     });
//!     while let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!     let context = handle.await.unwrap().unwrap();
//!     println!("errors: {:?}", context.errors);
//! }
//! ```

pub mod core;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod scheduler;
pub mod services;
pub mod template;

use serde::{Deserialize, Serialize};

pub use crate::core::{
    create_update_channel, CancellationSignal, EngineConfig, ExecutionContext, UpdateReceiver,
    UpdateSender, WorkflowEvent,
};
pub use error::{NodeError, WorkflowError};
pub use graph::{Edge, Node, NodeKind, NodeStatus, ValidationReport};
pub use scheduler::{validate_workflow, WorkflowRunner, WorkflowRunnerBuilder};
pub use services::{
    CodeEvaluator, GenerationReply, GenerationRequest, GenerationService, MediaReply,
    StructuredReply, Usage,
};

/// A persisted graph document, as produced by the graph-editing layer and
/// consumed read-only by the engine at run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}
